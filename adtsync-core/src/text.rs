//! Small text helpers shared by the client and the failure recorder.

/// First `limit` characters of `s` (not bytes; never splits a code point).
pub fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
