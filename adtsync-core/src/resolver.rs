//! Item resolver — locator strings to deduplicated [`WorkItem`]s.
//!
//! Locators come from repeated `--url` arguments and an optional urls file.
//! A locator with scheme and host is used verbatim; anything else is joined
//! onto the base prefix. Deduplication happens on the resolved absolute URL,
//! so `/programs/programs/Z/source/main` and
//! `https://host/sap/bc/adt/programs/programs/Z/source/main` collapse into one item.

use std::collections::HashSet;
use std::path::Path;

use url::Url;

use crate::error::ResolveError;
use crate::types::{Label, WorkItem};

/// Two-segment path markers whose following segment is the object name.
///
/// Checked in order; the first marker found anywhere in the path wins.
pub const LABEL_MARKERS: &[(&str, &str)] = &[
    ("programs", "programs"),
    ("oo", "classes"),
    ("oo", "interfaces"),
    ("ddic", "tables"),
    ("ddic", "structures"),
    ("ddic", "dataelements"),
    ("ddic", "domains"),
];

/// Label used when sanitisation leaves nothing behind.
pub const UNNAMED_LABEL: &str = "unnamed";

const FALLBACK_SEGMENTS: usize = 4;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Replace characters that are illegal in file names with `_`, trim trailing
/// dots and spaces. Never returns an empty string.
pub fn sanitize_label(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        UNNAMED_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive a display label from an object URL.
///
/// ```text
/// /programs/programs/Z_TEST1/source/main  -> Z_TEST1
/// /oo/classes/ZCL_FOO/source/main         -> ZCL_FOO
/// /ddic/tables/ZTAB/source/main           -> ZTAB
/// /some/other/deep/path/x                 -> other_deep_path_x
/// ```
pub fn label_from_url(url: &Url) -> Label {
    let parts: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let name = LABEL_MARKERS
        .iter()
        .find_map(|(first, second)| segment_after(&parts, first, second));
    if let Some(name) = name {
        return Label(sanitize_label(name));
    }

    let tail = &parts[parts.len().saturating_sub(FALLBACK_SEGMENTS)..];
    Label(sanitize_label(&tail.join("_")))
}

fn segment_after<'a>(parts: &[&'a str], first: &str, second: &str) -> Option<&'a str> {
    parts
        .windows(3)
        .find(|w| w[0] == first && w[1] == second)
        .map(|w| w[2])
}

// ---------------------------------------------------------------------------
// Locators
// ---------------------------------------------------------------------------

/// Parse the base prefix. A trailing `/` is ignored.
pub fn parse_base(base: &str) -> Result<Url, ResolveError> {
    let trimmed = base.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| ResolveError::InvalidBase {
        base: base.to_string(),
        source,
    })?;
    if !url.has_host() {
        return Err(ResolveError::InvalidBase {
            base: base.to_string(),
            source: url::ParseError::EmptyHost,
        });
    }
    Ok(url)
}

/// Resolve one locator against the base prefix.
///
/// A relative locator that already starts with the base path (for example
/// `/sap/bc/adt/oo/classes/...` against `https://host/sap/bc/adt`) is placed
/// on the base origin instead of being appended a second time.
pub fn resolve_locator(base: &Url, locator: &str) -> Result<Url, ResolveError> {
    let locator = locator.trim();
    if let Ok(url) = Url::parse(locator) {
        if url.has_host() {
            return Ok(url);
        }
    }

    let invalid = |source| ResolveError::InvalidLocator {
        locator: locator.to_string(),
        source,
    };

    let base_path = base.path().trim_end_matches('/');
    let rooted = format!("/{}", locator.trim_start_matches('/'));
    if !base_path.is_empty() && rooted.starts_with(&format!("{base_path}/")) {
        return base.join(&rooted).map_err(invalid);
    }

    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        locator.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(invalid)
}

/// Absolute locators keep their spelling (host case, explicit default port);
/// relative ones are reported by their resolved URL.
fn verbatim_locator(locator: &str, resolved: &Url) -> String {
    let locator = locator.trim();
    match Url::parse(locator) {
        Ok(url) if url.has_host() => locator.to_string(),
        _ => resolved.to_string(),
    }
}

/// Read a urls file: one locator per line, blank lines and `#` comments skipped.
pub fn read_urls_file(path: &Path) -> Result<Vec<String>, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::UrlsFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

/// Build the work list for a run.
///
/// Explicit locators come first, then the urls file. The first occurrence of
/// each resolved URL wins. A named urls file that does not exist is an error
/// raised before anything else is resolved.
pub fn resolve_items(
    base: &str,
    locators: &[String],
    urls_file: Option<&Path>,
) -> Result<Vec<WorkItem>, ResolveError> {
    let mut raw: Vec<String> = locators.to_vec();
    if let Some(path) = urls_file {
        raw.extend(read_urls_file(path)?);
    }

    let base = parse_base(base)?;
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for locator in raw.iter().filter(|l| !l.trim().is_empty()) {
        let url = resolve_locator(&base, locator)?;
        if !seen.insert(url.as_str().to_string()) {
            continue;
        }
        let label = label_from_url(&url);
        let locator = verbatim_locator(locator, &url);
        items.push(WorkItem {
            url,
            label,
            locator,
        });
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
