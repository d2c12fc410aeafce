//! Error types for adtsync-client.

use std::fmt;

use thiserror::Error;

/// Which protocol call failed; used as the leading word of error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    CsrfFetch,
    Write,
    Activation,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Fetch => write!(f, "GET"),
            Operation::CsrfFetch => write!(f, "CSRF GET"),
            Operation::Write => write!(f, "PUT"),
            Operation::Activation => write!(f, "ACTIVATION"),
        }
    }
}

/// All errors that can arise from ADT protocol calls.
///
/// Lock conflicts have no variant of their own: the server reports them only
/// as text inside the response body of a [`AdtError::Status`].
#[derive(Debug, Error)]
pub enum AdtError {
    /// TLS connector could not be configured.
    #[error("failed to build TLS connector: {0}")]
    Tls(#[from] native_tls::Error),

    /// Connection, DNS, TLS handshake or timeout failure.
    #[error("{operation} {url} failed: {source}")]
    Transport {
        operation: Operation,
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// Non-success HTTP status. `body` is already truncated.
    #[error(
        "{operation} failed {status} {reason}\nURL: {url}{}\nResponse body:\n{body}",
        format_headers(.headers)
    )]
    Status {
        operation: Operation,
        url: String,
        status: u16,
        reason: String,
        headers: Vec<(String, String)>,
        body: String,
    },

    /// Response arrived but its body could not be read.
    #[error("failed to read {operation} response from {url}: {source}")]
    Body {
        operation: Operation,
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The server answered the token request without an `X-CSRF-Token` header.
    #[error("server did not issue an X-CSRF-Token (header missing) for {url}")]
    MissingCsrfToken { url: String },

    /// The object URL has no `/sap/bc/adt` prefix to root the activation service on.
    #[error("URL does not contain {marker}: {url}")]
    NotAdtUrl { url: String, marker: &'static str },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

fn format_headers(headers: &[(String, String)]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let joined = headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("\nResponse headers: {{{joined}}}")
}
