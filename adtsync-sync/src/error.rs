//! Error types for adtsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use adtsync_cleaner::CleanerError;
use adtsync_client::AdtError;
use adtsync_core::RunMode;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Nothing to process after resolution.
    #[error("no URLs given (use --url and/or --urls-file)")]
    NoItems,

    /// A writeback mode was requested without a transport request number.
    #[error("a transport request (--corrnr) is required in {mode} mode")]
    MissingTransport { mode: RunMode },

    /// Normalization tool or its profile is missing.
    #[error("normalization tool unavailable: {0}")]
    Cleaner(#[from] CleanerError),

    /// The server did not hand out a CSRF token, so no write can succeed.
    #[error("could not obtain CSRF token: {0}")]
    CsrfToken(#[source] AdtError),

    /// Output directory or failure artifacts could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failure log JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors confined to one work item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Adt(#[from] AdtError),

    #[error(transparent)]
    Cleaner(#[from] CleanerError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only raised when unconditional writes are disabled.
    #[error("no ETag returned for {url}; refusing unconditional write")]
    MissingEtag { url: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`ItemError::Io`].
pub(crate) fn item_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ItemError {
    ItemError::Io {
        path: path.into(),
        source,
    }
}
