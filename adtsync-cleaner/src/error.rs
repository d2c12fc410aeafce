//! Error types for adtsync-cleaner.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// All errors that can arise from running the normalization tool.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// Binary not found as a path nor on `PATH`.
    #[error("cleaner not found: {path}")]
    ExecutableNotFound { path: PathBuf },

    #[error("cleaner profile not found: {path}")]
    ProfileNotFound { path: PathBuf },

    /// Scratch directory or input file could not be prepared.
    #[error("cleaner scratch I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start cleaner {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit. `code` is `None` when the process was killed by a signal.
    #[error("cleaner failed rc={}\n{stderr}\n{stdout}", exit_code(.code))]
    Failed {
        code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    /// Exit code 0 but nothing (or only whitespace) on stdout.
    #[error("cleaner returned empty output.\nSTDERR:\n{stderr}")]
    EmptyOutput { stderr: String },

    #[error("cleaner did not finish within {after:?}")]
    Timeout { after: Duration },
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CleanerError {
    CleanerError::Io {
        path: path.into(),
        source,
    }
}
