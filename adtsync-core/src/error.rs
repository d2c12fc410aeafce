//! Error types for adtsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning locators into work items.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An explicitly named urls file does not exist.
    #[error("urls file not found: {path}")]
    UrlsFileNotFound { path: PathBuf },

    /// The urls file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The base prefix is not an absolute URL.
    #[error("base URL '{base}' is not absolute: {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },

    /// A locator could not be turned into an absolute URL.
    #[error("invalid locator '{locator}': {source}")]
    InvalidLocator {
        locator: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested settings file does not exist.
    #[error("settings file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
