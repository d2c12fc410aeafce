//! Optional YAML settings file with per-installation defaults.
//!
//! # Lookup
//!
//! ```text
//! --config <path>                      (must exist)
//! <config_dir>/adtsync/config.yaml     (used when present)
//! ```
//!
//! Every field is optional; command-line values override the file, and the
//! `DEFAULT_*` constants fill whatever is still unset.
//!
//! # API pattern
//!
//! - `load_at(path)` — explicit file; used in tests
//! - `load(explicit)` — resolves the lookup order above

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ActivationProtocol;

pub const DEFAULT_CLIENT: &str = "001";
pub const DEFAULT_RELEASE: &str = "757";
pub const DEFAULT_PROFILE: &str = "profile+REMOVE.cfj";
pub const DEFAULT_CLEANER: &str = "abap-cleanerc";
pub const DEFAULT_OUTDIR: &str = "outputs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CLEANER_TIMEOUT_SECS: u64 = 300;

const SETTINGS_DIR: &str = "adtsync";
const SETTINGS_FILE: &str = "config.yaml";

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub base: Option<String>,
    pub client: Option<String>,
    pub release: Option<String>,
    pub profile: Option<PathBuf>,
    pub cleaner: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub insecure: Option<bool>,
    pub activation: Option<ActivationProtocol>,
    pub timeout_secs: Option<u64>,
    pub cleaner_timeout_secs: Option<u64>,
}

/// `<config_dir>/adtsync/config.yaml` — pure, no I/O.
pub fn default_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

/// Platform default settings path, if the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| default_path_at(&dir))
}

/// Load settings from an explicit file.
pub fn load_at(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings following the lookup order in the module docs.
///
/// Without an explicit path and without a default file, returns empty settings.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_at(path);
    }
    match default_path() {
        Some(path) if path.exists() => load_at(&path),
        _ => Ok(Settings::default()),
    }
}
