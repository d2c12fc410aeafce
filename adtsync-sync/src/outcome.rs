//! Per-item results.
//!
//! ```text
//! FETCHED → NORMALIZED → SAVED
//!                      → WRITTEN → ACTIVATED
//!                      → WRITTEN            (writeback-noact)
//! any step → FAILED (first error wins, item stops, run continues)
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use url::Url;

use crate::error::ItemError;

/// Step of the per-item pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Normalize,
    Save,
    Write,
    Activate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Normalize => write!(f, "normalize"),
            Stage::Save => write!(f, "save"),
            Stage::Write => write!(f, "write"),
            Stage::Activate => write!(f, "activate"),
        }
    }
}

/// Terminal success state of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Test mode: cleaned source saved locally.
    Saved { path: PathBuf },
    /// Written back, activation skipped.
    Written { url: Url },
    /// Written back and activated.
    Activated { written: Url, activation: Url },
}

/// Terminal failure state of an item.
#[derive(Debug)]
pub struct ItemFailure {
    pub stage: Stage,
    pub error: ItemError,
}

impl ItemFailure {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// What the orchestrator reports for each item.
pub type ItemReport = Result<ItemOutcome, ItemFailure>;

/// `map_err` helper tagging an error with the stage it came from.
pub(crate) fn at<E: Into<ItemError>>(stage: Stage) -> impl FnOnce(E) -> ItemFailure {
    move |err| ItemFailure {
        stage,
        error: err.into(),
    }
}
