//! # adtsync-cleaner
//!
//! The normalization step: source text in, cleaned source text out.
//!
//! [`AbapCleaner`] drives the abap-cleaner command-line binary through a
//! per-call scratch directory. The orchestrator only sees the [`Normalizer`]
//! trait, so tests and alternative formatters can stand in for the binary.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use adtsync_cleaner::{AbapCleaner, Normalizer};
//!
//! let cleaner = AbapCleaner::new("abap-cleanerc", "profile.cfj", "757")
//!     .with_timeout(Duration::from_secs(60));
//! cleaner.preflight().expect("cleaner installed");
//! let cleaned = cleaner.normalize("report z_test1.\n").expect("cleaned");
//! println!("{cleaned}");
//! ```

pub mod cleaner;
pub mod decode;
pub mod error;
mod process;

pub use cleaner::AbapCleaner;
pub use error::CleanerError;

/// A text normalization step.
pub trait Normalizer {
    /// Check prerequisites (binary, profile) once, before any item is processed.
    fn preflight(&self) -> Result<(), CleanerError> {
        Ok(())
    }

    /// Normalize one object's source text.
    fn normalize(&self, source: &str) -> Result<String, CleanerError>;
}

impl<N: Normalizer + ?Sized> Normalizer for &N {
    fn preflight(&self) -> Result<(), CleanerError> {
        (**self).preflight()
    }

    fn normalize(&self, source: &str) -> Result<String, CleanerError> {
        (**self).normalize(source)
    }
}
