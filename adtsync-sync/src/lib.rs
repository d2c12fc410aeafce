//! # adtsync-sync
//!
//! Batch orchestration: fetch → normalize → save or write back (→ activate),
//! one item at a time, with per-item failure isolation.
//!
//! Call [`pipeline::Pipeline::run`] with resolved work items. Fatal
//! configuration problems come back as [`SyncError`]; everything that goes
//! wrong for a single item is recorded by the [`recorder::FailureRecorder`]
//! and counted in the returned [`pipeline::RunSummary`].

pub mod error;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod recorder;
pub mod schedule;

pub use error::{ItemError, SyncError};
pub use outcome::{ItemFailure, ItemOutcome, ItemReport, Stage};
pub use pipeline::{Pipeline, RunOptions, RunSummary};
pub use recorder::{FailureEntry, FailureRecorder, RunArtifacts};
pub use schedule::{Schedule, Sequential};
