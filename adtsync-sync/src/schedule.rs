//! How the orchestrator walks its items.
//!
//! The protocol engine never sees the schedule, so a bounded-concurrency
//! implementation can replace [`Sequential`] without touching it.

use adtsync_core::WorkItem;

use crate::error::SyncError;

/// Drive `process` over `items`. Returning `Err` stops the walk.
pub trait Schedule {
    fn drive(
        &self,
        items: &[WorkItem],
        process: &mut dyn FnMut(&WorkItem) -> Result<(), SyncError>,
    ) -> Result<(), SyncError>;
}

/// One item after the other, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Schedule for Sequential {
    fn drive(
        &self,
        items: &[WorkItem],
        process: &mut dyn FnMut(&WorkItem) -> Result<(), SyncError>,
    ) -> Result<(), SyncError> {
        for item in items {
            process(item)?;
        }
        Ok(())
    }
}
