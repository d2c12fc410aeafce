//! Batch orchestrator shared by every run mode.
//!
//! ## Run protocol
//!
//! 1. Reject an empty item list.
//! 2. Writeback modes: require a transport request.
//! 3. Preflight the normalizer (binary + profile present).
//! 4. Writeback modes: fetch the CSRF token once, via the first item.
//! 5. Clear and recreate the output directory.
//! 6. Process items through the [`Schedule`]; per-item failures are recorded
//!    and counted, never propagated. A failure log that cannot be written is
//!    reported and skipped; the item still goes on the retry list.
//! 7. Flush the retry list.
//!
//! Steps 1–4 happen before anything is touched on disk, and 1–3 before any
//! network call.

use std::path::PathBuf;

use chrono::Local;

use adtsync_cleaner::Normalizer;
use adtsync_client::{AdtSession, CsrfToken};
use adtsync_core::{ActivationProtocol, RunMode, TransportRequest, WorkItem};

use crate::error::{ItemError, SyncError};
use crate::outcome::{at, ItemFailure, ItemOutcome, ItemReport, Stage};
use crate::output;
use crate::recorder::{FailureRecorder, RunArtifacts};
use crate::schedule::Schedule;

/// Run identifier format; sorts chronologically.
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Per-run settings for [`Pipeline`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: RunMode,
    pub transport: Option<TransportRequest>,
    pub activation: ActivationProtocol,
    pub outdir: PathBuf,
    /// Fail the item instead of writing with `If-Match: *` when no ETag came back.
    pub require_etag: bool,
}

/// Counters and artifact locations of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub ok: usize,
    pub fail: usize,
    pub outdir: PathBuf,
    pub artifacts: RunArtifacts,
}

/// Write-side state established once per run.
struct WriteContext<'a> {
    token: CsrfToken,
    transport: &'a TransportRequest,
}

/// Orchestrates one run over a session and a normalizer.
pub struct Pipeline<'a, N> {
    session: &'a AdtSession,
    normalizer: &'a N,
    options: RunOptions,
}

impl<'a, N: Normalizer> Pipeline<'a, N> {
    pub fn new(session: &'a AdtSession, normalizer: &'a N, options: RunOptions) -> Self {
        Self {
            session,
            normalizer,
            options,
        }
    }

    /// Run with a run id derived from the local clock.
    pub fn run(
        &self,
        items: &[WorkItem],
        schedule: &dyn Schedule,
        observer: &mut dyn FnMut(&WorkItem, &ItemReport),
    ) -> Result<RunSummary, SyncError> {
        let run_id = Local::now().format(RUN_ID_FORMAT).to_string();
        self.run_with_id(items, &run_id, schedule, observer)
    }

    pub fn run_with_id(
        &self,
        items: &[WorkItem],
        run_id: &str,
        schedule: &dyn Schedule,
        observer: &mut dyn FnMut(&WorkItem, &ItemReport),
    ) -> Result<RunSummary, SyncError> {
        let mode = self.options.mode;
        let Some(first) = items.first() else {
            return Err(SyncError::NoItems);
        };

        let transport = if mode.writes() {
            let transport = self
                .options
                .transport
                .as_ref()
                .ok_or(SyncError::MissingTransport { mode })?;
            Some(transport)
        } else {
            None
        };

        self.normalizer.preflight()?;

        let write_ctx = match transport {
            Some(transport) => {
                let token = self
                    .session
                    .fetch_csrf_token(&first.url)
                    .map_err(SyncError::CsrfToken)?;
                Some(WriteContext { token, transport })
            }
            None => None,
        };

        output::prepare_outdir(&self.options.outdir)?;

        tracing::info!("mode: {mode}, items: {}, run: {run_id}", items.len());
        let mut recorder = FailureRecorder::new(&self.options.outdir, run_id);
        let mut ok = 0;
        let mut fail = 0;

        schedule.drive(items, &mut |item: &WorkItem| -> Result<(), SyncError> {
            let report = self.process_item(item, write_ctx.as_ref());
            match &report {
                Ok(_) => ok += 1,
                Err(failure) => {
                    fail += 1;
                    if let Err(err) = recorder.record(item, failure) {
                        tracing::error!("could not log failure of {}: {err}", item.locator);
                    }
                }
            }
            observer(item, &report);
            Ok(())
        })?;

        let artifacts = recorder.finish()?;
        tracing::info!("run {run_id} done: ok={ok} fail={fail}");
        Ok(RunSummary {
            run_id: run_id.to_string(),
            ok,
            fail,
            outdir: self.options.outdir.clone(),
            artifacts,
        })
    }

    /// One item, start to finish. The first failing step ends the item.
    fn process_item(&self, item: &WorkItem, write_ctx: Option<&WriteContext<'_>>) -> ItemReport {
        let source = self
            .session
            .fetch_source(&item.url)
            .map_err(at(Stage::Fetch))?;
        let cleaned = self
            .normalizer
            .normalize(&source.text)
            .map_err(at(Stage::Normalize))?;

        let Some(ctx) = write_ctx else {
            let path = output::save_source(&self.options.outdir, &item.label, &cleaned)
                .map_err(at(Stage::Save))?;
            return Ok(ItemOutcome::Saved { path });
        };

        if source.etag.is_none() {
            if self.options.require_etag {
                return Err(ItemFailure {
                    stage: Stage::Write,
                    error: ItemError::MissingEtag {
                        url: item.url.to_string(),
                    },
                });
            }
            tracing::warn!("no ETag for {}; writing with If-Match: *", item.url);
        }

        let written = self
            .session
            .write_source(
                &item.url,
                &cleaned,
                &ctx.token,
                source.etag.as_ref(),
                ctx.transport,
            )
            .map_err(at(Stage::Write))?;

        if !self.options.mode.activates() {
            return Ok(ItemOutcome::Written { url: written });
        }

        let activation = self
            .session
            .activate(
                &item.url,
                &ctx.token,
                ctx.transport,
                self.options.activation,
            )
            .map_err(at(Stage::Activate))?;
        Ok(ItemOutcome::Activated {
            written,
            activation,
        })
    }
}
