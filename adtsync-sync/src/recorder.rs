//! Failure recorder — per-run failure artifacts.
//!
//! ```text
//! <outdir>/failures_<run_id>.txt     human-readable blocks
//! <outdir>/failures_<run_id>.jsonl   one JSON object per failure
//! <outdir>/retry_urls_<run_id>.txt   failed URLs, one per line (written at finish)
//! ```
//!
//! The two logs are appended as failures happen, so a crashed run still
//! leaves what it saw. Lock detection is a text match on the error message;
//! the server exposes no structured conflict signal, so it can miss.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use adtsync_core::{text::truncate_chars, WorkItem};

use crate::error::{io_err, SyncError};
use crate::outcome::{ItemFailure, Stage};

/// Characters of the error message kept in the structured log.
pub const JSON_ERROR_LIMIT: usize = 4000;

static LOCKED_IN_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"locked in request\s+([A-Z0-9]{10})").expect("static regex")
});

/// Transport request holding the lock, if the message says so.
///
/// Heuristic: matches `locked in request <10 alphanumerics>` anywhere in the text.
pub fn extract_lock_transport(message: &str) -> Option<String> {
    LOCKED_IN_REQUEST
        .captures(message)
        .map(|caps| caps[1].to_string())
}

/// One line of the structured failure log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub label: String,
    pub url: String,
    pub stage: Stage,
    pub error: String,
    pub lock_corrnr: Option<String>,
}

/// Artifact paths of a run. Files only exist when something failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    pub failure_log: PathBuf,
    pub failure_jsonl: PathBuf,
    pub retry_urls: PathBuf,
}

impl RunArtifacts {
    pub fn for_run(outdir: &Path, run_id: &str) -> Self {
        Self {
            failure_log: outdir.join(format!("failures_{run_id}.txt")),
            failure_jsonl: outdir.join(format!("failures_{run_id}.jsonl")),
            retry_urls: outdir.join(format!("retry_urls_{run_id}.txt")),
        }
    }
}

/// Appends failures to the run logs and collects the retry list.
#[derive(Debug)]
pub struct FailureRecorder {
    artifacts: RunArtifacts,
    retry: Vec<String>,
    seen: HashSet<String>,
}

impl FailureRecorder {
    pub fn new(outdir: &Path, run_id: &str) -> Self {
        Self {
            artifacts: RunArtifacts::for_run(outdir, run_id),
            retry: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn artifacts(&self) -> &RunArtifacts {
        &self.artifacts
    }

    /// URLs queued for the retry file, in first-failure order.
    pub fn retry_urls(&self) -> &[String] {
        &self.retry
    }

    /// Queue the item for retry, then append the failure to both logs.
    ///
    /// The retry entry survives a failed log write.
    pub fn record(
        &mut self,
        item: &WorkItem,
        failure: &ItemFailure,
    ) -> Result<FailureEntry, SyncError> {
        let message = failure.message();
        let lock_corrnr = extract_lock_transport(&message);
        let entry = FailureEntry {
            label: item.label.0.clone(),
            url: item.locator.clone(),
            stage: failure.stage,
            error: truncate_chars(&message, JSON_ERROR_LIMIT).to_string(),
            lock_corrnr,
        };

        tracing::warn!(
            "{} failed at {}{}",
            entry.url,
            entry.stage,
            entry
                .lock_corrnr
                .as_deref()
                .map(|c| format!(" (locked in {c})"))
                .unwrap_or_default()
        );

        if self.seen.insert(entry.url.clone()) {
            self.retry.push(entry.url.clone());
        }

        append(&self.artifacts.failure_log, &text_block(&entry, &message))?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        append(&self.artifacts.failure_jsonl, &line)?;
        Ok(entry)
    }

    /// Flush the retry list (if any) and return the artifact paths.
    pub fn finish(self) -> Result<RunArtifacts, SyncError> {
        if !self.retry.is_empty() {
            let mut contents = self.retry.join("\n");
            contents.push('\n');
            let path = &self.artifacts.retry_urls;
            std::fs::write(path, contents).map_err(|e| io_err(path, e))?;
        }
        Ok(self.artifacts)
    }
}

fn text_block(entry: &FailureEntry, full_message: &str) -> String {
    let mut block = format!("---\nLABEL: {}\nURL: {}\n", entry.label, entry.url);
    if let Some(corrnr) = &entry.lock_corrnr {
        block.push_str(&format!("LOCKED_IN: {corrnr}\n"));
    }
    block.push_str(&format!("STAGE: {}\nERROR:\n{full_message}\n", entry.stage));
    block
}

fn append(path: &Path, text: &str) -> Result<(), SyncError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(text.as_bytes()).map_err(|e| io_err(path, e))
}
