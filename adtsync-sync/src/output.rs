//! Output directory handling and local saves.
//!
//! ## `save_source` — write protocol
//!
//! 1. Build `<outdir>/<label>.abap`.
//! 2. Write to `<path>.adtsync.tmp`.
//! 3. Rename to the final path; remove the `.tmp` if the rename fails.

use std::path::{Path, PathBuf};

use adtsync_core::{resolver::sanitize_label, Label};

use crate::error::{io_err, item_io_err, ItemError, SyncError};

/// Extension of locally saved sources.
pub const SOURCE_EXTENSION: &str = "abap";

/// Remove `outdir` if present and create it empty.
pub fn prepare_outdir(outdir: &Path) -> Result<(), SyncError> {
    if outdir.exists() {
        tracing::info!("cleaning output dir: {}", outdir.display());
        std::fs::remove_dir_all(outdir).map_err(|e| io_err(outdir, e))?;
    }
    std::fs::create_dir_all(outdir).map_err(|e| io_err(outdir, e))
}

/// `<outdir>/<label>.abap` — pure, no I/O.
pub fn source_path(outdir: &Path, label: &Label) -> PathBuf {
    outdir.join(format!("{}.{SOURCE_EXTENSION}", sanitize_label(&label.0)))
}

/// Save cleaned source exactly as given (no line ending or encoding changes).
pub fn save_source(outdir: &Path, label: &Label, content: &str) -> Result<PathBuf, ItemError> {
    let path = source_path(outdir, label);
    let tmp = PathBuf::from(format!("{}.adtsync.tmp", path.display()));
    save_with_tmp(&path, &tmp, content)?;
    Ok(path)
}

fn save_with_tmp(path: &Path, tmp: &Path, content: &str) -> Result<(), ItemError> {
    if path.exists() {
        tracing::warn!(
            "{} already written in this run; label collision, overwriting",
            path.display()
        );
    }

    std::fs::write(tmp, content).map_err(|e| item_io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(item_io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}
