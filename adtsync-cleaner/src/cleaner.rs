//! abap-cleaner command-line driver.
//!
//! Each call:
//!
//! 1. Create a fresh scratch directory.
//! 2. Write the source to `<scratch>/in.abap`.
//! 3. Run `<cleaner> --sourcefile <in.abap> --profile <profile> --release <release>`.
//! 4. Decode stdout (UTF-8, else Windows-1252) as the cleaned source.
//! 5. Drop the scratch directory, on success and on every error path.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::decode::decode_output;
use crate::error::{io_err, CleanerError};
use crate::process::run_with_timeout;
use crate::Normalizer;

const SCRATCH_PREFIX: &str = "adtsync-clean-";
const INPUT_FILE: &str = "in.abap";
const STDERR_PREVIEW: usize = 800;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Normalizer backed by the abap-cleaner binary.
#[derive(Debug, Clone)]
pub struct AbapCleaner {
    program: PathBuf,
    profile: PathBuf,
    release: String,
    timeout: Duration,
    scratch_root: Option<PathBuf>,
}

impl AbapCleaner {
    pub fn new(
        program: impl Into<PathBuf>,
        profile: impl Into<PathBuf>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            profile: profile.into(),
            release: release.into(),
            timeout: DEFAULT_TIMEOUT,
            scratch_root: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir, CleanerError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix(SCRATCH_PREFIX);
            b
        };
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root).map_err(|e| io_err(root, e)),
            None => builder.tempdir().map_err(|e| io_err(env::temp_dir(), e)),
        }
    }
}

impl Normalizer for AbapCleaner {
    fn preflight(&self) -> Result<(), CleanerError> {
        if resolve_program(&self.program).is_none() {
            return Err(CleanerError::ExecutableNotFound {
                path: self.program.clone(),
            });
        }
        if !self.profile.is_file() {
            return Err(CleanerError::ProfileNotFound {
                path: self.profile.clone(),
            });
        }
        Ok(())
    }

    fn normalize(&self, source: &str) -> Result<String, CleanerError> {
        let scratch = self.scratch_dir()?;
        let input = scratch.path().join(INPUT_FILE);
        std::fs::write(&input, source).map_err(|e| io_err(&input, e))?;

        let mut command = Command::new(&self.program);
        command
            .arg("--sourcefile")
            .arg(&input)
            .arg("--profile")
            .arg(&self.profile)
            .arg("--release")
            .arg(&self.release);
        tracing::debug!(
            "running {} on {} ({} bytes)",
            self.program.display(),
            input.display(),
            source.len()
        );

        let captured = run_with_timeout(&self.program, command, self.timeout)?;
        let stdout = decode_output(&captured.stdout);
        let stderr = decode_output(&captured.stderr);

        if !captured.status.success() {
            return Err(CleanerError::Failed {
                code: captured.status.code(),
                stderr,
                stdout,
            });
        }
        if stdout.trim().is_empty() {
            let preview: String = stderr.chars().take(STDERR_PREVIEW).collect();
            return Err(CleanerError::EmptyOutput { stderr: preview });
        }
        Ok(stdout)
    }
}

/// Locate `program` as given, or on `PATH` when it is a bare file name.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    if program.is_file() {
        return Some(program.to_path_buf());
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
