pub mod list;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use adtsync_core::config::{self, Settings};
use adtsync_core::{resolver, WorkItem};

/// Options shared by every subcommand that builds a work list.
#[derive(Args, Debug)]
pub struct ItemArgs {
    /// ADT base URL, e.g. `https://host:44300/sap/bc/adt`.
    #[arg(long)]
    pub base: Option<String>,

    /// Object text endpoint, absolute or relative to `--base`. Repeatable.
    #[arg(long = "url", value_name = "LOCATOR")]
    pub urls: Vec<String>,

    /// File with one locator per line; blank lines and `#` comments are skipped.
    #[arg(long, value_name = "PATH")]
    pub urls_file: Option<PathBuf>,

    /// Settings file (default: `<config dir>/adtsync/config.yaml` when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ItemArgs {
    pub fn settings(&self) -> Result<Settings> {
        config::load(self.config.as_deref()).context("could not load settings")
    }

    pub fn resolve(&self, settings: &Settings) -> Result<Vec<WorkItem>> {
        let base = self
            .base
            .as_deref()
            .or(settings.base.as_deref())
            .context("no base URL: pass --base or set `base` in the settings file")?;
        resolver::resolve_items(base, &self.urls, self.urls_file.as_deref())
            .context("could not build the work list")
    }
}
