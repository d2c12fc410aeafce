//! `adtsync run` — the batch itself.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use adtsync_cleaner::AbapCleaner;
use adtsync_client::{AdtSession, Credentials, SessionOptions};
use adtsync_core::config::{
    DEFAULT_CLEANER, DEFAULT_CLEANER_TIMEOUT_SECS, DEFAULT_CLIENT, DEFAULT_OUTDIR,
    DEFAULT_PROFILE, DEFAULT_RELEASE, DEFAULT_TIMEOUT_SECS,
};
use adtsync_core::{TransportRequest, WorkItem};
use adtsync_sync::{ItemOutcome, ItemReport, Pipeline, RunOptions, Sequential};

use super::ItemArgs;
use crate::{ActivationArg, RunModeArg};

pub const USER_ENV: &str = "SAP_USER";
pub const PASSWORD_ENV: &str = "SAP_PASS";

/// Arguments for `adtsync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub items: ItemArgs,

    /// SAP client sent as `sap-client`.
    #[arg(long)]
    pub client: Option<String>,

    /// ABAP release passed to the cleaner.
    #[arg(long)]
    pub release: Option<String>,

    /// abap-cleaner profile (.cfj).
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// abap-cleaner command-line executable.
    #[arg(long, value_name = "PATH")]
    pub cleaner: Option<PathBuf>,

    /// Output directory; cleared at the start of every run.
    #[arg(long, value_name = "PATH")]
    pub outdir: Option<PathBuf>,

    /// Skip TLS certificate and hostname verification.
    #[arg(long)]
    pub insecure: bool,

    /// test | writeback | writeback-noact
    #[arg(long, default_value = "test")]
    pub mode: RunModeArg,

    /// Transport request for writes and activation.
    #[arg(long)]
    pub corrnr: Option<String>,

    /// service | direct
    #[arg(long)]
    pub activation: Option<ActivationArg>,

    /// Per-request network timeout.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Per-item limit for the cleaner subprocess.
    #[arg(long)]
    pub cleaner_timeout_secs: Option<u64>,

    /// Fail an item instead of writing with `If-Match: *` when no ETag came back.
    #[arg(long)]
    pub require_etag: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let credentials = credentials_from_env()?;
        let settings = self.items.settings()?;
        let items = self.items.resolve(&settings)?;

        let client = self
            .client
            .or(settings.client)
            .unwrap_or_else(|| DEFAULT_CLIENT.to_string());
        let release = self
            .release
            .or(settings.release)
            .unwrap_or_else(|| DEFAULT_RELEASE.to_string());
        let profile = self
            .profile
            .or(settings.profile)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE));
        let program = self
            .cleaner
            .or(settings.cleaner)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLEANER));
        let outdir = self
            .outdir
            .or(settings.outdir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTDIR));
        let activation = self
            .activation
            .map(|a| a.0)
            .or(settings.activation)
            .unwrap_or_default();
        let timeout = self
            .timeout_secs
            .or(settings.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let cleaner_timeout = self
            .cleaner_timeout_secs
            .or(settings.cleaner_timeout_secs)
            .unwrap_or(DEFAULT_CLEANER_TIMEOUT_SECS);
        let insecure = self.insecure || settings.insecure.unwrap_or(false);
        if insecure {
            tracing::warn!("TLS verification disabled");
        }

        let session = AdtSession::new(
            &credentials,
            &SessionOptions {
                client,
                insecure,
                timeout: Duration::from_secs(timeout),
            },
        )
        .context("could not set up the HTTP session")?;
        let cleaner = AbapCleaner::new(program, profile, release)
            .with_timeout(Duration::from_secs(cleaner_timeout));

        let mode = self.mode.0;
        let options = RunOptions {
            mode,
            transport: self.corrnr.as_deref().and_then(TransportRequest::parse),
            activation,
            outdir,
            require_etag: self.require_etag,
        };

        println!("{} mode: {mode}", info());
        println!("{} items: {}", info(), items.len());

        let pipeline = Pipeline::new(&session, &cleaner, options);
        let summary = pipeline
            .run(&items, &Sequential, &mut print_report)
            .context("run aborted")?;

        let artifacts = &summary.artifacts;
        println!("{} failure log: {}", info(), artifacts.failure_log.display());
        println!("{} failure jsonl: {}", info(), artifacts.failure_jsonl.display());
        println!("{} retry urls: {}", info(), artifacts.retry_urls.display());
        println!(
            "\nDONE: ok={} fail={} outdir={}",
            summary.ok,
            summary.fail,
            summary.outdir.display()
        );
        Ok(())
    }
}

fn credentials_from_env() -> Result<Credentials> {
    let user = env::var(USER_ENV).unwrap_or_default();
    let password = env::var(PASSWORD_ENV).unwrap_or_default();
    if user.is_empty() || password.is_empty() {
        bail!("set {USER_ENV} and {PASSWORD_ENV} in the environment");
    }
    Ok(Credentials::new(user, password))
}

fn info() -> colored::ColoredString {
    "[info]".cyan()
}

fn print_report(item: &WorkItem, report: &ItemReport) {
    let ok = "[ok]".green().bold();
    match report {
        Ok(ItemOutcome::Saved { path }) => {
            println!("{ok} TEST  {} -> {}", item.locator, path.display());
        }
        Ok(ItemOutcome::Written { url }) => {
            println!("{ok} WRITE {url} -> updated on server");
        }
        Ok(ItemOutcome::Activated { written, .. }) => {
            println!("{ok} WRITE {written} -> updated on server");
            println!("{ok} ACTIVATE {}", item.label);
        }
        Err(failure) => {
            println!("{} {} ({})", "[fail]".red().bold(), item.locator, failure.stage);
        }
    }
}
