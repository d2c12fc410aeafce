//! adtsync — normalize ABAP sources in place through the ADT REST interface.
//!
//! # Usage
//!
//! ```text
//! adtsync run  --base <url> [--url <locator>]... [--urls-file <path>]
//!              [--mode test|writeback|writeback-noact] [--corrnr <id>]
//!              [--activation service|direct] [--profile <cfj>] [--cleaner <bin>]
//!              [--client 001] [--release 757] [--outdir outputs] [--insecure]
//!              [--timeout-secs 120] [--cleaner-timeout-secs 300] [--require-etag]
//! adtsync list --base <url> [--url <locator>]... [--urls-file <path>] [--json]
//! ```
//!
//! Credentials come from `SAP_USER` / `SAP_PASS`.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use adtsync_core::{ActivationProtocol, RunMode};
use commands::{list::ListArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "adtsync",
    version,
    about = "Fetch, normalize with abap-cleaner, write back and activate ABAP sources over ADT",
    long_about = None,
)]
struct Cli {
    /// Debug-level diagnostics on stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every work item: fetch, normalize, then save or write back.
    Run(RunArgs),

    /// Print the resolved work items without contacting the server.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// Argument wrappers for core enums
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `RunMode` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunModeArg(pub RunMode);

impl FromStr for RunModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Ok(Self(RunMode::Test)),
            "writeback" => Ok(Self(RunMode::Writeback)),
            "writeback-noact" | "writeback_noact" => Ok(Self(RunMode::WritebackNoact)),
            other => Err(format!(
                "unknown mode '{other}'; expected: test, writeback, writeback-noact"
            )),
        }
    }
}

impl fmt::Display for RunModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Thin wrapper so clap can parse `ActivationProtocol` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ActivationArg(pub ActivationProtocol);

impl FromStr for ActivationArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "service" => Ok(Self(ActivationProtocol::Service)),
            "direct" => Ok(Self(ActivationProtocol::Direct)),
            other => Err(format!(
                "unknown activation protocol '{other}'; expected: service, direct"
            )),
        }
    }
}

impl fmt::Display for ActivationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
