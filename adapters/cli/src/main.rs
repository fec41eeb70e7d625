#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a paste scenario against a simulated server.

mod host;
mod scenario;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Streams a blueprint into a simulated remote world one setblock command at a time.
#[derive(Debug, Parser)]
#[command(name = "remote-paste", version)]
struct Args {
    /// Scenario file describing the blueprint, destination and requester.
    #[arg(long)]
    scenario: PathBuf,
    /// Ticks to run before giving up on the paste.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,
    /// Log per-step diagnostics unless RUST_LOG says otherwise.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the remote paste command-line interface.
fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let contents = fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read scenario {}", args.scenario.display()))?;
    let scenario = Scenario::from_toml_str(&contents)
        .with_context(|| format!("invalid scenario {}", args.scenario.display()))?;
    if scenario.region_count() == 0 {
        bail!("scenario {} pastes no regions", args.scenario.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = host::run(scenario.build(), args.max_ticks, &mut out)?;

    for line in &report.lines {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "{}", report.outcome)?;
    tracing::info!(target: "remote_paste::cli", ticks = report.ticks, "run.finished");

    Ok(if report.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
