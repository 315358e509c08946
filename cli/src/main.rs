//! Online transaction simulator CLI
//!
//! # Usage
//!
//! ```bash
//! # One-year default simulation, print each hour's transactions
//! txn-sim
//!
//! # Custom parameters, JSON output, stop after 24 prints
//! txn-sim --config params.json --format json --max-prints 24
//!
//! # Keep the log between steps (each print is cumulative)
//! txn-sim --keep-log
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use txn_simulator_core_rs::{
    DataLogView, Dataset, OnlineDriver, SimulationParams, TransactionModel,
};

const DEFAULT_FILTER: &str = "txn_simulator_core_rs=info,txn_sim=info";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Fixed-width table
    Table,
    /// One JSON object per print
    Json,
}

/// Step a transaction simulator and print its log as it grows
#[derive(Parser, Debug)]
#[command(name = "txn-sim")]
#[command(about = "Online card transaction simulator")]
#[command(version)]
struct Cli {
    /// Simulation parameters (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Step size passed to every step call
    #[arg(short, long, default_value_t = 1)]
    steps: usize,

    /// Do not clear the log after printing it
    #[arg(long)]
    keep_log: bool,

    /// Output format of each printed log
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Stop after this many prints
    #[arg(long)]
    max_prints: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let params = match &cli.config {
        Some(path) => SimulationParams::from_json_file(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => SimulationParams::default(),
    };

    let mut driver = OnlineDriver::new(params).context("failed to build simulator")?;
    info!(run_id = %driver.run_id(), steps = cli.steps, "starting online simulation");

    if cli.steps == 0 {
        warn!("--steps 0 never advances the simulation");
    }

    let options = LoopOptions {
        steps: cli.steps,
        clear_after: !cli.keep_log,
        format: cli.format,
        max_prints: cli.max_prints,
    };
    let stdout = std::io::stdout();
    let prints = run_online(&mut driver, &options, &mut stdout.lock())?;

    info!(prints, terminated = driver.is_terminated(), "simulation finished");
    Ok(())
}

/// Settings of the step-and-print loop
#[derive(Debug, Clone)]
struct LoopOptions {
    steps: usize,
    clear_after: bool,
    format: OutputFormat,
    max_prints: Option<usize>,
}

/// Step `driver` until it reports termination, writing the log after every
/// successful step. Returns the number of logs written.
fn run_online<M: TransactionModel, W: Write>(
    driver: &mut OnlineDriver<M>,
    options: &LoopOptions,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut prints = 0;
    while driver.step(options.steps)? {
        let log = driver.drain_log(options.clear_after);
        write_log(out, &log, options.format)?;
        prints += 1;

        if options.max_prints.is_some_and(|max| prints >= max) {
            info!(prints, "print limit reached, stopping early");
            break;
        }
    }
    Ok(prints)
}

fn write_log<W: Write>(out: &mut W, log: &Dataset, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => writeln!(out, "{log}\n")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &DataLogView::new(log).to_json())?;
            writeln!(out)?;
        }
    }
    Ok(())
}
