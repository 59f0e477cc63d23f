//! Compare results against a baseline and write a markdown report.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use qbench::compare::{self, Baseline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qbench-compare")]
#[command(about = "Normalize a results table to a baseline configuration")]
struct Args {
    /// Results table written by qbench (.csv or binary)
    #[arg(short, long)]
    input: PathBuf,

    /// Markdown report to write
    #[arg(short, long)]
    output: PathBuf,

    /// Baseline to compare against, in the format arch,runtime,tag
    #[arg(short, long)]
    baseline: String,

    /// Set the verbosity level (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn run(args: &Args) -> qbench::Result<()> {
    let baseline = Baseline::parse(&args.baseline)?;
    let rows = qbench_table::read_table(&args.input)?;
    info!(rows = rows.len(), input = %args.input.display(), "results loaded");

    let report = compare::compare(&rows, &baseline);
    std::fs::write(&args.output, format!("# Normalized to {baseline}\n\n{report}"))?;
    info!(output = %args.output.display(), "report written");
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = qbench::log_level(args.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}
