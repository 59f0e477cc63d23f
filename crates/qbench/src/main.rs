//! qbench CLI - benchmark orchestration harness

mod cli;
mod terminal;

use clap::Parser;
use qbench::benchmark::{SUITES, datasets_help};
use qbench::{harness, log_level, runtime};
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS};
use terminal::RunProgress;

fn main() {
    let cli = Cli::parse();

    let metrics_handle = if cli.metrics {
        qbench::metrics::CliRecorder::new().install()
    } else {
        None
    };
    qbench::metrics::init();

    // RUST_LOG, when set, takes precedence over -v.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose))),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    if cli.list {
        for suite in SUITES {
            println!("{}:", suite.name);
            for bench in suite.benchmarks() {
                println!("  {bench}");
            }
        }
        println!("runtimes: {}", runtime::names().collect::<Vec<_>>().join(", "));
        return EXIT_SUCCESS;
    }

    let Some(opts) = cli.run_options() else {
        error!("missing required arguments, see --help");
        return EXIT_FAILURE;
    };

    if opts.dataset == "help" {
        return match datasets_help(&opts.bench) {
            Ok(help) => {
                println!("{help}");
                EXIT_SUCCESS
            }
            Err(e) => {
                error!("{e}");
                EXIT_FAILURE
            }
        };
    }

    let mut progress = RunProgress::new(&opts.bench);
    match harness::run_with(&opts, &mut progress) {
        Ok(outcome) => {
            match outcome.written {
                Some(count) => {
                    terminal::success(&format!("{count} records appended"));
                    terminal::path_output(&outcome.output);
                }
                None => terminal::warning("no usable output, nothing recorded"),
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("{e}");
            terminal::error(&format!("{} failed", opts.bench));
            EXIT_FAILURE
        }
    }
}
