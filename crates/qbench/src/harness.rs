//! One harness invocation, end to end.
//!
//! ```text
//! config -> benchmark -> prepare -> runtime -> merge -> execute
//!        -> parse -> stamp -> append -> cleanup
//! ```
//!
//! The benchmark is cleaned up on every path out of [`run`], including
//! errors raised after `prepare`.

use std::path::PathBuf;

use tracing::{Level, debug, enabled, info, warn};

use crate::arch::Arch;
use crate::benchmark::output::Trailer;
use crate::benchmark::{self, Benchmark, Request, Stage};
use crate::config::Config;
use crate::pipeline::{self, Invocation, Observer};
use crate::runtime::{self, RuntimeRequest};
use crate::Result;

/// Everything a single invocation needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub bench: String,
    pub dataset: String,
    pub runtime: String,
    /// Results table; `.csv` selects the delimited format.
    pub output: PathBuf,
    pub arch: Arch,
    pub threads: u32,
    pub runs: u32,
    pub tag: String,
    pub config_file: PathBuf,
    /// Extra emulator options, whitespace separated.
    pub runtime_opts: Option<String>,
}

/// What an invocation produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Absolute path of the results table.
    pub output: PathBuf,
    /// Records appended, or `None` when the output held no usable data.
    pub written: Option<usize>,
    /// One trailer per run.
    pub trailers: Vec<Trailer>,
}

/// A benchmark together with the lifecycle stage it has reached.
struct Session {
    bench: Box<dyn Benchmark>,
    stage: Stage,
}

impl Session {
    fn new(bench: Box<dyn Benchmark>) -> Self {
        Self {
            bench,
            stage: Stage::Constructed,
        }
    }

    fn advance(&mut self, to: Stage) {
        debug_assert!(to > self.stage, "stage {:?} after {:?}", to, self.stage);
        debug!(from = ?self.stage, to = ?to, "benchmark stage");
        self.stage = to;
    }

    fn prepare(&mut self) -> Result<()> {
        self.bench.prepare()?;
        self.advance(Stage::Prepared);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.stage == Stage::CleanedUp {
            return Ok(());
        }
        // Marked first so a failing cleanup is not retried on drop.
        self.stage = Stage::CleanedUp;
        self.bench.cleanup()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.stage != Stage::CleanedUp {
            debug!(stage = ?self.stage, "cleaning up after failure");
            if let Err(e) = self.cleanup() {
                warn!(error = %e, "cleanup failed");
            }
        }
    }
}

/// Run the benchmark described by `opts` and append its results.
pub fn run(opts: &RunOptions) -> Result<Outcome> {
    run_with(opts, &mut ())
}

/// [`run`], reporting per-run progress to `observer`.
pub fn run_with(opts: &RunOptions, observer: &mut dyn Observer) -> Result<Outcome> {
    let output = std::path::absolute(&opts.output)?;

    let config = Config::load(&opts.config_file)?;
    info!(%config, "configuration loaded");

    info!("creating benchmark");
    let request = Request {
        bench: opts.bench.clone(),
        dataset: opts.dataset.clone(),
        arch: opts.arch,
        threads: opts.threads,
    };
    let mut session = Session::new(benchmark::create(&request, &config)?);
    info!(bench = %session.bench.descriptor(), "benchmark created");

    info!("preparing benchmark");
    session.prepare()?;
    info!(cmdline = ?session.bench.cmdline(), "benchmark is ready");

    let runtime = runtime::create(
        &RuntimeRequest {
            id: opts.runtime.clone(),
            arch: opts.arch,
            extra_opts: opts.runtime_opts.clone(),
        },
        &config,
    )?;
    info!(runtime = runtime.name(), cmdline = ?runtime.cmdline(), "runtime is ready");

    let invocation = Invocation::merge(runtime.as_ref(), session.bench.as_ref(), opts.runs);
    info!(env = ?invocation.env, "environment overlay");
    let capture = pipeline::execute_with(&invocation, observer)?;
    session.advance(Stage::Executed);

    info!("formatting output");
    let parsed = session.bench.format_output(&capture)?;
    session.advance(Stage::Parsed);

    let written = match parsed {
        Some(mut records) => {
            for record in &mut records {
                record.stamp(runtime.name(), &opts.tag);
            }
            qbench_table::append(&output, &records)?;
            crate::metrics::record_written(&opts.bench, records.len());
            info!(path = %output.display(), records = records.len(), "results available");
            Some(records.len())
        }
        None => {
            warn!(bench = %opts.bench, "no usable output, nothing recorded");
            None
        }
    };

    if enabled!(Level::INFO) {
        info!("standard output:\n{}", capture.stdout()?);
        info!("standard error:\n{}", capture.stderr()?);
    }

    info!("cleaning up benchmark data");
    session.cleanup()?;

    Ok(Outcome {
        output,
        written,
        trailers: capture.trailers()?,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    use qbench_table::ResultRecord;

    use super::*;
    use crate::benchmark::Descriptor;
    use crate::pipeline::Capture;
    use crate::{Env, Error};

    /// Benchmark double recording whether cleanup ran.
    #[derive(Debug)]
    struct Probe {
        descriptor: Descriptor,
        cleaned: Rc<Cell<u32>>,
        fail_prepare: bool,
        cmdline: Vec<String>,
        env: Env,
    }

    impl Probe {
        fn new(fail_prepare: bool) -> (Self, Rc<Cell<u32>>) {
            let cleaned = Rc::new(Cell::new(0));
            let probe = Self {
                descriptor: Descriptor {
                    name: "probe".to_string(),
                    threads: 1,
                    dataset: None,
                    arch: Arch::X86_64,
                },
                cleaned: Rc::clone(&cleaned),
                fail_prepare,
                cmdline: Vec::new(),
                env: Env::new(),
            };
            (probe, cleaned)
        }
    }

    impl Benchmark for Probe {
        fn descriptor(&self) -> &Descriptor {
            &self.descriptor
        }

        fn prepare(&mut self) -> Result<()> {
            if self.fail_prepare {
                return Err(Error::Extract {
                    archive: PathBuf::from("input_test.tar"),
                    reason: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn cmdline(&self) -> &[String] {
            &self.cmdline
        }

        fn env(&self) -> &Env {
            &self.env
        }

        fn format_output(&self, _capture: &Capture) -> Result<Option<Vec<ResultRecord>>> {
            Ok(None)
        }

        fn cleanup(&mut self) -> Result<()> {
            self.cleaned.set(self.cleaned.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_failed_prepare_still_cleans_up() {
        let (probe, cleaned) = Probe::new(true);
        {
            let mut session = Session::new(Box::new(probe));
            assert!(session.prepare().is_err());
            assert_eq!(session.stage, Stage::Constructed);
        }
        assert_eq!(cleaned.get(), 1);
    }

    #[test]
    fn test_cleanup_runs_once() {
        let (probe, cleaned) = Probe::new(false);
        {
            let mut session = Session::new(Box::new(probe));
            session.prepare().unwrap();
            session.cleanup().unwrap();
            session.cleanup().unwrap();
        }
        assert_eq!(cleaned.get(), 1);
    }

    #[test]
    fn test_missing_config_file() {
        let opts = RunOptions {
            bench: "micro.math".to_string(),
            dataset: "none".to_string(),
            runtime: "native".to_string(),
            output: PathBuf::from("results.csv"),
            arch: Arch::X86_64,
            threads: 1,
            runs: 1,
            tag: "none".to_string(),
            config_file: Path::new("/nonexistent/config").to_path_buf(),
            runtime_opts: None,
        };
        assert!(matches!(run(&opts), Err(Error::Io(_))));
    }
}
