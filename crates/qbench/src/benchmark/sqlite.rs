//! SQLite `speedtest1`.
//!
//! The figure of merit is the `TOTAL` line speedtest1 prints at the end of a
//! run, not the wall-clock time of the process.

use std::path::PathBuf;

use qbench_table::ResultRecord;

use super::output::{runs, sqlite_total};
use super::{Benchmark, Descriptor, Request, Suite};
use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

pub const SUITE: Suite = Suite {
    prefix: "db.",
    name: "SQLite",
    datasets: &[],
    archs: &[Arch::X86_64, Arch::Aarch64],
    benchmarks,
    create,
};

/// Bench name written to the results table.
const RECORD_NAME: &str = "sqlite-speedtest1";

fn benchmarks() -> Vec<&'static str> {
    vec!["db.sqlite"]
}

fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    Ok(Box::new(Sqlite::new(req, config)?))
}

#[derive(Debug)]
pub struct Sqlite {
    descriptor: Descriptor,
    dir: PathBuf,
    cmdline: Vec<String>,
    env: Env,
}

impl Sqlite {
    pub fn new(req: &Request, config: &Config) -> Result<Self> {
        if req.bench != "db.sqlite" {
            return Err(Error::UnsupportedBenchmark(req.bench.clone()));
        }
        let dir = config.require_path("SQLITE_DIR")?;
        SUITE.check_arch(req.arch)?;

        Ok(Self {
            descriptor: Descriptor {
                name: req.bench.clone(),
                threads: req.threads,
                dataset: None,
                arch: req.arch,
            },
            dir,
            cmdline: Vec::new(),
            env: Env::new(),
        })
    }
}

impl Benchmark for Sqlite {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn prepare(&mut self) -> Result<()> {
        self.cmdline = vec![
            self.dir.join("speedtest1").to_string_lossy().into_owned(),
            "--multithread".to_string(),
            "--threads".to_string(),
            self.descriptor.threads.to_string(),
        ];
        Ok(())
    }

    fn cmdline(&self) -> &[String] {
        &self.cmdline
    }

    fn env(&self) -> &Env {
        &self.env
    }

    fn format_output(&self, capture: &Capture) -> Result<Option<Vec<ResultRecord>>> {
        let stdout = capture.stdout()?;
        let records: Vec<_> = runs(&stdout)
            .iter()
            .flat_map(|run| {
                run.lines.iter().filter_map(|l| sqlite_total(l)).map(move |seconds| {
                    self.descriptor
                        .record(RECORD_NAME, &self.cmdline)
                        .with_measurement("seconds", seconds, run.trailer.retval)
                })
            })
            .collect();
        Ok((!records.is_empty()).then_some(records))
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
