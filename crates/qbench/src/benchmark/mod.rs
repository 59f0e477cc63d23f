//! Benchmark suites and the benchmark lifecycle.
//!
//! Every workload goes through the same stages, driven by the harness:
//!
//! ```text
//! Constructed -> Prepared -> Executed -> Parsed -> CleanedUp
//! ```
//!
//! Construction validates the request against the suite's allow-lists,
//! [`Benchmark::prepare`] sets up inputs and finalizes the command line,
//! the pipeline runs the binary, [`Benchmark::format_output`] turns the
//! captured output into records and [`Benchmark::cleanup`] releases whatever
//! `prepare` created.

mod micro;
mod openssl;
pub mod output;
mod parsec;
mod phoenix;
mod scratch;
mod sqlite;

pub use scratch::Scratch;

use std::fmt;
use std::path::Path;

use qbench_table::ResultRecord;

use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

/// Lifecycle stage of a benchmark instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Constructed,
    Prepared,
    Executed,
    Parsed,
    CleanedUp,
}

/// What the user asked to run.
#[derive(Debug, Clone)]
pub struct Request {
    /// Benchmark identifier, e.g. `parsec.blackscholes`.
    pub bench: String,
    /// Dataset selector; its vocabulary depends on the suite.
    pub dataset: String,
    /// ISA of the binary to select.
    pub arch: Arch,
    /// Requested thread count.
    pub threads: u32,
}

/// Identity of a constructed benchmark, shared by all its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub threads: u32,
    /// `None` for suites without input classes.
    pub dataset: Option<String>,
    pub arch: Arch,
}

impl Descriptor {
    /// Dataset as written to the results table.
    pub fn dataset_label(&self) -> &str {
        self.dataset.as_deref().unwrap_or("none")
    }

    /// Start a record for this benchmark. `bench` may differ from `name`
    /// when one run yields several data points.
    pub fn record(&self, bench: impl Into<String>, cmdline: &[String]) -> ResultRecord {
        ResultRecord::new(bench, self.dataset_label(), self.arch.as_str(), self.threads)
            .with_cmdline(cmdline.join(" "))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<name={}, threads={}, dataset={}, arch={}>",
            self.name,
            self.threads,
            self.dataset_label(),
            self.arch
        )
    }
}

/// A runnable workload.
pub trait Benchmark: fmt::Debug {
    fn descriptor(&self) -> &Descriptor;

    /// Set up inputs and finalize [`cmdline`](Self::cmdline) and
    /// [`env`](Self::env).
    fn prepare(&mut self) -> Result<()>;

    /// Benchmark command line. Empty until prepared.
    fn cmdline(&self) -> &[String];

    /// Environment overlay for the child.
    fn env(&self) -> &Env;

    /// Directory the child must be started in, if not the harness's own.
    fn workdir(&self) -> Option<&Path> {
        None
    }

    /// Parse captured output. `Ok(None)` means the run produced no usable
    /// data, as opposed to `Ok(Some(vec![]))`.
    fn format_output(&self, capture: &Capture) -> Result<Option<Vec<ResultRecord>>>;

    /// Release everything `prepare` created.
    fn cleanup(&mut self) -> Result<()>;
}

type Constructor = fn(&Request, &Config) -> Result<Box<dyn Benchmark>>;

/// A family of benchmarks sharing an identifier prefix.
pub struct Suite {
    /// Identifier prefix including the dot, e.g. `parsec.`.
    pub prefix: &'static str,
    /// Human readable suite name.
    pub name: &'static str,
    /// Accepted datasets. Empty when the suite ignores the dataset.
    pub datasets: &'static [&'static str],
    /// Accepted architectures.
    pub archs: &'static [Arch],
    benchmarks: fn() -> Vec<&'static str>,
    create: Constructor,
}

impl Suite {
    /// Identifiers of every benchmark in this suite.
    pub fn benchmarks(&self) -> Vec<&'static str> {
        (self.benchmarks)()
    }

    /// Check `dataset` against the suite's allow-list.
    pub fn check_dataset(&self, dataset: &str) -> Result<()> {
        if self.datasets.is_empty() || self.datasets.contains(&dataset) {
            Ok(())
        } else {
            Err(Error::UnsupportedDataset {
                suite: self.name,
                dataset: dataset.to_string(),
                supported: self.datasets.join(", "),
            })
        }
    }

    /// Check `arch` against the suite's allow-list.
    pub fn check_arch(&self, arch: Arch) -> Result<()> {
        if self.archs.contains(&arch) {
            Ok(())
        } else {
            Err(Error::UnsupportedArchitecture {
                target: self.name.to_string(),
                arch: arch.to_string(),
                supported: Arch::join(self.archs),
            })
        }
    }
}

/// All registered suites.
pub static SUITES: &[Suite] = &[
    parsec::SUITE,
    phoenix::SUITE,
    openssl::SUITE,
    micro::SUITE,
    sqlite::SUITE,
];

/// Find the suite an identifier belongs to.
pub fn find_suite(bench: &str) -> Option<&'static Suite> {
    SUITES.iter().find(|s| bench.starts_with(s.prefix))
}

/// Construct the benchmark named by `req.bench`.
pub fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    let suite =
        find_suite(&req.bench).ok_or_else(|| Error::UnsupportedBenchmark(req.bench.clone()))?;
    (suite.create)(req, config)
}

/// Human readable list of the datasets `bench` accepts.
pub fn datasets_help(bench: &str) -> Result<String> {
    let suite = find_suite(bench).ok_or_else(|| Error::UnsupportedBenchmark(bench.to_string()))?;
    if suite.datasets.is_empty() {
        Ok(format!(
            "{} benchmarks take no dataset; any value is accepted and recorded as 'none'",
            suite.name
        ))
    } else {
        Ok(format!("{} datasets: {}", suite.name, suite.datasets.join(", ")))
    }
}

/// Build a `Vec<String>` from string literals.
fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn request(bench: &str, dataset: &str, arch: Arch, threads: u32) -> Request {
        Request {
            bench: bench.to_string(),
            dataset: dataset.to_string(),
            arch,
            threads,
        }
    }
}
