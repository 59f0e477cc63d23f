//! Micro benchmarks printing `test,value` lines in operations per millisecond.

use qbench_table::ResultRecord;
use tracing::debug;

use super::output::{comma_point, runs};
use super::{Benchmark, Descriptor, Request, Suite};
use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

pub const SUITE: Suite = Suite {
    prefix: "micro.",
    name: "micro",
    datasets: &[],
    archs: &[Arch::X86_64, Arch::Aarch64],
    benchmarks,
    create,
};

/// Identifier and the configuration key naming its binary.
const PROGRAMS: &[(&str, &str)] = &[("micro.math", "MATH_BIN")];

fn benchmarks() -> Vec<&'static str> {
    PROGRAMS.iter().map(|(name, _)| *name).collect()
}

fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    Ok(Box::new(Micro::new(req, config)?))
}

#[derive(Debug)]
pub struct Micro {
    descriptor: Descriptor,
    binary: String,
    cmdline: Vec<String>,
    env: Env,
}

impl Micro {
    pub fn new(req: &Request, config: &Config) -> Result<Self> {
        let (_, key) = PROGRAMS
            .iter()
            .find(|(name, _)| *name == req.bench)
            .ok_or_else(|| Error::UnsupportedBenchmark(req.bench.clone()))?;
        let binary = config.require_path(key)?.to_string_lossy().into_owned();
        SUITE.check_arch(req.arch)?;

        Ok(Self {
            descriptor: Descriptor {
                name: req.bench.clone(),
                threads: 1,
                dataset: None,
                arch: req.arch,
            },
            binary,
            cmdline: Vec::new(),
            env: Env::new(),
        })
    }
}

impl Benchmark for Micro {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn prepare(&mut self) -> Result<()> {
        self.cmdline = vec![self.binary.clone()];
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
        let mut records = Vec::new();
        for run in runs(&stdout) {
            for line in run.lines.iter().filter(|l| !l.trim().is_empty()) {
                let Some((test, value)) = comma_point(line) else {
                    debug!(line, "skipping malformed line");
                    continue;
                };
                records.push(
                    self.descriptor
                        .record(format!("{}-{test}", self.descriptor.name), &self.cmdline)
                        .with_measurement("ops/ms", value, run.trailer.retval),
                );
            }
        }
        Ok((!records.is_empty()).then_some(records))
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
