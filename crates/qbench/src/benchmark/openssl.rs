//! `openssl speed` digest throughput.
//!
//! Runs `openssl speed -mr <alg>` and turns the machine-readable block-size
//! sweep into one `B/s` record per block size:
//!
//! ```text
//! +H:16:64:256:1024:8192:16384
//! +F:0:md5:61234567.89:...
//! ```

use qbench_table::ResultRecord;
use tracing::debug;

use super::output::{runs, sweep_header, sweep_values};
use super::{Benchmark, Descriptor, Request, Suite};
use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

pub const SUITE: Suite = Suite {
    prefix: "openssl.",
    name: "OpenSSL",
    datasets: &[],
    archs: &[Arch::X86_64, Arch::Aarch64],
    benchmarks,
    create,
};

const ALGORITHMS: [&str; 3] = ["md5", "sha1", "sha256"];

fn benchmarks() -> Vec<&'static str> {
    vec!["openssl.md5", "openssl.sha1", "openssl.sha256"]
}

fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    Ok(Box::new(OpenSsl::new(req, config)?))
}

#[derive(Debug)]
pub struct OpenSsl {
    descriptor: Descriptor,
    binary: String,
    algorithm: &'static str,
    cmdline: Vec<String>,
    env: Env,
}

impl OpenSsl {
    pub fn new(req: &Request, config: &Config) -> Result<Self> {
        let algorithm = req
            .bench
            .strip_prefix(SUITE.prefix)
            .and_then(|name| ALGORITHMS.iter().copied().find(|a| *a == name))
            .ok_or_else(|| Error::UnsupportedBenchmark(req.bench.clone()))?;
        let binary = config.require_path("OPENSSL_BIN")?.to_string_lossy().into_owned();
        SUITE.check_arch(req.arch)?;

        Ok(Self {
            descriptor: Descriptor {
                name: req.bench.clone(),
                threads: 1,
                dataset: None,
                arch: req.arch,
            },
            binary,
            algorithm,
            cmdline: Vec::new(),
            env: Env::new(),
        })
    }

    /// Records for one run, paired positionally.
    fn sweep(&self, lines: &[&str], retval: i32) -> Result<Vec<ResultRecord>> {
        // The last header and value lines of the run win.
        let sizes = lines.iter().rev().find_map(|l| sweep_header(l));
        let values = lines.iter().rev().find_map(|l| sweep_values(l));

        let (sizes, values) = match (sizes, values) {
            (None, None) => return Ok(Vec::new()),
            (Some(sizes), Some(values)) if sizes.len() == values.len() => (sizes, values),
            (sizes, values) => {
                return Err(Error::InconsistentOutput(format!(
                    "{} block sizes and {} throughput values",
                    sizes.map_or(0, |s| s.len()),
                    values.map_or(0, |v| v.len())
                )));
            }
        };

        sizes
            .iter()
            .zip(&values)
            .map(|(size, value)| {
                let value: f64 = value.parse().map_err(|_| {
                    Error::InconsistentOutput(format!("invalid throughput value '{value}'"))
                })?;
                Ok(self
                    .descriptor
                    .record(format!("{}-{size}", self.descriptor.name), &self.cmdline)
                    .with_measurement("B/s", value, retval))
            })
            .collect()
    }
}

impl Benchmark for OpenSsl {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn prepare(&mut self) -> Result<()> {
        self.cmdline = vec![
            self.binary.clone(),
            "speed".to_string(),
            "-mr".to_string(),
            self.algorithm.to_string(),
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
        let mut records = Vec::new();
        for run in runs(&stdout) {
            let points = self.sweep(&run.lines, run.trailer.retval)?;
            debug!(run = run.trailer.run, points = points.len(), "parsed sweep");
            records.extend(points);
        }
        Ok((!records.is_empty()).then_some(records))
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
