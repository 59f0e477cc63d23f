//! Phoenix 2.0 MapReduce workloads.
//!
//! Programs live under `<PHOENIX_DIR>/phoenix-2.0/tests/<dir>/`. Workloads
//! that read a data file get a private copy of it in a scratch directory.
//! Phoenix sizes its worker pool from the host, so the recorded thread count
//! is the host CPU count regardless of `-n`.

use std::path::PathBuf;

use qbench_table::ResultRecord;

use super::output::per_run_seconds;
use super::{Benchmark, Descriptor, Request, Scratch, Suite, strings};
use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

pub const SUITE: Suite = Suite {
    prefix: "phoenix.",
    name: "Phoenix",
    datasets: &[],
    archs: &[Arch::X86_64],
    benchmarks,
    create,
};

#[derive(Debug)]
struct App {
    /// Identifier suffix after `phoenix.`.
    name: &'static str,
    /// Directory and binary name under `tests/`.
    dir: &'static str,
    /// Input file relative to the app directory, copied before the run.
    datafile: Option<&'static str>,
    args: &'static [&'static str],
}

const APPS: &[App] = &[
    App {
        name: "histogram",
        dir: "histogram",
        datafile: Some("histogram_datafiles/large.bmp"),
        args: &[],
    },
    App {
        name: "kmeans",
        dir: "kmeans",
        datafile: None,
        args: &[],
    },
    App {
        name: "linearregression",
        dir: "linear_regression",
        datafile: Some("linear_regression_datafiles/key_file_500MB.txt"),
        args: &[],
    },
    App {
        name: "matrixmultiply",
        dir: "matrix_multiply",
        datafile: None,
        args: &["5000", "5000", "1"],
    },
    App {
        name: "pca",
        dir: "pca",
        datafile: None,
        args: &["-r", "5000", "-c", "5000", "-s", "424242"],
    },
    App {
        name: "stringmatch",
        dir: "string_match",
        datafile: Some("string_match_datafiles/key_file_500MB.txt"),
        args: &[],
    },
    App {
        name: "wordcount",
        dir: "word_count",
        datafile: Some("word_count_datafiles/word_100MB.txt"),
        args: &[],
    },
];

fn benchmarks() -> Vec<&'static str> {
    vec![
        "phoenix.histogram",
        "phoenix.kmeans",
        "phoenix.linearregression",
        "phoenix.matrixmultiply",
        "phoenix.pca",
        "phoenix.stringmatch",
        "phoenix.wordcount",
    ]
}

fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    Ok(Box::new(Phoenix::new(req, config)?))
}

#[derive(Debug)]
pub struct Phoenix {
    descriptor: Descriptor,
    app: &'static App,
    app_dir: PathBuf,
    scratch: Option<Scratch>,
    cmdline: Vec<String>,
    env: Env,
}

impl Phoenix {
    pub fn new(req: &Request, config: &Config) -> Result<Self> {
        let app = req
            .bench
            .strip_prefix(SUITE.prefix)
            .and_then(|name| APPS.iter().find(|a| a.name == name))
            .ok_or_else(|| Error::UnsupportedBenchmark(req.bench.clone()))?;
        let root = config.require_path("PHOENIX_DIR")?;
        SUITE.check_arch(req.arch)?;

        let threads = u32::try_from(num_cpus::get()).unwrap_or(u32::MAX);
        Ok(Self {
            descriptor: Descriptor {
                name: req.bench.clone(),
                threads,
                dataset: None,
                arch: req.arch,
            },
            app,
            app_dir: root.join("phoenix-2.0").join("tests").join(app.dir),
            scratch: None,
            cmdline: Vec::new(),
            env: Env::new(),
        })
    }

    fn binary(&self) -> String {
        self.app_dir.join(self.app.dir).to_string_lossy().into_owned()
    }
}

impl Benchmark for Phoenix {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn prepare(&mut self) -> Result<()> {
        let mut cmdline = vec![self.binary()];
        if let Some(datafile) = self.app.datafile {
            let scratch = Scratch::create(&format!("phoenix.{}.", self.app.name))?;
            let copy = scratch.copy_in(&self.app_dir.join(datafile))?;
            cmdline.push(copy.to_string_lossy().into_owned());
            self.scratch = Some(scratch);
        }
        cmdline.extend(strings(self.app.args));
        self.cmdline = cmdline;
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
        Ok(Some(per_run_seconds(&self.descriptor, &self.cmdline, &stdout)))
    }

    fn cleanup(&mut self) -> Result<()> {
        match self.scratch.take() {
            Some(scratch) => scratch.release(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::benchmark::test_support::request;

    fn config(root: &Path) -> Config {
        Config::from([("PHOENIX_DIR", root.to_str().unwrap())])
    }

    #[test]
    fn test_x86_64_only() {
        let req = request("phoenix.kmeans", "none", Arch::Aarch64, 1);
        let err = Phoenix::new(&req, &config(Path::new("/opt/phoenix"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchitecture { .. }));
    }

    #[test]
    fn test_threads_follow_host() {
        let req = request("phoenix.pca", "whatever", Arch::X86_64, 1);
        let mut phoenix = Phoenix::new(&req, &config(Path::new("/opt/phoenix"))).unwrap();
        assert_eq!(phoenix.descriptor().threads as usize, num_cpus::get());
        assert_eq!(phoenix.descriptor().dataset_label(), "none");

        phoenix.prepare().unwrap();
        assert_eq!(
            phoenix.cmdline(),
            [
                "/opt/phoenix/phoenix-2.0/tests/pca/pca",
                "-r",
                "5000",
                "-c",
                "5000",
                "-s",
                "424242"
            ]
        );
        assert!(phoenix.scratch.is_none());
        phoenix.cleanup().unwrap();
    }

    #[test]
    fn test_datafile_is_copied() {
        let root = tempfile::tempdir().unwrap();
        let app_dir = root.path().join("phoenix-2.0/tests/word_count");
        std::fs::create_dir_all(app_dir.join("word_count_datafiles")).unwrap();
        std::fs::write(app_dir.join("word_count_datafiles/word_100MB.txt"), "a b a").unwrap();

        let req = request("phoenix.wordcount", "none", Arch::X86_64, 1);
        let mut phoenix = Phoenix::new(&req, &config(root.path())).unwrap();
        phoenix.prepare().unwrap();

        let cmdline = phoenix.cmdline().to_vec();
        assert_eq!(Path::new(&cmdline[0]), app_dir.join("word_count"));
        let copy = PathBuf::from(&cmdline[1]);
        assert_ne!(copy, app_dir.join("word_count_datafiles/word_100MB.txt"));
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "a b a");

        phoenix.cleanup().unwrap();
        assert!(!copy.exists());
    }

    #[test]
    fn test_missing_datafile() {
        let req = request("phoenix.histogram", "none", Arch::X86_64, 1);
        let mut phoenix = Phoenix::new(&req, &config(Path::new("/nonexistent"))).unwrap();
        assert!(matches!(phoenix.prepare(), Err(Error::Io(_))));
        assert!(phoenix.scratch.is_none());
    }
}
