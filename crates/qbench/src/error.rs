use std::path::PathBuf;

use thiserror::Error;

/// Harness errors.
///
/// Every variant is fatal for the invocation: `main` logs it and exits with
/// status 1. A benchmark exiting non-zero is not an error, its exit code is
/// recorded in the results instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration file is not correctly formed at {}:{line}", path.display())]
    ConfigFormat { path: PathBuf, line: usize },
    #[error("missing configuration key '{0}'")]
    MissingConfigKey(String),
    #[error("architecture '{arch}' not supported by {target}, expected one of: {supported}")]
    UnsupportedArchitecture {
        target: String,
        arch: String,
        supported: String,
    },
    #[error("dataset '{dataset}' not supported by {suite}, expected one of: {supported}")]
    UnsupportedDataset {
        suite: &'static str,
        dataset: String,
        supported: String,
    },
    #[error("runtime '{0}' is not supported")]
    UnsupportedRuntime(String),
    #[error("benchmark '{0}' is not supported")]
    UnsupportedBenchmark(String),
    #[error("inconsistent output: {0}")]
    InconsistentOutput(String),
    #[error("failed to extract {}: {reason}", archive.display())]
    Extract { archive: PathBuf, reason: String },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("invalid baseline '{0}', expecting arch,runtime,tag")]
    BaselineFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("results table error: {0}")]
    Table(#[from] qbench_table::TableError),
}

pub type Result<T> = std::result::Result<T, Error>;
