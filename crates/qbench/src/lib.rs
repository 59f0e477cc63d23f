//! Benchmark orchestration harness.
//!
//! Runs a benchmark workload (PARSEC, Phoenix, OpenSSL speed, SQLite
//! speedtest1, micro benchmarks) either natively or under QEMU user-mode
//! emulation, turns its output into [`ResultRecord`]s and appends them to a
//! results table shared across invocations.
//!
//! ```ignore
//! use qbench::harness::{RunOptions, run};
//!
//! let outcome = run(&RunOptions { bench: "parsec.blackscholes".into(), ..opts })?;
//! println!("{} records in {}", outcome.written.unwrap_or(0), outcome.output.display());
//! ```
//!
//! The pieces are usable on their own: [`runtime`] and [`benchmark`] build
//! command lines, [`pipeline`] runs them, [`compare`] normalizes a results
//! table against a baseline.

pub mod arch;
pub mod benchmark;
pub mod compare;
pub mod config;
mod error;
pub mod harness;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod runtime;

pub use arch::Arch;
pub use config::Config;
pub use error::{Error, Result};
pub use qbench_table::{ResultRecord, TableFormat};

/// Environment variable overlay, applied on top of the harness's own
/// environment. Sorted, so logs and tests see a stable order.
pub type Env = std::collections::BTreeMap<String, String>;

/// Default log directive for a `-v` count, shared by both binaries.
pub const fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(log_level(0), "error");
        assert_eq!(log_level(1), "warn");
        assert_eq!(log_level(2), "info");
        assert_eq!(log_level(7), "debug");
    }
}
