//! Output protocols shared by the benchmark suites.
//!
//! After every run the pipeline appends a trailer line to the captured
//! stdout:
//!
//! ```text
//! qbench: duration: 12.5 seconds, run: 1, retval: 0
//! ```
//!
//! Parsers split stdout into runs at these trailers, so data lines of a run
//! can be paired with the exit code of the run that produced them.

use std::fmt;
use std::sync::OnceLock;

use qbench_table::ResultRecord;
use regex::Regex;

use super::Descriptor;

// ============================================================================
// Trailer
// ============================================================================

/// First whitespace field of a trailer line.
pub const TRAILER_MARKER: &str = "qbench:";

const DURATION_FIELD: usize = 2;
const RUN_FIELD: usize = 5;
const RETVAL_FIELD: usize = 7;
const TRAILER_FIELDS: usize = 8;

/// Timing and exit status of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trailer {
    /// Wall-clock seconds.
    pub duration: f64,
    /// 1-based run index.
    pub run: u32,
    /// Exit code; negated signal number if the child was killed.
    pub retval: i32,
}

impl Trailer {
    /// Parse a trailer line. Returns `None` for any other line.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != TRAILER_FIELDS || fields[0] != TRAILER_MARKER {
            return None;
        }
        Some(Self {
            duration: fields[DURATION_FIELD].parse().ok()?,
            run: fields[RUN_FIELD].trim_end_matches(',').parse().ok()?,
            retval: fields[RETVAL_FIELD].parse().ok()?,
        })
    }
}

impl fmt::Display for Trailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TRAILER_MARKER} duration: {} seconds, run: {}, retval: {}",
            self.duration, self.run, self.retval
        )
    }
}

/// Every trailer in `stdout`, in order.
pub fn trailers(stdout: &str) -> impl Iterator<Item = Trailer> + '_ {
    stdout.lines().filter_map(Trailer::parse)
}

/// One `seconds` record per trailer, for workloads that print nothing the
/// harness needs.
pub fn per_run_seconds(desc: &Descriptor, cmdline: &[String], stdout: &str) -> Vec<ResultRecord> {
    trailers(stdout)
        .map(|t| {
            desc.record(desc.name.clone(), cmdline)
                .with_measurement("seconds", t.duration, t.retval)
        })
        .collect()
}

// ============================================================================
// Runs
// ============================================================================

/// Output lines of one run together with the trailer that closed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<'a> {
    pub lines: Vec<&'a str>,
    pub trailer: Trailer,
}

/// Split stdout into runs. Lines after the last trailer belong to no run and
/// are dropped.
pub fn runs(stdout: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut lines = Vec::new();
    for line in stdout.lines() {
        match Trailer::parse(line) {
            Some(trailer) => runs.push(Run {
                lines: std::mem::take(&mut lines),
                trailer,
            }),
            None => lines.push(line),
        }
    }
    runs
}

// ============================================================================
// Workload line formats
// ============================================================================

/// Block sizes of an OpenSSL `speed -mr` header line (`+H:16:64:...`).
pub fn sweep_header(line: &str) -> Option<Vec<&str>> {
    line.strip_prefix("+H:")
        .map(|rest| rest.split(':').map(str::trim).collect())
}

/// Throughput values of an OpenSSL `speed -mr` result line
/// (`+F:<idx>:<alg>:<v1>:<v2>:...`).
pub fn sweep_values(line: &str) -> Option<Vec<&str>> {
    line.strip_prefix("+F:")
        .map(|rest| rest.split(':').skip(2).map(str::trim).collect())
}

/// A `test,value` line.
pub fn comma_point(line: &str) -> Option<(&str, f64)> {
    let mut parts = line.trim().split(',');
    let (Some(test), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    Some((test, value.trim().parse().ok()?))
}

static SQLITE_TOTAL: OnceLock<Regex> = OnceLock::new();

/// Seconds from the `TOTAL......  12.345s` summary line of speedtest1.
pub fn sqlite_total(line: &str) -> Option<f64> {
    SQLITE_TOTAL
        .get_or_init(|| Regex::new(r"^\s*TOTAL\.{3,}\s+([0-9]+(?:\.[0-9]+)?)s\s*$").unwrap())
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}
