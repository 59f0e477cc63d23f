//! One row of the results table.

use serde::{Deserialize, Serialize};

/// Column names, in on-disk order. This is a stable contract with the
/// comparison tooling.
pub const COLUMNS: [&str; 10] = [
    "bench", "dataset", "arch", "threads", "cmdline", "unit", "value", "retval", "runtime", "tag",
];

/// A single measured data point.
///
/// A benchmark parser fills everything except `runtime` and `tag`, which the
/// harness stamps on just before the rows are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub bench: String,
    pub dataset: String,
    pub arch: String,
    pub threads: u32,
    pub cmdline: String,
    pub unit: String,
    pub value: f64,
    pub retval: i32,
    pub runtime: String,
    pub tag: String,
}

impl ResultRecord {
    /// Start a record for the given workload identity.
    pub fn new(
        bench: impl Into<String>,
        dataset: impl Into<String>,
        arch: impl Into<String>,
        threads: u32,
    ) -> Self {
        Self {
            bench: bench.into(),
            dataset: dataset.into(),
            arch: arch.into(),
            threads,
            cmdline: String::new(),
            unit: String::new(),
            value: 0.0,
            retval: 0,
            runtime: String::new(),
            tag: String::new(),
        }
    }

    /// Set the command line (already joined with spaces).
    #[must_use]
    pub fn with_cmdline(mut self, cmdline: impl Into<String>) -> Self {
        self.cmdline = cmdline.into();
        self
    }

    /// Set the measured value, its unit and the child's exit code.
    #[must_use]
    pub fn with_measurement(mut self, unit: impl Into<String>, value: f64, retval: i32) -> Self {
        self.unit = unit.into();
        self.value = value;
        self.retval = retval;
        self
    }

    /// Label the record with the runtime kind and user tag of this invocation.
    pub fn stamp(&mut self, runtime: &str, tag: &str) {
        runtime.clone_into(&mut self.runtime);
        tag.clone_into(&mut self.tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_stamp() {
        let mut rec = ResultRecord::new("parsec.vips", "simsmall", "x86_64", 4)
            .with_cmdline("/opt/vips im_benchmark a b")
            .with_measurement("seconds", 1.5, 0);
        rec.stamp("qemu", "baseline");

        assert_eq!(rec.bench, "parsec.vips");
        assert_eq!(rec.threads, 4);
        assert_eq!(rec.unit, "seconds");
        assert!((rec.value - 1.5).abs() < f64::EPSILON);
        assert_eq!(rec.runtime, "qemu");
        assert_eq!(rec.tag, "baseline");
    }
}
