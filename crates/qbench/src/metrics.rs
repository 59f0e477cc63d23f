//! Harness metrics on top of the `metrics` facade.
//!
//! The library only emits; a binary decides whether anything listens. The
//! [`CliRecorder`] keeps everything in memory and renders a summary at exit.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;

use crate::benchmark::output::Trailer;

pub const RUNS_TOTAL: &str = "qbench_runs_total";
pub const NONZERO_EXITS_TOTAL: &str = "qbench_nonzero_exits_total";
pub const RECORDS_TOTAL: &str = "qbench_records_total";
pub const LAST_RETVAL: &str = "qbench_last_retval";
pub const RUN_DURATION_SECONDS: &str = "qbench_run_duration_seconds";

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(RUNS_TOTAL, Unit::Count, "Benchmark runs executed");
    describe_counter!(
        NONZERO_EXITS_TOTAL,
        Unit::Count,
        "Runs that exited with a non-zero status or a signal"
    );
    describe_counter!(RECORDS_TOTAL, Unit::Count, "Records appended to the results table");
    describe_gauge!(LAST_RETVAL, Unit::Count, "Exit status of the most recent run");
    describe_histogram!(RUN_DURATION_SECONDS, Unit::Seconds, "Wall-clock time per run");
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record one finished run.
pub fn record_run(bench: &str, trailer: &Trailer) {
    let labels = [("bench", bench.to_string())];
    counter!(RUNS_TOTAL, &labels).increment(1);
    histogram!(RUN_DURATION_SECONDS, &labels).record(trailer.duration);
    gauge!(LAST_RETVAL, &labels).set(f64::from(trailer.retval));
    if trailer.retval != 0 {
        counter!(NONZERO_EXITS_TOTAL, &labels).increment(1);
    }
}

/// Record records written to the results table.
pub fn record_written(bench: &str, count: usize) {
    let labels = [("bench", bench.to_string())];
    counter!(RECORDS_TOTAL, &labels).increment(count as u64);
}

// ============================================================================
// CLI Recorder
// ============================================================================

#[derive(Default)]
struct Storage<T> {
    values: RwLock<BTreeMap<String, T>>,
}

struct CliCounter {
    key: String,
    storage: Arc<Storage<u64>>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        *self.storage.values.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    storage: Arc<Storage<f64>>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        *self.storage.values.write().entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        *self.storage.values.write().entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Arc<Storage<Vec<f64>>>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        self.storage
            .values
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// In-memory recorder for `--metrics`.
#[derive(Default)]
pub struct CliRecorder {
    counters: Arc<Storage<u64>>,
    gauges: Arc<Storage<f64>>,
    histograms: Arc<Storage<Vec<f64>>>,
}

impl CliRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            counters: Arc::clone(&self.counters),
            gauges: Arc::clone(&self.gauges),
            histograms: Arc::clone(&self.histograms),
        }
    }

    /// Install as the global recorder. `None` if one is already installed.
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CliGauge {
            key: key_to_string(key),
            storage: Arc::clone(&self.gauges),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.histograms),
        }))
    }
}

/// Read access to what a [`CliRecorder`] collected.
pub struct CliRecorderHandle {
    counters: Arc<Storage<u64>>,
    gauges: Arc<Storage<f64>>,
    histograms: Arc<Storage<Vec<f64>>>,
}

impl CliRecorderHandle {
    pub fn counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    pub fn gauge(&self, key: &str) -> Option<f64> {
        self.gauges.values.read().get(key).copied()
    }

    pub fn histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.histograms.values.read().get(key).cloned()
    }

    /// Render all collected metrics, keys sorted.
    pub fn summary(&self) -> String {
        let counters = self.counters.values.read();
        let gauges = self.gauges.values.read();
        let histograms = self.histograms.values.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            return "No metrics collected.\n".to_string();
        }

        let mut out = String::from("\n## Metrics Summary\n\n");
        if !counters.is_empty() {
            out.push_str("### Counters\n");
            for (key, value) in counters.iter() {
                let _ = writeln!(out, "  {key}: {value}");
            }
            out.push('\n');
        }
        if !gauges.is_empty() {
            out.push_str("### Gauges\n");
            for (key, value) in gauges.iter() {
                let _ = writeln!(out, "  {key}: {value}");
            }
            out.push('\n');
        }
        if !histograms.is_empty() {
            out.push_str("### Histograms\n");
            for (key, values) in histograms.iter().filter(|(_, v)| !v.is_empty()) {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                let _ = writeln!(
                    out,
                    "  {key}: count={}, min={min:.6}, max={max:.6}, avg={avg:.6}",
                    values.len()
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }
}
