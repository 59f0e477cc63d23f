//! Normalize results against a baseline configuration.
//!
//! For every bench measured under the baseline `(arch, runtime, tag)` the
//! mean baseline value is computed; every row of that bench, baseline rows
//! included, is then divided by it. Rows are grouped under the label
//! `<runtime>-<tag>` and averaged per bench.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use qbench_table::ResultRecord;
use tracing::{debug, warn};

use crate::report::{Alignment, Table};
use crate::{Error, Result};

/// The configuration other results are compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub arch: String,
    pub runtime: String,
    pub tag: String,
}

impl Baseline {
    /// Parse `arch,runtime,tag`.
    pub fn parse(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').collect();
        let [arch, runtime, tag] = fields.as_slice() else {
            return Err(Error::BaselineFormat(s.to_string()));
        };
        Ok(Self {
            arch: (*arch).to_string(),
            runtime: (*runtime).to_string(),
            tag: (*tag).to_string(),
        })
    }

    fn matches(&self, row: &ResultRecord) -> bool {
        row.arch == self.arch && row.runtime == self.runtime && row.tag == self.tag
    }
}

impl FromStr for Baseline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.arch, self.runtime, self.tag)
    }
}

/// Mean baseline value per bench.
pub fn baseline_means(rows: &[ResultRecord], baseline: &Baseline) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|r| baseline.matches(r)) {
        let entry = sums.entry(row.bench.as_str()).or_default();
        entry.0 += row.value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(bench, (sum, n))| (bench.to_string(), sum / n as f64))
        .collect()
}

/// One row divided by its bench's baseline mean.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub bench: String,
    pub label: String,
    pub norm: f64,
}

/// Normalize every row whose bench has a baseline. Other rows are dropped,
/// as are benches whose baseline mean is zero.
pub fn normalize(rows: &[ResultRecord], means: &BTreeMap<String, f64>) -> Vec<Normalized> {
    rows.iter()
        .filter_map(|row| {
            let Some(&mean) = means.get(&row.bench) else {
                debug!(bench = %row.bench, "no baseline, dropped");
                return None;
            };
            if mean == 0.0 {
                warn!(bench = %row.bench, "baseline mean is zero, dropped");
                return None;
            }
            Some(Normalized {
                bench: row.bench.clone(),
                label: format!("{}-{}", row.runtime, row.tag),
                norm: row.value / mean,
            })
        })
        .collect()
}

/// Mean normalized value of one (bench, label) group.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub bench: String,
    pub label: String,
    pub runs: usize,
    pub mean: f64,
}

/// Average normalized values per (bench, label), sorted by bench then label.
pub fn aggregate(values: &[Normalized]) -> Vec<Summary> {
    let mut groups: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for v in values {
        let entry = groups.entry((v.bench.as_str(), v.label.as_str())).or_default();
        entry.0 += v.norm;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((bench, label), (sum, runs))| Summary {
            bench: bench.to_string(),
            label: label.to_string(),
            runs,
            mean: sum / runs as f64,
        })
        .collect()
}

/// Render summaries as a markdown table.
pub fn render(summaries: &[Summary]) -> String {
    let mut table = Table::new(&["bench", "label", "runs", "normalized"]).with_alignments(&[
        Alignment::Left,
        Alignment::Left,
        Alignment::Right,
        Alignment::Right,
    ]);
    for s in summaries {
        table.add_row(vec![
            s.bench.clone(),
            s.label.clone(),
            s.runs.to_string(),
            format!("{:.3}", s.mean),
        ]);
    }
    table.render()
}

/// Full comparison of `rows` against `baseline`, rendered.
pub fn compare(rows: &[ResultRecord], baseline: &Baseline) -> String {
    let means = baseline_means(rows, baseline);
    if means.is_empty() {
        warn!(%baseline, "no rows match the baseline");
    }
    let normalized = normalize(rows, &means);
    debug!(baselines = means.len(), rows = normalized.len(), "normalized");
    render(&aggregate(&normalized))
}
