//! End-to-end invocations of the harness with a scripted micro benchmark.

#![cfg(unix)]

mod support;

use qbench::harness::{self, RunOptions};
use qbench::{Error, TableFormat};

/// Prints two data points and a line the parser must skip.
const MATH: &str = "echo 'sqrt,1200.5'\necho 'sin,800'\necho 'not a point'";

fn setup(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let bin = support::script(dir.path(), "math", body);
    let config = support::config(dir.path(), &[("MATH_BIN", bin.as_path())]);
    (dir, config)
}

fn options(
    dir: &tempfile::TempDir,
    config: std::path::PathBuf,
    file: &str,
    runs: u32,
    tag: &str,
) -> Option<RunOptions> {
    support::micro_options(config, dir.path().join(file), runs, tag)
}

#[test]
fn test_csv_results_are_appended() {
    let (dir, config) = setup(MATH);
    let Some(first) = options(&dir, config.clone(), "results.csv", 2, "first") else {
        return;
    };

    let outcome = harness::run(&first).unwrap();
    assert!(outcome.output.is_absolute());
    assert_eq!(outcome.written, Some(4));
    assert_eq!(outcome.trailers.len(), 2);
    assert!(outcome.trailers.iter().all(|t| t.retval == 0));

    let second = RunOptions {
        runs: 1,
        tag: "second".to_string(),
        ..first
    };
    assert_eq!(harness::run(&second).unwrap().written, Some(2));

    let rows = qbench_table::read_table(&outcome.output).unwrap();
    let tags: Vec<&str> = rows.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, ["first", "first", "first", "first", "second", "second"]);

    let sqrt = &rows[0];
    assert_eq!(sqrt.bench, "micro.math-sqrt");
    assert_eq!(sqrt.dataset, "none");
    assert_eq!(sqrt.threads, 1);
    assert_eq!(sqrt.unit, "ops/ms");
    assert!((sqrt.value - 1200.5).abs() < f64::EPSILON);
    assert_eq!(sqrt.runtime, "native");
    assert_eq!(rows[1].bench, "micro.math-sin");
}

#[test]
fn test_binary_table_round_trips_through_harness() {
    let (dir, config) = setup(MATH);
    let Some(opts) = options(&dir, config, "results.bin", 1, "bin") else {
        return;
    };
    assert_eq!(TableFormat::from_path(&opts.output), TableFormat::Binary);

    harness::run(&opts).unwrap();
    harness::run(&opts).unwrap();
    let rows = qbench_table::read_table(&opts.output).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.tag == "bin" && r.runtime == "native"));
}

#[test]
fn test_non_zero_exit_is_recorded_not_fatal() {
    let (dir, config) = setup("echo 'sqrt,10'\nexit 7");
    let Some(opts) = options(&dir, config, "results.csv", 3, "fail") else {
        return;
    };

    let outcome = harness::run(&opts).unwrap();
    assert_eq!(outcome.written, Some(3));
    assert!(outcome.trailers.iter().all(|t| t.retval == 7));
    let rows = qbench_table::read_table(&opts.output).unwrap();
    assert!(rows.iter().all(|r| r.retval == 7));
}

#[test]
fn test_no_usable_output_writes_nothing() {
    let (dir, config) = setup("echo 'nothing to see'");
    let Some(opts) = options(&dir, config, "results.csv", 1, "none") else {
        return;
    };

    let outcome = harness::run(&opts).unwrap();
    assert_eq!(outcome.written, None);
    assert_eq!(outcome.trailers.len(), 1);
    assert!(!opts.output.exists());
}

#[test]
fn test_unknown_benchmark_and_runtime() {
    let (dir, config) = setup(MATH);
    let Some(opts) = options(&dir, config, "results.csv", 1, "x") else {
        return;
    };

    let bad_bench = RunOptions {
        bench: "micro.nope".to_string(),
        ..opts.clone()
    };
    assert!(matches!(
        harness::run(&bad_bench),
        Err(Error::UnsupportedBenchmark(name)) if name == "micro.nope"
    ));

    let llvm = RunOptions {
        runtime: "llvm".to_string(),
        ..opts.clone()
    };
    assert!(matches!(harness::run(&llvm), Err(Error::UnsupportedRuntime(id)) if id == "llvm"));
    assert!(!opts.output.exists());
}

#[test]
fn test_missing_binary_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let other = dir.path().join("unused");
    let config = support::config(dir.path(), &[("PARSEC_DIR", other.as_path())]);
    let Some(opts) = options(&dir, config, "results.csv", 1, "x") else {
        return;
    };
    assert!(matches!(
        harness::run(&opts),
        Err(Error::MissingConfigKey(key)) if key == "MATH_BIN"
    ));
}

#[test]
fn test_parsec_dataset_is_validated_before_anything_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = support::config(dir.path(), &[("PARSEC_DIR", dir.path())]);
    let Some(micro) = options(&dir, config, "results.csv", 1, "x") else {
        return;
    };
    let opts = RunOptions {
        bench: "parsec.blackscholes".to_string(),
        dataset: "enormous".to_string(),
        ..micro
    };
    assert!(matches!(
        harness::run(&opts),
        Err(Error::UnsupportedDataset { dataset, .. }) if dataset == "enormous"
    ));
}
