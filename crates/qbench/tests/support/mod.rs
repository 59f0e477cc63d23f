//! Shared fixtures: throwaway workloads and configuration files.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use qbench::Arch;
use qbench::harness::RunOptions;

/// Write an executable shell script named `name` into `dir`.
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    }
    path
}

/// Write a `KEY=VALUE` configuration file into `dir`.
pub fn config(dir: &Path, entries: &[(&str, &Path)]) -> PathBuf {
    let mut text = String::from("# generated for tests\n");
    for (key, value) in entries {
        text.push_str(&format!("{key}={}\n", value.display()));
    }
    let path = dir.join("config");
    fs::write(&path, text).expect("write config");
    path
}

/// Options for a micro benchmark run on the host; `None` on hosts the
/// harness has no architecture for.
pub fn micro_options(
    config_file: PathBuf,
    output: PathBuf,
    runs: u32,
    tag: &str,
) -> Option<RunOptions> {
    Some(RunOptions {
        bench: "micro.math".to_string(),
        dataset: "none".to_string(),
        runtime: "native".to_string(),
        output,
        arch: Arch::host()?,
        threads: 1,
        runs,
        tag: tag.to_string(),
        config_file,
        runtime_opts: None,
    })
}
