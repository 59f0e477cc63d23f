//! Process execution.
//!
//! An [`Invocation`] is the fully merged command: runtime prefix followed by
//! the benchmark command line, runtime environment overlaid by the benchmark
//! environment. [`execute`] runs it a fixed number of times, sequentially,
//! with stdout and stderr of every run appended to one pair of temporary
//! files, and a [`Trailer`] line appended to stdout after each run.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::benchmark::Benchmark;
use crate::benchmark::output::Trailer;
use crate::runtime::Runtime;
use crate::{Env, Error, Result};

// ============================================================================
// Invocation
// ============================================================================

/// A command ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program followed by its arguments.
    pub cmdline: Vec<String>,
    /// Overlay applied on top of the harness's own environment.
    pub env: Env,
    /// Working directory of the child. `None` inherits the harness's.
    pub workdir: Option<PathBuf>,
    /// Number of sequential runs.
    pub runs: u32,
    /// Label for logs and metrics.
    pub label: String,
}

impl Invocation {
    /// Combine a runtime and a prepared benchmark. On a variable set by both,
    /// the benchmark's value wins.
    pub fn merge(runtime: &dyn Runtime, bench: &dyn Benchmark, runs: u32) -> Self {
        let cmdline = runtime
            .cmdline()
            .iter()
            .chain(bench.cmdline())
            .cloned()
            .collect();

        let mut env = runtime.env().clone();
        env.extend(bench.env().iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            cmdline,
            env,
            workdir: bench.workdir().map(PathBuf::from),
            runs,
            label: bench.descriptor().name.clone(),
        }
    }

    /// Command line as a single space-separated string.
    pub fn display_cmdline(&self) -> String {
        self.cmdline.join(" ")
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Accumulated stdout and stderr of all runs.
///
/// Both files are deleted when the capture is dropped.
#[derive(Debug)]
pub struct Capture {
    stdout: NamedTempFile,
    stderr: NamedTempFile,
}

impl Capture {
    fn new() -> Result<Self> {
        Ok(Self {
            stdout: NamedTempFile::new()?,
            stderr: NamedTempFile::new()?,
        })
    }

    /// Build a capture from already known output. Useful for parsers and
    /// tests that never spawn anything.
    pub fn from_text(stdout: &str, stderr: &str) -> Result<Self> {
        let mut capture = Self::new()?;
        capture.stdout.write_all(stdout.as_bytes())?;
        capture.stderr.write_all(stderr.as_bytes())?;
        Ok(capture)
    }

    /// Everything written to stdout, trailers included.
    pub fn stdout(&self) -> Result<String> {
        read_all(&self.stdout)
    }

    pub fn stderr(&self) -> Result<String> {
        read_all(&self.stderr)
    }

    /// Trailers of all runs, in order.
    pub fn trailers(&self) -> Result<Vec<Trailer>> {
        Ok(crate::benchmark::output::trailers(&self.stdout()?).collect())
    }
}

fn read_all(file: &NamedTempFile) -> Result<String> {
    // A fresh handle, so the write position of the shared one is untouched.
    let mut handle = file.reopen()?;
    handle.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    handle.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Whether the last byte written is not a newline, so a trailer appended now
/// would share a line with the child's output.
fn ends_mid_line(file: &NamedTempFile) -> Result<bool> {
    let mut handle = file.reopen()?;
    if handle.metadata()?.len() == 0 {
        return Ok(false);
    }
    handle.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    handle.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

// ============================================================================
// Execution
// ============================================================================

/// Hooks called around each run, e.g. to drive a progress display.
pub trait Observer {
    fn run_started(&mut self, _run: u32, _total: u32) {}
    fn run_finished(&mut self, _trailer: &Trailer) {}
}

/// Observer that ignores everything.
impl Observer for () {}

/// Exit code of a finished child. A child killed by a signal is recorded as
/// the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// Run `inv` without observing progress.
pub fn execute(inv: &Invocation) -> Result<Capture> {
    execute_with(inv, &mut ())
}

/// Run `inv.runs` times in sequence.
///
/// Non-zero exits are recorded in the trailer and never stop the remaining
/// runs. Failing to start the program is an error.
pub fn execute_with(inv: &Invocation, observer: &mut dyn Observer) -> Result<Capture> {
    let Some((program, args)) = inv.cmdline.split_first() else {
        return Err(Error::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        });
    };

    let mut capture = Capture::new()?;
    info!(cmdline = %inv.display_cmdline(), runs = inv.runs, "executing");
    debug!(env = ?inv.env, workdir = ?inv.workdir, "invocation");

    for run in 1..=inv.runs {
        observer.run_started(run, inv.runs);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(&inv.env)
            .stdin(Stdio::null())
            .stdout(capture.stdout.as_file().try_clone()?)
            .stderr(capture.stderr.as_file().try_clone()?);
        if let Some(dir) = &inv.workdir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let status = cmd.status().map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;
        let trailer = Trailer {
            duration: start.elapsed().as_secs_f64(),
            run,
            retval: exit_code(status),
        };

        // The child shared our file offset, so this lands after its output.
        if ends_mid_line(&capture.stdout)? {
            writeln!(capture.stdout)?;
        }
        writeln!(capture.stdout, "{trailer}")?;
        capture.stdout.flush()?;

        debug!(run, duration = trailer.duration, retval = trailer.retval, "run finished");
        crate::metrics::record_run(&inv.label, &trailer);
        observer.run_finished(&trailer);
    }

    Ok(capture)
}
