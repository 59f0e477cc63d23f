//! Execution runtimes.
//!
//! A runtime decides *how* a benchmark binary is started: directly on the
//! host, or under an emulator. It contributes a command-line prefix and an
//! environment overlay; the pipeline puts them in front of the benchmark's
//! own command line and environment.

mod native;
mod qemu;

pub use native::Native;
pub use qemu::Qemu;

use tracing::debug;

use crate::arch::Arch;
use crate::config::Config;
use crate::{Env, Error, Result};

/// Capability set shared by all runtimes.
pub trait Runtime: std::fmt::Debug {
    /// Identifier recorded in the `runtime` column.
    fn name(&self) -> &'static str;

    /// Environment variables to set for the child.
    fn env(&self) -> &Env;

    /// Arguments placed before the benchmark command line.
    fn cmdline(&self) -> &[String];
}

/// User selection relevant to runtime construction.
#[derive(Debug, Clone)]
pub struct RuntimeRequest {
    /// Runtime identifier (`native`, `qemu`, ...).
    pub id: String,
    /// Architecture of the benchmark binary.
    pub arch: Arch,
    /// Extra options for the emulator, whitespace separated.
    pub extra_opts: Option<String>,
}

type Constructor = fn(&RuntimeRequest, &Config) -> Result<Box<dyn Runtime>>;

/// Registered runtimes. `llvm` is accepted on the command line but has no
/// implementation, so it falls through to `UnsupportedRuntime`.
const RUNTIMES: &[(&str, Constructor)] = &[("native", create_native), ("qemu", create_qemu)];

fn create_native(req: &RuntimeRequest, _config: &Config) -> Result<Box<dyn Runtime>> {
    Ok(Box::new(Native::new(req.arch)?))
}

fn create_qemu(req: &RuntimeRequest, config: &Config) -> Result<Box<dyn Runtime>> {
    Ok(Box::new(Qemu::new(req, config)?))
}

/// Identifiers of all registered runtimes.
pub fn names() -> impl Iterator<Item = &'static str> {
    RUNTIMES.iter().map(|(name, _)| *name)
}

/// Create the runtime named by `req.id`.
pub fn create(req: &RuntimeRequest, config: &Config) -> Result<Box<dyn Runtime>> {
    let (_, ctor) = RUNTIMES
        .iter()
        .find(|(name, _)| *name == req.id)
        .ok_or_else(|| Error::UnsupportedRuntime(req.id.clone()))?;
    let runtime = ctor(req, config)?;
    debug!(runtime = ?runtime, "runtime created");
    Ok(runtime)
}
