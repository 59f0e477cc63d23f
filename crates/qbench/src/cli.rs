//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use qbench::Arch;
use qbench::harness::RunOptions;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "qbench")]
#[command(about = "Benchmark facility - runs a workload natively or under emulation and records results")]
#[command(version)]
pub struct Cli {
    /// Benchmark to run (see --list)
    #[arg(short, long, required_unless_present = "list")]
    pub bench: Option<String>,

    /// Dataset to use, benchmark specific. Use 'help' to see a list for the
    /// requested benchmark
    #[arg(short, long, required_unless_present = "list")]
    pub dataset: Option<String>,

    /// Type of runtime
    #[arg(short, long, value_enum, required_unless_present = "list")]
    pub runtime: Option<RuntimeArg>,

    /// Results table (.csv for text, anything else for the binary format).
    /// Existing results are kept and new ones appended
    #[arg(short, long, required_unless_present = "list")]
    pub output: Option<PathBuf>,

    /// ISA to use when selecting the binary
    #[arg(short, long, value_enum, default_value = "x86_64")]
    pub arch: ArchArg,

    /// Number of threads
    #[arg(short, long = "num-threads", required_unless_present = "list")]
    pub num_threads: Option<u32>,

    /// Number of runs to perform
    #[arg(short = 'i', long = "num-runs", default_value_t = 1)]
    pub num_runs: u32,

    /// Tag used for results
    #[arg(short, long, default_value = "none")]
    pub tag: String,

    /// Path to the configuration file
    #[arg(short, long = "config-file", default_value = "./config")]
    pub config_file: PathBuf,

    /// Extra options passed to the emulator, whitespace separated
    #[arg(short = 'x', long = "runtime-opts", allow_hyphen_values = true)]
    pub runtime_opts: Option<String>,

    /// Set the verbosity level (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// List registered benchmarks and exit
    #[arg(long)]
    pub list: bool,

    /// Show metrics summary after execution
    #[arg(long)]
    pub metrics: bool,
}

impl Cli {
    /// Harness options. `None` when a required argument is missing, which
    /// clap only allows together with `--list`.
    pub fn run_options(&self) -> Option<RunOptions> {
        Some(RunOptions {
            bench: self.bench.clone()?,
            dataset: self.dataset.clone()?,
            runtime: self.runtime?.as_str().to_string(),
            output: self.output.clone()?,
            arch: self.arch.into(),
            threads: self.num_threads?,
            runs: self.num_runs,
            tag: self.tag.clone(),
            config_file: self.config_file.clone(),
            runtime_opts: self.runtime_opts.clone(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RuntimeArg {
    /// Run directly on the host
    Native,
    /// Run under QEMU user-mode emulation
    Qemu,
    /// Accepted for compatibility; no runtime is registered for it
    Llvm,
}

impl RuntimeArg {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Qemu => "qemu",
            Self::Llvm => "llvm",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum ArchArg {
    #[default]
    #[value(name = "x86_64")]
    X86_64,
    #[value(name = "aarch64")]
    Aarch64,
}

impl From<ArchArg> for Arch {
    fn from(arg: ArchArg) -> Self {
        match arg {
            ArchArg::X86_64 => Self::X86_64,
            ArchArg::Aarch64 => Self::Aarch64,
        }
    }
}
