//! PARSEC 3.0 applications and kernels.
//!
//! Binaries come from a built PARSEC tree:
//!
//! ```text
//! <PARSEC_DIR>/pkgs/<apps|kernels>/<app>/inst/<platform>/bin/<app>
//! <PARSEC_DIR>/pkgs/<apps|kernels>/<app>/inputs/input_<dataset>.tar
//! ```
//!
//! Each run gets a fresh scratch directory; the input archive of the
//! selected dataset is unpacked there and the command line points into it.

use std::path::{Path, PathBuf};

use qbench_table::ResultRecord;

use super::output::per_run_seconds;
use super::{Benchmark, Descriptor, Request, Scratch, Suite, strings};
use crate::arch::Arch;
use crate::config::Config;
use crate::pipeline::Capture;
use crate::{Env, Error, Result};

pub const SUITE: Suite = Suite {
    prefix: "parsec.",
    name: "PARSEC",
    datasets: &DATASETS,
    archs: &[Arch::X86_64, Arch::Aarch64],
    benchmarks,
    create,
};

/// Input classes, smallest first. Per-app tables below are indexed by
/// position in this list.
const DATASETS: [&str; 6] = ["test", "simdev", "simsmall", "simmedium", "simlarge", "native"];

const fn platform(arch: Arch) -> &'static str {
    match arch {
        Arch::X86_64 => "amd64-linux.gcc",
        Arch::Aarch64 => "aarch64-linux.gcc",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Apps,
    Kernels,
}

impl Group {
    const fn dir(self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Kernels => "kernels",
        }
    }
}

/// Values the argument templates are filled from.
struct Layout<'a> {
    binary: String,
    scratch: &'a Scratch,
    dataset: usize,
    threads: u32,
}

impl Layout<'_> {
    fn input(&self, name: &str) -> String {
        self.scratch.arg(name)
    }

    fn pick<T: Copy>(&self, table: &[T; 6]) -> T {
        table[self.dataset]
    }

    fn threads(&self) -> String {
        self.threads.to_string()
    }
}

struct App {
    name: &'static str,
    group: Group,
    /// Ships an `input_<dataset>.tar` archive.
    packaged_input: bool,
    /// Must be started from inside its scratch directory.
    runs_in_scratch: bool,
    args: fn(&Layout<'_>) -> Vec<String>,
}

const APPS: &[App] = &[
    App {
        name: "blackscholes",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: blackscholes,
    },
    App {
        name: "bodytrack",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: bodytrack,
    },
    App {
        name: "canneal",
        group: Group::Kernels,
        packaged_input: true,
        runs_in_scratch: false,
        args: canneal,
    },
    App {
        name: "dedup",
        group: Group::Kernels,
        packaged_input: true,
        runs_in_scratch: false,
        args: dedup,
    },
    App {
        name: "facesim",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: true,
        args: facesim,
    },
    App {
        name: "ferret",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: ferret,
    },
    App {
        name: "fluidanimate",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: fluidanimate,
    },
    App {
        name: "freqmine",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: freqmine,
    },
    App {
        name: "streamcluster",
        group: Group::Kernels,
        packaged_input: false,
        runs_in_scratch: false,
        args: streamcluster,
    },
    App {
        name: "swaptions",
        group: Group::Apps,
        packaged_input: false,
        runs_in_scratch: false,
        args: swaptions,
    },
    App {
        name: "vips",
        group: Group::Apps,
        packaged_input: true,
        runs_in_scratch: false,
        args: vips,
    },
];

// ============================================================================
// Argument templates
// ============================================================================

fn blackscholes(l: &Layout<'_>) -> Vec<String> {
    let input = l.pick(&[
        "in_4.txt",
        "in_16.txt",
        "in_4K.txt",
        "in_16K.txt",
        "in_64K.txt",
        "in_10M.txt",
    ]);
    vec![l.binary.clone(), l.threads(), l.input(input), l.input("prices.txt")]
}

fn bodytrack(l: &Layout<'_>) -> Vec<String> {
    let sequence = l.pick(&[
        "sequenceB_1",
        "sequenceB_1",
        "sequenceB_1",
        "sequenceB_2",
        "sequenceB_4",
        "sequenceB_261",
    ]);
    let params = l.pick(&[
        ["4", "1", "5", "1", "0"],
        ["4", "1", "100", "3", "0"],
        ["4", "1", "1000", "5", "0"],
        ["4", "2", "2000", "5", "0"],
        ["4", "4", "4000", "5", "0"],
        ["4", "261", "4000", "5", "0"],
    ]);
    let mut args = vec![l.binary.clone(), l.input(sequence)];
    args.extend(strings(&params));
    args.push(l.threads());
    args
}

fn canneal(l: &Layout<'_>) -> Vec<String> {
    let swaps = l.pick(&[
        ["5", "100"],
        ["100", "300"],
        ["10000", "2000"],
        ["15000", "2000"],
        ["15000", "2000"],
        ["15000", "2000"],
    ]);
    let netlist = l.pick(&[
        "10.nets",
        "100.nets",
        "100000.nets",
        "200000.nets",
        "400000.nets",
        "2500000.nets",
    ]);
    let steps = l.pick(&["1", "2", "32", "64", "128", "6000"]);
    let mut args = vec![l.binary.clone(), l.threads()];
    args.extend(strings(&swaps));
    args.push(l.input(netlist));
    args.push(steps.to_string());
    args
}

fn dedup(l: &Layout<'_>) -> Vec<String> {
    let input = l.pick(&[
        "test.dat",
        "hamlet.dat",
        "media.dat",
        "media.dat",
        "media.dat",
        "FC-6-x86_64-disc1.iso",
    ]);
    let mut args = vec![l.binary.clone()];
    args.extend(strings(&["-c", "-p", "-v", "-t"]));
    args.push(l.threads());
    args.push("-i".to_string());
    args.push(l.input(input));
    args.push("-o".to_string());
    args.push(l.input("output.dat.ddp"));
    args
}

fn facesim(l: &Layout<'_>) -> Vec<String> {
    let mut args = vec![l.binary.clone()];
    match DATASETS[l.dataset] {
        "test" => args.push("-h".to_string()),
        dataset => {
            args.extend(strings(&["-timing", "-threads"]));
            args.push(l.threads());
            if dataset == "native" {
                args.extend(strings(&["-lastframe", "100"]));
            }
        }
    }
    args
}

fn ferret(l: &Layout<'_>) -> Vec<String> {
    let params = l.pick(&[
        ["5", "5"],
        ["5", "5"],
        ["10", "20"],
        ["10", "20"],
        ["10", "20"],
        ["50", "20"],
    ]);
    let mut args = vec![
        l.binary.clone(),
        l.input("corel"),
        "lsh".to_string(),
        l.input("queries"),
    ];
    args.extend(strings(&params));
    args.push(l.threads());
    args.push(l.input("output.txt"));
    args
}

fn fluidanimate(l: &Layout<'_>) -> Vec<String> {
    let frames = l.pick(&["1", "3", "5", "5", "5", "500"]);
    let input = l.pick(&[
        "in_5K.fluid",
        "in_15K.fluid",
        "in_35K.fluid",
        "in_100K.fluid",
        "in_300K.fluid",
        "in_500K.fluid",
    ]);
    vec![
        l.binary.clone(),
        l.threads(),
        frames.to_string(),
        l.input(input),
        l.input("out.fluid"),
    ]
}

fn freqmine(l: &Layout<'_>) -> Vec<String> {
    let input = l.pick(&[
        "T10I4D100K_3.dat",
        "T10I4D100K_1k.dat",
        "kosarak_250k.dat",
        "kosarak_500k.dat",
        "kosarak_990k.dat",
        "webdocs_250k.dat",
    ]);
    let support = l.pick(&["1", "3", "220", "410", "790", "11000"]);
    vec![l.binary.clone(), l.input(input), support.to_string()]
}

fn streamcluster(l: &Layout<'_>) -> Vec<String> {
    let params = l.pick(&[
        ["2", "5", "1", "10", "10", "5", "none"],
        ["3", "10", "3", "16", "16", "10", "none"],
        ["10", "20", "32", "4096", "4096", "1000", "none"],
        ["10", "20", "64", "8192", "8192", "1000", "none"],
        ["10", "20", "128", "16384", "16384", "1000", "none"],
        ["10", "20", "128", "1000000", "200000", "5000", "none"],
    ]);
    let mut args = vec![l.binary.clone()];
    args.extend(strings(&params));
    args.push(l.input("output.txt"));
    args.push(l.threads());
    args
}

fn swaptions(l: &Layout<'_>) -> Vec<String> {
    let (swaptions, simulations) = l.pick(&[
        (128, "1000000"),
        (3, "50"),
        (16, "10000"),
        (32, "20000"),
        (64, "40000"),
        (128, "1000000"),
    ]);
    // More workers than swaptions makes swaptions abort.
    let workers = l.threads.min(swaptions);
    vec![
        l.binary.clone(),
        "-ns".to_string(),
        swaptions.to_string(),
        "-sm".to_string(),
        simulations.to_string(),
        "-nt".to_string(),
        workers.to_string(),
    ]
}

fn vips(l: &Layout<'_>) -> Vec<String> {
    let input = l.pick(&[
        "barbados_256x288.v",
        "barbados_256x288.v",
        "pomegranate_1600x1200.v",
        "vulture_2336x2336.v",
        "bigben_2662x5500.v",
        "orion_18000x18000.v",
    ]);
    vec![
        l.binary.clone(),
        "im_benchmark".to_string(),
        l.input(input),
        l.input("output.v"),
    ]
}

// ============================================================================
// Benchmark
// ============================================================================

/// One PARSEC program with a selected input class.
#[derive(Debug)]
pub struct Parsec {
    descriptor: Descriptor,
    app: &'static App,
    dataset: usize,
    binary: PathBuf,
    archive: PathBuf,
    scratch: Option<Scratch>,
    cmdline: Vec<String>,
    env: Env,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

fn benchmarks() -> Vec<&'static str> {
    vec![
        "parsec.blackscholes",
        "parsec.bodytrack",
        "parsec.canneal",
        "parsec.dedup",
        "parsec.facesim",
        "parsec.ferret",
        "parsec.fluidanimate",
        "parsec.freqmine",
        "parsec.streamcluster",
        "parsec.swaptions",
        "parsec.vips",
    ]
}

fn create(req: &Request, config: &Config) -> Result<Box<dyn Benchmark>> {
    Ok(Box::new(Parsec::new(req, config)?))
}

impl Parsec {
    pub fn new(req: &Request, config: &Config) -> Result<Self> {
        let app = req
            .bench
            .strip_prefix(SUITE.prefix)
            .and_then(|name| APPS.iter().find(|a| a.name == name))
            .ok_or_else(|| Error::UnsupportedBenchmark(req.bench.clone()))?;
        let root = config.require_path("PARSEC_DIR")?;

        SUITE.check_dataset(&req.dataset)?;
        SUITE.check_arch(req.arch)?;
        let dataset = DATASETS
            .iter()
            .position(|d| *d == req.dataset)
            .unwrap_or_default();

        let pkg = root.join("pkgs").join(app.group.dir()).join(app.name);
        let binary = pkg
            .join("inst")
            .join(platform(req.arch))
            .join("bin")
            .join(app.name);
        let archive = pkg.join("inputs").join(format!("input_{}.tar", req.dataset));

        Ok(Self {
            descriptor: Descriptor {
                name: req.bench.clone(),
                threads: req.threads,
                dataset: Some(req.dataset.clone()),
                arch: req.arch,
            },
            app,
            dataset,
            binary,
            archive,
            scratch: None,
            cmdline: Vec::new(),
            env: Env::new(),
        })
    }

    fn stage_inputs(&self) -> Result<Scratch> {
        let scratch = Scratch::create(&format!("parsec.{}.", self.app.name))?;
        if self.app.packaged_input {
            scratch.extract(&self.archive)?;
        }
        Ok(scratch)
    }
}

impl Benchmark for Parsec {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn prepare(&mut self) -> Result<()> {
        // On failure the scratch directory is dropped, and removed, here.
        let scratch = self.stage_inputs()?;
        let layout = Layout {
            binary: self.binary.to_string_lossy().into_owned(),
            scratch: &scratch,
            dataset: self.dataset,
            threads: self.descriptor.threads,
        };
        self.cmdline = (self.app.args)(&layout);
        self.scratch = Some(scratch);
        Ok(())
    }

    fn cmdline(&self) -> &[String] {
        &self.cmdline
    }

    fn env(&self) -> &Env {
        &self.env
    }

    fn workdir(&self) -> Option<&Path> {
        if self.app.runs_in_scratch {
            self.scratch.as_ref().map(Scratch::path)
        } else {
            None
        }
    }

    fn format_output(&self, capture: &Capture) -> Result<Option<Vec<ResultRecord>>> {
        let stdout = capture.stdout()?;
        Ok(Some(per_run_seconds(&self.descriptor, &self.cmdline, &stdout)))
    }

    fn cleanup(&mut self) -> Result<()> {
        match self.scratch.take() {
            Some(scratch) => scratch.release(),
            None => Ok(()),
        }
    }
}
