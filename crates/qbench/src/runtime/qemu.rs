use super::{Runtime, RuntimeRequest};
use crate::config::Config;
use crate::{Env, Result};

/// Configuration keys forwarded to the emulator environment when present.
const FORWARDED_KEYS: [&str; 2] = ["QEMU_LD_PREFIX", "QEMU_STLD_DIR"];

/// User-mode emulation with `qemu-<arch>`.
#[derive(Debug)]
pub struct Qemu {
    env: Env,
    cmdline: Vec<String>,
}

impl Qemu {
    /// Requires `QEMU_PATH`, the directory holding the `qemu-<arch>` binaries.
    pub fn new(req: &RuntimeRequest, config: &Config) -> Result<Self> {
        let path = config.require_path("QEMU_PATH")?;

        let env = FORWARDED_KEYS
            .iter()
            .filter_map(|&key| config.get(key).map(|v| (key.to_string(), v.to_string())))
            .collect();

        let emulator = path.join(format!("qemu-{}", req.arch));
        let mut cmdline = vec![emulator.to_string_lossy().into_owned()];
        // Options are split on whitespace; quoting is not supported.
        if let Some(opts) = &req.extra_opts {
            cmdline.extend(opts.split_whitespace().map(String::from));
        }

        Ok(Self { env, cmdline })
    }
}

impl Runtime for Qemu {
    fn name(&self) -> &'static str {
        "qemu"
    }

    fn env(&self) -> &Env {
        &self.env
    }

    fn cmdline(&self) -> &[String] {
        &self.cmdline
    }
}
