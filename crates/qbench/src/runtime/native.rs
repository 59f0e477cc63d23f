use super::Runtime;
use crate::arch::Arch;
use crate::{Env, Error, Result};

/// Direct execution on the host.
#[derive(Debug, Default)]
pub struct Native {
    env: Env,
    cmdline: Vec<String>,
}

impl Native {
    /// Binaries for a foreign ISA cannot run without an emulator, so `arch`
    /// must match the host.
    pub fn new(arch: Arch) -> Result<Self> {
        match Arch::host() {
            Some(host) if host == arch => Ok(Self::default()),
            host => Err(Error::UnsupportedArchitecture {
                target: "the native runtime".to_string(),
                arch: arch.to_string(),
                supported: host.map_or_else(
                    || std::env::consts::ARCH.to_string(),
                    |h| h.to_string(),
                ),
            }),
        }
    }
}

impl Runtime for Native {
    fn name(&self) -> &'static str {
        "native"
    }

    fn env(&self) -> &Env {
        &self.env
    }

    fn cmdline(&self) -> &[String] {
        &self.cmdline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_arch() {
        let Some(host) = Arch::host() else {
            return;
        };
        let foreign = if host == Arch::X86_64 {
            Arch::Aarch64
        } else {
            Arch::X86_64
        };
        let err = Native::new(foreign).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchitecture { .. }));
        assert!(Native::new(host).is_ok());
    }
}
