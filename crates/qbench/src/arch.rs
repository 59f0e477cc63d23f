//! Target instruction-set architectures.

use std::fmt;
use std::str::FromStr;

/// ISA a benchmark binary is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Parse from string (e.g., "aarch64").
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x86_64" => Some(Self::X86_64),
            "aarch64" => Some(Self::Aarch64),
            _ => None,
        }
    }

    /// Get string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }

    /// Architecture of the machine running the harness, if it is one we know.
    pub fn host() -> Option<Self> {
        Self::parse(std::env::consts::ARCH)
    }

    /// Render a list of architectures for error messages.
    pub fn join(archs: &[Self]) -> String {
        archs
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown arch '{s}', expected x86_64/aarch64"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_parse() {
        assert_eq!(Arch::parse("x86_64"), Some(Arch::X86_64));
        assert_eq!(Arch::parse("aarch64"), Some(Arch::Aarch64));
        assert_eq!(Arch::parse("riscv64"), None);
        assert!("arm".parse::<Arch>().is_err());
    }

    #[test]
    fn test_host_matches_target() {
        match std::env::consts::ARCH {
            "x86_64" => assert_eq!(Arch::host(), Some(Arch::X86_64)),
            "aarch64" => assert_eq!(Arch::host(), Some(Arch::Aarch64)),
            _ => assert_eq!(Arch::host(), None),
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(Arch::join(&[Arch::X86_64, Arch::Aarch64]), "x86_64, aarch64");
    }
}
