//! Harness configuration file.
//!
//! A flat `KEY=VALUE` file locating the benchmark suites and the emulator:
//!
//! ```text
//! # suites
//! PARSEC_DIR=/opt/parsec-3.0
//! QEMU_PATH=/opt/qemu/build
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. There is no escaping
//! and no typing; every value is a string.

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::{Error, Result};

/// Loaded configuration, immutable after [`Config::load`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    store: FxHashMap<String, String>,
}

impl Config {
    /// Load the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// Parse configuration text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let mut store = FxHashMap::default();
        for (index, line) in text.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(Error::ConfigFormat {
                    path: origin.to_path_buf(),
                    line: index + 1,
                });
            };
            store.insert(key.to_string(), value.trim_end().to_string());
        }
        Ok(Self { store })
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.store.get(key).map(String::as_str)
    }

    /// Look up a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::MissingConfigKey(key.to_string()))
    }

    /// Look up a key naming a file or directory. Relative values are
    /// resolved against the current directory, so the result stays valid
    /// when a child is started elsewhere.
    pub fn require_path(&self, key: &str) -> Result<PathBuf> {
        Ok(std::path::absolute(self.require(key)?)?)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.store.keys().collect();
        keys.sort();
        f.write_str("{")?;
        for (i, key) in keys.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={}", self.store[key])?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
impl<const N: usize> From<[(&str, &str); N]> for Config {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self {
            store: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        Config::parse(text, Path::new("test-config"))
    }

    #[test]
    fn test_parse_pairs_and_skips() {
        let text = "# suites\nPARSEC_DIR=/opt/parsec\n\n   \nQEMU_PATH=/opt/qemu  \t\n#QEMU_LD_PREFIX=/x\n";
        let config = parse(text).unwrap();
        assert_eq!(config.to_string(), "{PARSEC_DIR=/opt/parsec, QEMU_PATH=/opt/qemu}");
        assert_eq!(config.get("PARSEC_DIR"), Some("/opt/parsec"));
        assert_eq!(config.get("QEMU_PATH"), Some("/opt/qemu"));
        assert_eq!(config.get("QEMU_LD_PREFIX"), None);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let config = parse("QEMU_STLD_DIR=\n").unwrap();
        assert_eq!(config.get("QEMU_STLD_DIR"), Some(""));
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let err = parse("A=1\nnot a pair\n").unwrap_err();
        assert!(matches!(err, Error::ConfigFormat { line: 2, .. }));
    }

    #[test]
    fn test_multiple_separators_are_rejected() {
        let err = parse("A=1\nB=2=3\n").unwrap_err();
        assert!(matches!(err, Error::ConfigFormat { line: 2, .. }));
    }

    #[test]
    fn test_require_missing_key() {
        let config = parse("A=1\n").unwrap();
        assert_eq!(config.require("A").unwrap(), "1");
        assert!(matches!(
            config.require("PARSEC_DIR"),
            Err(Error::MissingConfigKey(k)) if k == "PARSEC_DIR"
        ));
    }

    #[test]
    fn test_require_path_is_absolute() {
        let config = parse("PARSEC_DIR=parsec-3.0\nMATH_BIN=/opt/micro/math\n").unwrap();
        let root = config.require_path("PARSEC_DIR").unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, std::env::current_dir().unwrap().join("parsec-3.0"));
        assert_eq!(config.require_path("MATH_BIN").unwrap(), PathBuf::from("/opt/micro/math"));
        assert!(matches!(
            config.require_path("SQLITE_DIR"),
            Err(Error::MissingConfigKey(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "MATH_BIN=/usr/local/bin/math\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.get("MATH_BIN"), Some("/usr/local/bin/math"));
        assert_eq!(config.to_string(), "{MATH_BIN=/usr/local/bin/math}");
    }
}
