//! Per-benchmark scratch directories.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::{Error, Result};

/// A temporary directory holding a benchmark's inputs and outputs.
///
/// Removed by [`Scratch::release`], or on drop if the harness never got that
/// far.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create a fresh directory under the system temp dir.
    pub fn create(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        debug!(path = %dir.path().display(), "scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the scratch directory, as a command-line argument.
    pub fn arg(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    /// Unpack a tar archive into the scratch directory.
    pub fn extract(&self, archive: &Path) -> Result<()> {
        if !archive.is_file() {
            return Err(Error::Extract {
                archive: archive.to_path_buf(),
                reason: "archive not found".to_string(),
            });
        }

        debug!(archive = %archive.display(), "extracting");
        let output = Command::new("tar")
            .arg("-xf")
            .arg(archive)
            .arg("-C")
            .arg(self.path())
            .output()
            .map_err(|e| Error::Extract {
                archive: archive.to_path_buf(),
                reason: format!("cannot run tar: {e}"),
            })?;

        if !output.status.success() {
            return Err(Error::Extract {
                archive: archive.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Copy a single input file into the scratch directory, keeping its name.
    pub fn copy_in(&self, file: &Path) -> Result<PathBuf> {
        let name = file.file_name().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no file name", file.display()),
            ))
        })?;
        let dest = self.path().join(name);
        std::fs::copy(file, &dest)?;
        debug!(from = %file.display(), to = %dest.display(), "input copied");
        Ok(dest)
    }

    /// Remove the directory and everything in it.
    pub fn release(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "scratch directory removed");
        Ok(())
    }
}
