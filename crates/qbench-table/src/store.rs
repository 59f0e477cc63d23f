//! File-level operations on results tables.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::record::ResultRecord;
use crate::{binary, delimited};

/// On-disk table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `;`-delimited text with a header row.
    Delimited,
    /// zstd-compressed binary rows.
    Binary,
}

impl TableFormat {
    /// Infer the format from the file extension: `.csv` selects delimited
    /// text, anything else the binary format.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::Delimited,
            _ => Self::Binary,
        }
    }
}

/// Read all rows of an existing table.
pub fn read_table(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    match TableFormat::from_path(path) {
        TableFormat::Delimited => delimited::read(reader),
        TableFormat::Binary => binary::read(reader),
    }
}

/// Write `rows` to `path`, replacing any existing content.
///
/// Rows go to a temporary file next to `path` that is renamed over it once
/// complete, so a failed write leaves the previous table intact.
pub fn write_table(path: impl AsRef<Path>, rows: &[ResultRecord]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)?;
    let writer = BufWriter::new(staged.as_file());
    match TableFormat::from_path(path) {
        TableFormat::Delimited => delimited::write(writer, rows)?,
        TableFormat::Binary => binary::write(writer, rows)?,
    }
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append `rows` after the existing rows of the table at `path`, creating
/// the table if it does not exist yet. Existing rows keep their order and
/// nothing is deduplicated.
pub fn append(path: impl AsRef<Path>, rows: &[ResultRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut table = match read_table(path) {
        Ok(existing) => existing,
        Err(crate::TableError::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e),
    };
    debug!(
        path = %path.display(),
        existing = table.len(),
        new = rows.len(),
        "appending to results table"
    );
    table.extend_from_slice(rows);
    write_table(path, &table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(prefix: &str, n: usize) -> Vec<ResultRecord> {
        (0..n)
            .map(|i| {
                let mut r = ResultRecord::new(format!("{prefix}{i}"), "none", "x86_64", 1)
                    .with_measurement("seconds", i as f64 + 0.5, 0);
                r.stamp("native", "none");
                r
            })
            .collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("out.csv")), TableFormat::Delimited);
        assert_eq!(TableFormat::from_path(Path::new("out.pkl")), TableFormat::Binary);
        assert_eq!(TableFormat::from_path(Path::new("out")), TableFormat::Binary);
        assert_eq!(TableFormat::from_path(Path::new("out.csv.bak")), TableFormat::Binary);
    }

    #[test]
    fn test_append_fresh_path() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["results.csv", "results.qbt"] {
            let path = dir.path().join(name);
            let new = rows("a", 3);
            append(&path, &new).unwrap();
            assert_eq!(read_table(&path).unwrap(), new);
        }
    }

    #[test]
    fn test_append_existing_keeps_old_rows_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["results.csv", "results.qbt"] {
            let path = dir.path().join(name);
            let old = rows("old", 2);
            let new = rows("new", 3);
            append(&path, &old).unwrap();
            append(&path, &new).unwrap();
            // Appending the same rows again must not deduplicate.
            append(&path, &new).unwrap();

            let table = read_table(&path).unwrap();
            let expected: Vec<_> = old.iter().chain(&new).chain(&new).cloned().collect();
            assert_eq!(table, expected);
        }
    }

    #[test]
    fn test_rewrite_leaves_only_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_table(&path, &rows("a", 2)).unwrap();
        write_table(&path, &rows("b", 1)).unwrap();

        assert_eq!(read_table(&path).unwrap(), rows("b", 1));
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_destination() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by the staged file.
        let path = dir.path().join("results.qbt");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"archived").unwrap();

        assert!(write_table(&path, &rows("x", 1)).is_err());
        assert_eq!(std::fs::read(path.join("keep")).unwrap(), b"archived");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_append_to_corrupt_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.qbt");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(append(&path, &rows("x", 1)).is_err());
        // The unreadable file is left untouched.
        assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
    }
}
