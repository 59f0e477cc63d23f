use thiserror::Error;

/// Results table errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("not a results table (bad magic)")]
    InvalidMagic,

    #[error("unsupported table version {0}")]
    UnsupportedVersion(u32),

    #[error("corrupt table: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
