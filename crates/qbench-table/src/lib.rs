//! Persisted results table for benchmark runs.
//!
//! Every invocation of the harness appends its rows to a single table file so
//! that results from heterogeneous runtimes and tags can be compared later.
//! Two on-disk formats are supported, selected by file extension:
//!
//! - `.csv`: `;`-delimited text with a header row
//! - anything else: the compact zstd-compressed binary table
//!
//! ```ignore
//! use qbench_table::{ResultRecord, append};
//!
//! let rows = vec![ResultRecord::new("parsec.vips", "simsmall", "x86_64", 4)];
//! append("results.csv", &rows)?;
//! ```
//!
//! The store reads the whole file and rewrites it. There is no locking:
//! concurrent invocations writing the same path may lose rows.

mod binary;
mod delimited;
mod error;
mod record;
mod store;

pub use error::{Result, TableError};
pub use record::{COLUMNS, ResultRecord};
pub use store::{TableFormat, append, read_table, write_table};
