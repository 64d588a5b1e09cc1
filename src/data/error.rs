use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::loader::SourceEncoding;

/// Errors raised while loading a sales table. Any of these aborts the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("source is not valid {encoding} (first bad byte at offset {offset})")]
    InvalidEncoding {
        encoding: SourceEncoding,
        offset: usize,
    },
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: column '{column}' is empty")]
    MissingValue { row: usize, column: String },
    #[error("column '{column}' has unsupported type {found}")]
    ColumnType { column: String, found: String },
    #[error("row {row}: '{value}' is not a valid Order Date")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: column '{column}' value '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
