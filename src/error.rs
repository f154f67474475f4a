//! Error types for loading the dataset and exporting reports.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Fatal errors raised while reading the sales CSV.
///
/// Line numbers are 1-based and count the header row, so they match what an
/// editor shows for the offending row.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("Line {line}: cannot parse date '{value}'")]
    InvalidDate { line: usize, value: String },
    #[error("Line {line}: missing or invalid value in column '{column}'")]
    InvalidValue { line: usize, column: &'static str },
    #[error("Line {line}: {column} value {value} is out of range")]
    OutOfRange {
        line: usize,
        column: &'static str,
        value: f64,
    },
}

/// Errors raised while writing JSON, PNG or PPTX output.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Failed to write PPTX archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}
