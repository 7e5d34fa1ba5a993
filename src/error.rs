use std::path::PathBuf;
use thiserror::Error;

/// The main error type for oistats operations.
#[derive(Debug, Error)]
pub enum OistatsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid integer '{value}' in column '{column}' at {path}:{line}")]
    InvalidInteger {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("Row at {path}:{line} has {found} field(s), expected at most {expected}")]
    RowWidth {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
