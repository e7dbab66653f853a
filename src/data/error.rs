//! Error types for data operations
//!
//! Provides unified error handling for table construction, loading and saving.

use crate::constants::MALFORMED_INPUT_PREFIX;
use thiserror::Error;

/// Errors that can occur during data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Native codec error from serde_json
    #[error("Native format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited text could not be parsed
    #[error("{}{}", MALFORMED_INPUT_PREFIX, .0)]
    MalformedInput(String),

    /// File is too large for eager loading
    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: usize },

    /// File is empty
    #[error("Empty file")]
    EmptyFile,

    /// No columns found in data
    #[error("No columns found")]
    NoColumns,

    /// A column does not have the table's row count
    #[error("Column {index} has {len} rows, expected {expected}")]
    ColumnLengthMismatch {
        index: usize,
        len: usize,
        expected: usize,
    },

    /// Some columns are named and some are not
    #[error("Either all columns must be named or none")]
    MixedColumnNames,

    /// A non-nullable column holds an absent value
    #[error("Column {index} is not nullable but row {row} is null")]
    NullInNonNullable { index: usize, row: usize },

    /// Column index past the end of the table
    #[error("Column {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Whether this error belongs to the malformed-input class.
    ///
    /// Errors coming from foreign stores only carry a message, so the
    /// message prefix is honored as well as the variant.
    pub fn is_malformed_input(&self) -> bool {
        match self {
            DataError::MalformedInput(_) => true,
            other => other.to_string().starts_with(MALFORMED_INPUT_PREFIX),
        }
    }
}

impl From<String> for DataError {
    fn from(s: String) -> Self {
        DataError::Other(s)
    }
}

impl From<&str> for DataError {
    fn from(s: &str) -> Self {
        DataError::Other(s.to_string())
    }
}
