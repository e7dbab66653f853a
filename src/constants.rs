//! Application-wide constants.
//!
//! Centralizes magic numbers and fixed tokens so the conversion engine,
//! sanitizer and codecs agree on them.

// ============================================================================
// Data Model
// ============================================================================

/// Placeholder stored in non-nullable Char cells and substituted for NUL
pub const DEFAULT_CHAR: char = ' ';

/// Character that is never allowed inside a Char column
pub const NUL_CHAR: char = '\u{0000}';

// ============================================================================
// Conversion
// ============================================================================

/// Offending values longer than this are shortened in conversion errors
pub const MAX_ERROR_VALUE_CHARS: usize = 10;

/// Number of characters kept when an offending value is shortened
pub const TRUNCATED_VALUE_CHARS: usize = 7;

/// Tokens accepted as `true` when converting to Boolean (case-sensitive)
pub const TRUE_TOKENS: &[&str] = &["true", "TRUE", "t", "T", "1", "yes", "YES", "y", "Y"];

/// Tokens accepted as `false` when converting to Boolean (case-sensitive)
pub const FALSE_TOKENS: &[&str] = &["false", "FALSE", "f", "F", "0", "no", "NO", "n", "N"];

// ============================================================================
// File Ingestion
// ============================================================================

/// Message prefix that marks a delimited-import parse failure
pub const MALFORMED_INPUT_PREFIX: &str = "Malformed input: ";

/// Maximum file size for eager loading in megabytes
pub const MAX_FILE_SIZE_MB: usize = 100;

/// Default number of background worker threads
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// Default delimiter for imported text files
pub const DEFAULT_DELIMITER: char = ',';
