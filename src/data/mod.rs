//! Data loading and saving
//!
//! This module provides the storage side of the editor: the [`TableStore`]
//! read/write primitive and the two codecs behind [`FsTableStore`].
//!
//! ## Formats
//!
//! - Native: JSON encoding of a [`Table`](crate::types::Table), validated on load
//! - Delimited: CSV/TSV text with optional header and type inference
//!
//! ## Error Handling
//!
//! All data operations return `DataResult<T>` which uses the `DataError` type.
//! Common errors include:
//! - `Io`: File system errors
//! - `MalformedInput`: Delimited text that cannot be parsed
//! - `Json`: Native files that cannot be decoded
//! - `TooLarge`: File exceeds the configured size limit

mod csv_parser;
mod error;
mod native;
mod store;

pub use csv_parser::*;
pub use error::*;
pub use native::*;
pub use store::*;
