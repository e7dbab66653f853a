//! Tabledit: core of a tabular data editor.
//!
//! - [`types`]: typed columns and the tables built from them
//! - [`convert`]: all-or-nothing column type conversion
//! - [`sanitize`]: post-load normalization of tables
//! - [`data`]: the read/write store with its native and delimited codecs
//! - [`ingest`]: background loading of one or many files
//! - [`report`]: side channel for load failures

pub mod background;
pub mod constants;
pub mod convert;
pub mod data;
pub mod file;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod sanitize;
pub mod settings;
pub mod types;

pub use convert::{ConversionError, convert};
pub use file::{FileDescriptor, ImportOptions};
pub use ingest::{BulkReadHandle, BulkReadResult, BulkReadState, IngestPipeline, LoadedTable};
pub use report::{CollectingSink, ErrorSink, IngestReport, ReportKind, TracingSink};
pub use types::{Column, ColumnData, ColumnType, Table, Value};
