//! Read/write primitive used by the ingestion pipeline.
//!
//! [`TableStore`] is the seam between the editor core and storage. Every call
//! is synchronous and may fail; the pipeline only ever calls it from a
//! background worker.

use crate::constants::MAX_FILE_SIZE_MB;
use crate::data::csv_parser::{parse_delimited, write_delimited_content};
use crate::data::error::{DataError, DataResult};
use crate::data::native::{decode_table, write_native_file};
use crate::file::FileDescriptor;
use crate::settings::Settings;
use crate::types::Table;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub trait TableStore: Send + Sync {
    /// Whether the file can be read at all
    fn exists(&self, file: &FileDescriptor) -> bool {
        file.exists()
    }

    fn read_native(&self, path: &Path) -> DataResult<Table>;

    fn write_native(&self, path: &Path, table: &Table) -> DataResult<()>;

    fn read_delimited(&self, path: &Path, has_header: bool, delimiter: char) -> DataResult<Table>;

    fn write_delimited(
        &self,
        path: &Path,
        table: &Table,
        has_header: bool,
        delimiter: char,
    ) -> DataResult<()>;

    /// Read a file the way its descriptor says
    fn read(&self, file: &FileDescriptor) -> DataResult<Table> {
        if file.is_imported() {
            self.read_delimited(file.path(), file.has_header(), file.delimiter())
        } else {
            self.read_native(file.path())
        }
    }

    /// Write a file the way its descriptor says
    fn write(&self, file: &FileDescriptor, table: &Table) -> DataResult<()> {
        if file.is_imported() {
            self.write_delimited(file.path(), table, file.has_header(), file.delimiter())
        } else {
            self.write_native(file.path(), table)
        }
    }
}

/// Filesystem-backed store
#[derive(Clone, Debug)]
pub struct FsTableStore {
    max_file_size_mb: usize,
}

impl Default for FsTableStore {
    fn default() -> Self {
        Self {
            max_file_size_mb: MAX_FILE_SIZE_MB,
        }
    }
}

impl FsTableStore {
    pub fn new(max_file_size_mb: usize) -> Self {
        Self { max_file_size_mb }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.max_file_size_mb)
    }

    /// Refuse files above the size limit before reading them.
    fn check_size(&self, path: &Path) -> DataResult<()> {
        let metadata = std::fs::metadata(path)?;
        let size_mb = metadata.len() / (1024 * 1024);
        if size_mb > self.max_file_size_mb as u64 {
            return Err(DataError::TooLarge {
                size_mb,
                max_mb: self.max_file_size_mb,
            });
        }
        Ok(())
    }
}

impl TableStore for FsTableStore {
    fn read_native(&self, path: &Path) -> DataResult<Table> {
        let start = Instant::now();
        self.check_size(path)?;
        let table = decode_table(std::fs::File::open(path)?)?;
        debug!(
            "Loaded {} with {} rows x {} cols in {:?}",
            path.display(),
            table.row_count(),
            table.column_count(),
            start.elapsed()
        );
        Ok(table)
    }

    fn write_native(&self, path: &Path, table: &Table) -> DataResult<()> {
        write_native_file(path, table)
    }

    fn read_delimited(&self, path: &Path, has_header: bool, delimiter: char) -> DataResult<Table> {
        let start = Instant::now();
        self.check_size(path)?;
        let content = std::fs::read_to_string(path)?;
        let table = parse_delimited(&content, has_header, delimiter)?;
        debug!(
            "Imported {} with {} rows x {} cols in {:?}",
            path.display(),
            table.row_count(),
            table.column_count(),
            start.elapsed()
        );
        Ok(table)
    }

    fn write_delimited(
        &self,
        path: &Path,
        table: &Table,
        has_header: bool,
        delimiter: char,
    ) -> DataResult<()> {
        let content = write_delimited_content(table, has_header, delimiter);
        std::fs::write(path, content)?;
        Ok(())
    }
}
