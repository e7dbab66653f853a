//! Native table format
//!
//! Tables are stored as JSON produced by `serde`. Decoded tables are
//! validated before use since the file may come from an older or foreign
//! writer.

use crate::data::error::{DataError, DataResult};
use crate::types::Table;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Decode a table from a reader.
pub fn decode_table(reader: impl Read) -> DataResult<Table> {
    let table: Table = serde_json::from_reader(BufReader::new(reader))?;
    table.validate()?;
    Ok(table)
}

/// Encode a table to a writer.
pub fn encode_table(table: &Table, writer: impl Write) -> DataResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

/// Write a table atomically: encode into a temp file next to `path`, then
/// rename it over the destination.
pub fn write_native_file(path: &Path, table: &Table) -> DataResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    encode_table(table, file.as_file_mut())?;
    file.persist(path).map_err(|e| DataError::Io(e.error))?;
    Ok(())
}
