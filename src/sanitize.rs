//! Normalization applied to every freshly loaded table.

use crate::constants::{DEFAULT_CHAR, NUL_CHAR};
use crate::types::{ColumnData, Table};
use tracing::debug;

/// Name unnamed columns by position and scrub NUL from Char columns.
///
/// Runs in place and returns the same table for chaining. Running it twice
/// changes nothing the second time.
pub fn sanitize(table: &mut Table) -> &mut Table {
    let mut named = 0;
    if table.column_count() > 0 && !table.has_column_names() {
        for (index, column) in table.columns_mut().iter_mut().enumerate() {
            column.set_name(index.to_string());
            named += 1;
        }
    }

    let mut scrubbed = 0;
    for column in table.columns_mut() {
        // Older serializations allowed NUL inside Char columns
        if let ColumnData::Char(values) = column.data_mut() {
            for value in values.iter_mut().flatten() {
                if *value == NUL_CHAR {
                    *value = DEFAULT_CHAR;
                    scrubbed += 1;
                }
            }
        }
    }

    if named > 0 || scrubbed > 0 {
        debug!(
            "Sanitized table: {} columns named, {} NUL chars replaced",
            named, scrubbed
        );
    }
    table
}
