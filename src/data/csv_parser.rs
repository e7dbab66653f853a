//! Delimited text parsing and writing
//!
//! Parses CSV/TSV-style text into a [`Table`] with per-column type inference.
//! Every record must have the same number of fields; anything else is
//! reported as [`DataError::MalformedInput`].

use crate::data::error::{DataError, DataResult};
use crate::types::{Column, ColumnData, ColumnType, Table, Value};

/// Parse delimited content into a table.
///
/// With `has_header` the first record supplies column names, otherwise the
/// columns are left unnamed. Empty lines are skipped and empty fields are
/// null. Columns are nullable and typed by [`infer_column_type`].
pub fn parse_delimited(content: &str, has_header: bool, delimiter: char) -> DataResult<Table> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut width: Option<usize> = None;

    for record in split_records(content, delimiter)? {
        match width {
            None => width = Some(record.fields.len()),
            Some(expected) if expected != record.fields.len() => {
                return Err(DataError::MalformedInput(format!(
                    "line {} has {} fields, expected {}",
                    record.line,
                    record.fields.len(),
                    expected
                )));
            }
            Some(_) => {}
        }
        records.push(record.fields);
    }

    let mut records = records.into_iter();
    let headers: Option<Vec<String>> = if has_header {
        Some(records.next().ok_or(DataError::EmptyFile)?)
    } else {
        None
    };
    let rows: Vec<Vec<String>> = records.collect();

    let width = width.ok_or(DataError::EmptyFile)?;
    if width == 0 {
        return Err(DataError::NoColumns);
    }

    let columns: Vec<Column> = (0..width)
        .map(|index| {
            let cells: Vec<&str> = rows.iter().map(|r| r[index].as_str()).collect();
            let name = headers.as_ref().map(|h| h[index].trim().to_string());
            build_column(name, &cells)
        })
        .collect();

    Table::new(columns)
}

/// Infer the kind for a column of raw cells.
///
/// Non-empty cells are tested in order: all integers → Long, all numbers →
/// Double, all `true`/`false` (any case) → Boolean, otherwise String. A
/// column with no values at all is String.
pub fn infer_column_type(cells: &[&str]) -> ColumnType {
    let mut values = cells.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).peekable();
    if values.peek().is_none() {
        return ColumnType::String;
    }
    let values: Vec<&str> = values.collect();

    if values.iter().all(|s| s.parse::<i64>().is_ok()) {
        ColumnType::Long
    } else if values.iter().all(|s| s.parse::<f64>().is_ok()) {
        ColumnType::Double
    } else if values
        .iter()
        .all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"))
    {
        ColumnType::Boolean
    } else {
        ColumnType::String
    }
}

fn build_column(name: Option<String>, cells: &[&str]) -> Column {
    fn typed<T>(cells: &[&str], parse: impl Fn(&str) -> Option<T>) -> Vec<Option<T>> {
        cells
            .iter()
            .map(|s| s.trim())
            .map(|s| if s.is_empty() { None } else { parse(s) })
            .collect()
    }

    let data = match infer_column_type(cells) {
        ColumnType::Long => ColumnData::Long(typed(cells, |s| s.parse().ok())),
        ColumnType::Double => ColumnData::Double(typed(cells, |s| s.parse().ok())),
        ColumnType::Boolean => {
            ColumnData::Boolean(typed(cells, |s| Some(s.eq_ignore_ascii_case("true"))))
        }
        // String cells keep their surrounding whitespace
        _ => ColumnData::String(
            cells
                .iter()
                .map(|s| (!s.is_empty()).then(|| s.to_string()))
                .collect(),
        ),
    };
    Column::from_parts(name, true, data)
}

/// A parsed record and the line it starts on (1-based).
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Split content into records.
///
/// A field starting with a quote runs to the matching closing quote, across
/// line breaks if needed; a doubled quote inside it stands for one literal
/// quote. Blank lines outside quotes are skipped.
fn split_records(content: &str, delimiter: char) -> DataResult<Vec<Record>> {
    let malformed = |line: usize, message: String| {
        DataError::MalformedInput(format!("line {}: {}", line, message))
    };

    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = content.chars().peekable();
    let mut line = 1;
    let mut start = 1;
    let mut in_quotes = false;
    let mut quoted = false;

    let mut finish = |fields: &mut Vec<String>, field: &mut String, quoted: bool, start: usize| {
        fields.push(std::mem::take(field));
        let blank = fields.len() == 1 && !quoted && fields[0].trim().is_empty();
        let fields = std::mem::take(fields);
        if !blank {
            records.push(Record { line: start, fields });
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        } else if c == '\n' || (c == '\r' && chars.peek() == Some(&'\n')) {
            if c == '\r' {
                chars.next();
            }
            finish(&mut fields, &mut field, quoted, start);
            quoted = false;
            line += 1;
            start = line;
        } else if c == '"' && field.trim().is_empty() && !quoted {
            field.clear();
            in_quotes = true;
            quoted = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
            quoted = false;
        } else if quoted {
            if !c.is_whitespace() {
                return Err(malformed(line, format!("unexpected '{}' after closing quote", c)));
            }
        } else {
            field.push(c);
        }
    }

    if in_quotes {
        return Err(malformed(start, "unterminated quoted field".to_string()));
    }
    if quoted || !fields.is_empty() || !field.is_empty() {
        finish(&mut fields, &mut field, quoted, start);
    }
    Ok(records)
}

/// Convert a table to delimited text.
///
/// Nulls become empty fields. With `has_header`, unnamed tables get
/// positional names.
pub fn write_delimited_content(table: &Table, has_header: bool, delimiter: char) -> String {
    let mut lines = Vec::with_capacity(table.row_count() + 1);
    let sep = delimiter.to_string();

    if has_header {
        let headers: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, col)| {
                let name = col.name().map_or_else(|| index.to_string(), str::to_string);
                quote_field(&name, delimiter)
            })
            .collect();
        lines.push(headers.join(&sep));
    }

    for row in 0..table.row_count() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|col| match col.get(row) {
                Value::Null => String::new(),
                value => quote_field(&value.to_string(), delimiter),
            })
            .collect();
        lines.push(cells.join(&sep));
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Quote a field if necessary (contains delimiter, quotes, or newlines)
fn quote_field(value: &str, delimiter: char) -> String {
    let needs_quoting = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        // Escape internal quotes by doubling them
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
