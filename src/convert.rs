//! Column type conversion.
//!
//! [`convert`] builds a brand new column of the target kind from a source
//! column. The source is never touched and the conversion is all-or-nothing:
//! the first row that cannot be represented in the target kind aborts the
//! whole column with a [`ConversionError`] pointing at that row.
//!
//! Rules by target:
//! - numeric: booleans map to 1/0, everything else is parsed from its text
//!   form with the target's standard grammar. For `Float` and `Double` that
//!   grammar includes "NaN", "inf" and "infinity" in any letter case, with an
//!   optional sign. Non-finite values print back as "NaN", "inf" and "-inf"
//! - `Char`: booleans map to 'T'/'F', otherwise the text form must be exactly
//!   one character
//! - `Boolean`: the text form must be one of the fixed true/false tokens
//! - `String`: the natural text form of the value
//! - `Binary`: strings become their UTF-8 bytes, binary is copied, other
//!   kinds use the bytes of their text form
//!
//! Nulls are carried over untouched and are never parsed.

use crate::constants::{
    FALSE_TOKENS, MAX_ERROR_VALUE_CHARS, TRUE_TOKENS, TRUNCATED_VALUE_CHARS,
};
use crate::data::DataError;
use crate::types::{Column, ColumnData, ColumnType, Table, Value};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// First unconvertible value of a column conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}: '{value}' at row {row}")]
pub struct ConversionError {
    /// "Invalid int", "Invalid character", "Invalid boolean", ...
    pub message: String,
    /// Offending value, shortened when long
    pub value: String,
    /// Row index of the offending value
    pub row: usize,
}

impl ConversionError {
    pub fn new(message: impl Into<String>, value: &str, row: usize) -> Self {
        Self {
            message: message.into(),
            value: truncate_value(value),
            row,
        }
    }
}

/// Shorten values longer than [`MAX_ERROR_VALUE_CHARS`] to their first
/// [`TRUNCATED_VALUE_CHARS`] characters plus "...".
fn truncate_value(value: &str) -> String {
    if value.chars().count() > MAX_ERROR_VALUE_CHARS {
        let head: String = value.chars().take(TRUNCATED_VALUE_CHARS).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Convert the first `row_count` rows of `source` into a new column of kind
/// `target`. The result keeps the source's name and nullability.
///
/// `row_count` is normally the owning table's row count. Rows past the
/// column's physical length are not read.
pub fn convert(
    source: &Column,
    row_count: usize,
    target: ColumnType,
) -> Result<Column, ConversionError> {
    let rows = if row_count > source.len() {
        warn!(
            "Row count {} exceeds column length {}, converting {} rows",
            row_count,
            source.len(),
            source.len()
        );
        source.len()
    } else {
        row_count
    };

    let data = match target {
        ColumnType::Byte => ColumnData::Byte(map_rows(source, rows, parse_number::<i8>(target))?),
        ColumnType::Short => {
            ColumnData::Short(map_rows(source, rows, parse_number::<i16>(target))?)
        }
        ColumnType::Int => ColumnData::Int(map_rows(source, rows, parse_number::<i32>(target))?),
        ColumnType::Long => ColumnData::Long(map_rows(source, rows, parse_number::<i64>(target))?),
        ColumnType::Float => {
            ColumnData::Float(map_rows(source, rows, parse_number::<f32>(target))?)
        }
        ColumnType::Double => {
            ColumnData::Double(map_rows(source, rows, parse_number::<f64>(target))?)
        }
        ColumnType::Char => ColumnData::Char(map_rows(source, rows, to_char)?),
        ColumnType::Boolean => ColumnData::Boolean(map_rows(source, rows, to_boolean)?),
        ColumnType::String => ColumnData::String(map_rows(source, rows, |v, _| Ok(v.to_string()))?),
        ColumnType::Binary => ColumnData::Binary(map_rows(source, rows, |v, _| Ok(to_binary(v)))?),
    };

    debug!(
        "Converted {} rows from {} to {}",
        rows,
        source.kind(),
        target
    );

    // Nulls only come from null source cells, so nullability carries over as is
    Ok(Column::from_parts(
        source.name().map(str::to_string),
        source.is_nullable(),
        data,
    ))
}

/// Apply `f` to every non-null cell, stopping at the first error.
fn map_rows<T>(
    source: &Column,
    rows: usize,
    f: impl Fn(&Value, usize) -> Result<T, ConversionError>,
) -> Result<Vec<Option<T>>, ConversionError> {
    (0..rows)
        .map(|row| match source.get(row) {
            Value::Null => Ok(None),
            value => f(&value, row).map(Some),
        })
        .collect()
}

/// Numeric representation of `true`/`false`
trait FromBool {
    fn from_bool(b: bool) -> Self;
}

macro_rules! impl_from_bool {
    ($($t:ty => $one:expr, $zero:expr);* $(;)?) => {
        $(impl FromBool for $t {
            fn from_bool(b: bool) -> Self {
                if b { $one } else { $zero }
            }
        })*
    };
}

impl_from_bool! {
    i8 => 1, 0;
    i16 => 1, 0;
    i32 => 1, 0;
    i64 => 1, 0;
    f32 => 1.0, 0.0;
    f64 => 1.0, 0.0;
}

fn parse_number<T: FromStr + FromBool>(
    target: ColumnType,
) -> impl Fn(&Value, usize) -> Result<T, ConversionError> {
    move |value, row| match value {
        Value::Boolean(b) => Ok(T::from_bool(*b)),
        other => {
            let text = other.to_string();
            text.parse::<T>()
                .map_err(|_| ConversionError::new(format!("Invalid {}", target.name()), &text, row))
        }
    }
}

fn to_char(value: &Value, row: usize) -> Result<char, ConversionError> {
    if let Value::Boolean(b) = value {
        return Ok(if *b { 'T' } else { 'F' });
    }

    let text = value.to_string();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConversionError::new("Invalid character", &text, row)),
    }
}

fn to_boolean(value: &Value, row: usize) -> Result<bool, ConversionError> {
    if let Value::Boolean(b) = value {
        return Ok(*b);
    }

    let text = value.to_string();
    if TRUE_TOKENS.contains(&text.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&text.as_str()) {
        Ok(false)
    } else {
        Err(ConversionError::new("Invalid boolean", &text, row))
    }
}

fn to_binary(value: &Value) -> Vec<u8> {
    match value {
        Value::Binary(bytes) => bytes.clone(),
        Value::String(s) => s.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

impl Table {
    /// Retype the column at `index` in place.
    ///
    /// On failure the table is left exactly as it was.
    pub fn convert_column(
        &mut self,
        index: usize,
        target: ColumnType,
    ) -> Result<(), ColumnConversionError> {
        let count = self.column_count();
        let source = self
            .column(index)
            .ok_or(DataError::ColumnOutOfRange { index, count })?;
        let converted = convert(source, self.row_count(), target)?;
        self.replace_column(index, converted)?;
        Ok(())
    }
}

/// Failure of [`Table::convert_column`]
#[derive(Error, Debug)]
pub enum ColumnConversionError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Table(#[from] DataError),
}
