//! Core types for the tabular data model.
//!
//! A [`Table`] is an ordered set of equal-length [`Column`]s. Each column
//! stores one primitive kind ([`ColumnType`]) in a typed vector, so values
//! of a column can never disagree on their kind. Nullability is a per-column
//! flag: a non-nullable column never holds an absent value.

use crate::constants::DEFAULT_CHAR;
use crate::data::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Tags and Values
// ============================================================================

/// The closed set of primitive column kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
    String,
    Binary,
}

impl ColumnType {
    /// Lowercase name used in user-facing messages
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Byte => "byte",
            ColumnType::Short => "short",
            ColumnType::Int => "int",
            ColumnType::Long => "long",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Char => "char",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::Binary => "binary",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Byte
                | ColumnType::Short
                | ColumnType::Int
                | ColumnType::Long
                | ColumnType::Float
                | ColumnType::Double
        )
    }

    pub fn all() -> &'static [ColumnType] {
        &[
            ColumnType::Byte,
            ColumnType::Short,
            ColumnType::Int,
            ColumnType::Long,
            ColumnType::Float,
            ColumnType::Double,
            ColumnType::Char,
            ColumnType::Boolean,
            ColumnType::String,
            ColumnType::Binary,
        ]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Boolean(bool),
    String(String),
    Binary(Vec<u8>),
}

impl Value {
    /// Kind of this value, `None` for [`Value::Null`]
    pub fn kind(&self) -> Option<ColumnType> {
        Some(match self {
            Value::Null => return None,
            Value::Byte(_) => ColumnType::Byte,
            Value::Short(_) => ColumnType::Short,
            Value::Int(_) => ColumnType::Int,
            Value::Long(_) => ColumnType::Long,
            Value::Float(_) => ColumnType::Float,
            Value::Double(_) => ColumnType::Double,
            Value::Char(_) => ColumnType::Char,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::String(_) => ColumnType::String,
            Value::Binary(_) => ColumnType::Binary,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Value stored in fresh cells of a non-nullable column
    pub fn default_for(kind: ColumnType) -> Self {
        match kind {
            ColumnType::Byte => Value::Byte(0),
            ColumnType::Short => Value::Short(0),
            ColumnType::Int => Value::Int(0),
            ColumnType::Long => Value::Long(0),
            ColumnType::Float => Value::Float(0.0),
            ColumnType::Double => Value::Double(0.0),
            ColumnType::Char => Value::Char(DEFAULT_CHAR),
            ColumnType::Boolean => Value::Boolean(false),
            ColumnType::String => Value::String(String::new()),
            ColumnType::Binary => Value::Binary(Vec::new()),
        }
    }
}

/// Natural text form of a value. Null renders as the empty string and
/// binary renders as lowercase hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", c),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::String(s) => f.write_str(s),
            Value::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Column Storage
// ============================================================================

/// Typed backing storage of a column, one vector per kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Byte(Vec<Option<i8>>),
    Short(Vec<Option<i16>>),
    Int(Vec<Option<i32>>),
    Long(Vec<Option<i64>>),
    Float(#[serde(with = "float_tokens")] Vec<Option<f32>>),
    Double(#[serde(with = "float_tokens")] Vec<Option<f64>>),
    Char(Vec<Option<char>>),
    Boolean(Vec<Option<bool>>),
    String(Vec<Option<String>>),
    Binary(Vec<Option<Vec<u8>>>),
}

/// Serde adapter for float storage.
///
/// JSON numbers cannot hold NaN or the infinities, so those cells are written
/// as the string tokens "NaN", "inf" and "-inf" (their `Display` form).
mod float_tokens {
    use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
    use serde::ser::{Serialize, SerializeSeq, Serializer};
    use std::str::FromStr;

    pub trait Float: Copy + Serialize + DeserializeOwned + FromStr + ToString {
        fn is_finite(self) -> bool;
    }

    impl Float for f32 {
        fn is_finite(self) -> bool {
            f32::is_finite(self)
        }
    }

    impl Float for f64 {
        fn is_finite(self) -> bool {
            f64::is_finite(self)
        }
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(untagged)]
    enum Cell<T> {
        Number(T),
        Token(String),
    }

    const TOKENS: [&str; 3] = ["NaN", "inf", "-inf"];

    pub fn serialize<T: Float, S: Serializer>(
        values: &[Option<T>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            let cell = value.map(|v| {
                if v.is_finite() {
                    Cell::Number(v)
                } else {
                    Cell::Token(v.to_string())
                }
            });
            seq.serialize_element(&cell)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, T: Float, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<T>>, D::Error> {
        Vec::<Option<Cell<T>>>::deserialize(deserializer)?
            .into_iter()
            .map(|cell| match cell {
                None => Ok(None),
                Some(Cell::Number(v)) => Ok(Some(v)),
                Some(Cell::Token(token)) if TOKENS.contains(&token.as_str()) => token
                    .parse()
                    .map(Some)
                    .map_err(|_| de::Error::custom(format!("invalid float token '{}'", token))),
                Some(Cell::Token(token)) => Err(de::Error::custom(format!(
                    "invalid float token '{}'",
                    token
                ))),
            })
            .collect()
    }
}

/// Run `$body` with `$v` bound to the inner vector, whatever its kind.
macro_rules! with_values {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Byte($v) => $body,
            ColumnData::Short($v) => $body,
            ColumnData::Int($v) => $body,
            ColumnData::Long($v) => $body,
            ColumnData::Float($v) => $body,
            ColumnData::Double($v) => $body,
            ColumnData::Char($v) => $body,
            ColumnData::Boolean($v) => $body,
            ColumnData::String($v) => $body,
            ColumnData::Binary($v) => $body,
        }
    };
}

fn filled<T: Clone>(len: usize, nullable: bool, default: T) -> Vec<Option<T>> {
    vec![if nullable { None } else { Some(default) }; len]
}

impl ColumnData {
    /// Storage of `len` cells: nulls when nullable, kind defaults otherwise
    pub fn new(kind: ColumnType, len: usize, nullable: bool) -> Self {
        match kind {
            ColumnType::Byte => ColumnData::Byte(filled(len, nullable, 0)),
            ColumnType::Short => ColumnData::Short(filled(len, nullable, 0)),
            ColumnType::Int => ColumnData::Int(filled(len, nullable, 0)),
            ColumnType::Long => ColumnData::Long(filled(len, nullable, 0)),
            ColumnType::Float => ColumnData::Float(filled(len, nullable, 0.0)),
            ColumnType::Double => ColumnData::Double(filled(len, nullable, 0.0)),
            ColumnType::Char => ColumnData::Char(filled(len, nullable, DEFAULT_CHAR)),
            ColumnType::Boolean => ColumnData::Boolean(filled(len, nullable, false)),
            ColumnType::String => ColumnData::String(filled(len, nullable, String::new())),
            ColumnType::Binary => ColumnData::Binary(filled(len, nullable, Vec::new())),
        }
    }

    pub fn kind(&self) -> ColumnType {
        match self {
            ColumnData::Byte(_) => ColumnType::Byte,
            ColumnData::Short(_) => ColumnType::Short,
            ColumnData::Int(_) => ColumnType::Int,
            ColumnData::Long(_) => ColumnType::Long,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::Char(_) => ColumnType::Char,
            ColumnData::Boolean(_) => ColumnType::Boolean,
            ColumnData::String(_) => ColumnType::String,
            ColumnData::Binary(_) => ColumnType::Binary,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row index of the first absent value, if any
    pub fn first_null(&self) -> Option<usize> {
        with_values!(self, v => v.iter().position(Option::is_none))
    }

    /// Read a cell. Panics when `row` is out of bounds.
    pub fn get(&self, row: usize) -> Value {
        match self {
            ColumnData::Byte(v) => v[row].map_or(Value::Null, Value::Byte),
            ColumnData::Short(v) => v[row].map_or(Value::Null, Value::Short),
            ColumnData::Int(v) => v[row].map_or(Value::Null, Value::Int),
            ColumnData::Long(v) => v[row].map_or(Value::Null, Value::Long),
            ColumnData::Float(v) => v[row].map_or(Value::Null, Value::Float),
            ColumnData::Double(v) => v[row].map_or(Value::Null, Value::Double),
            ColumnData::Char(v) => v[row].map_or(Value::Null, Value::Char),
            ColumnData::Boolean(v) => v[row].map_or(Value::Null, Value::Boolean),
            ColumnData::String(v) => v[row].clone().map_or(Value::Null, Value::String),
            ColumnData::Binary(v) => v[row].clone().map_or(Value::Null, Value::Binary),
        }
    }

    /// Write a cell, handing the value back if its kind does not match.
    fn set(&mut self, row: usize, value: Value) -> Result<(), Value> {
        match (self, value) {
            (data, Value::Null) => with_values!(data, v => v[row] = None),
            (ColumnData::Byte(v), Value::Byte(x)) => v[row] = Some(x),
            (ColumnData::Short(v), Value::Short(x)) => v[row] = Some(x),
            (ColumnData::Int(v), Value::Int(x)) => v[row] = Some(x),
            (ColumnData::Long(v), Value::Long(x)) => v[row] = Some(x),
            (ColumnData::Float(v), Value::Float(x)) => v[row] = Some(x),
            (ColumnData::Double(v), Value::Double(x)) => v[row] = Some(x),
            (ColumnData::Char(v), Value::Char(x)) => v[row] = Some(x),
            (ColumnData::Boolean(v), Value::Boolean(x)) => v[row] = Some(x),
            (ColumnData::String(v), Value::String(x)) => v[row] = Some(x),
            (ColumnData::Binary(v), Value::Binary(x)) => v[row] = Some(x),
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

// ============================================================================
// Column
// ============================================================================

/// A named, homogeneously typed sequence of cells
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: Option<String>,
    nullable: bool,
    data: ColumnData,
}

impl Column {
    /// Create a column of `len` cells, all null or all defaults.
    pub fn new(name: Option<String>, kind: ColumnType, nullable: bool, len: usize) -> Self {
        Self {
            name,
            nullable,
            data: ColumnData::new(kind, len, nullable),
        }
    }

    /// Wrap existing storage, rejecting nulls in a non-nullable column.
    pub fn from_data(name: Option<String>, nullable: bool, data: ColumnData) -> DataResult<Self> {
        if !nullable {
            if let Some(row) = data.first_null() {
                return Err(DataError::NullInNonNullable { index: 0, row });
            }
        }
        Ok(Self {
            name,
            nullable,
            data,
        })
    }

    pub(crate) fn from_parts(name: Option<String>, nullable: bool, data: ColumnData) -> Self {
        Self {
            name,
            nullable,
            data,
        }
    }

    /// Build a column from cell values.
    ///
    /// # Panics
    /// Same conditions as [`Column::set`].
    pub fn from_values(
        name: Option<String>,
        kind: ColumnType,
        nullable: bool,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().collect();
        let mut column = Self::new(name, kind, nullable, values.len());
        for (row, value) in values.into_iter().enumerate() {
            column.set(row, value);
        }
        column
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn kind(&self) -> ColumnType {
        self.data.kind()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    /// Value a fresh cell of this column holds
    pub fn default_value(&self) -> Value {
        if self.nullable {
            Value::Null
        } else {
            Value::default_for(self.kind())
        }
    }

    /// Read a cell.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    pub fn get(&self, row: usize) -> Value {
        self.data.get(row)
    }

    /// Write a cell.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds, if the value's kind differs from the
    /// column's, or if `Value::Null` is written to a non-nullable column.
    pub fn set(&mut self, row: usize, value: Value) {
        assert!(
            self.nullable || !value.is_null(),
            "null written to non-nullable {} column at row {}",
            self.kind(),
            row
        );
        if let Err(value) = self.data.set(row, value) {
            panic!(
                "{:?} written to {} column at row {}",
                value,
                self.kind(),
                row
            );
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |row| self.get(row))
    }
}

// ============================================================================
// Table
// ============================================================================

/// An ordered set of equal-length columns
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking lengths and naming.
    pub fn new(columns: Vec<Column>) -> DataResult<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let table = Self { columns, row_count };
        table.validate()?;
        Ok(table)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Check the table invariants. Used after decoding foreign data.
    pub fn validate(&self) -> DataResult<()> {
        for (index, column) in self.columns.iter().enumerate() {
            if column.len() != self.row_count {
                return Err(DataError::ColumnLengthMismatch {
                    index,
                    len: column.len(),
                    expected: self.row_count,
                });
            }
            if !column.nullable {
                if let Some(row) = column.data.first_null() {
                    return Err(DataError::NullInNonNullable { index, row });
                }
            }
        }

        let named = self.columns.iter().filter(|c| c.name.is_some()).count();
        if named != 0 && named != self.columns.len() {
            return Err(DataError::MixedColumnNames);
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// True when the table has columns and every one of them is named
    pub fn has_column_names(&self) -> bool {
        !self.columns.is_empty() && self.columns.iter().all(|c| c.name.is_some())
    }

    /// Column names, or `None` for an unnamed table
    pub fn column_names(&self) -> Option<Vec<&str>> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<Value> {
        let column = self.columns.get(column)?;
        (row < column.len()).then(|| column.get(row))
    }

    /// Swap in a column of the same length, returning the old one.
    pub fn replace_column(&mut self, index: usize, column: Column) -> DataResult<Column> {
        let count = self.columns.len();
        let Some(slot) = self.columns.get_mut(index) else {
            return Err(DataError::ColumnOutOfRange { index, count });
        };
        if column.len() != self.row_count {
            return Err(DataError::ColumnLengthMismatch {
                index,
                len: column.len(),
                expected: self.row_count,
            });
        }
        Ok(std::mem::replace(slot, column))
    }
}
