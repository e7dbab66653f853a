//! Unit tests for table sanitization.

use crate::helpers::{TestTableBuilder, strings};
use tabledit::sanitize::sanitize;
use tabledit::{ColumnType, Table, Value};

#[test]
fn test_unnamed_table_gets_positional_names() {
    let mut table = TestTableBuilder::new()
        .with_unnamed_column(ColumnType::Int, vec![Value::Int(1)])
        .with_unnamed_column(ColumnType::String, strings(&["a"]))
        .with_unnamed_column(ColumnType::Boolean, vec![Value::Null])
        .build();

    sanitize(&mut table);
    assert_eq!(table.column_names(), Some(vec!["0", "1", "2"]));
    assert!(table.has_column_names());
}

#[test]
fn test_named_table_keeps_names() {
    let mut table = TestTableBuilder::new()
        .with_column("left", ColumnType::Int, vec![Value::Int(1)])
        .with_column("right", ColumnType::Int, vec![Value::Int(2)])
        .build();

    sanitize(&mut table);
    assert_eq!(table.column_names(), Some(vec!["left", "right"]));
}

#[test]
fn test_nul_chars_replaced() {
    let mut table = TestTableBuilder::new()
        .with_nullable_column(
            "c",
            ColumnType::Char,
            vec![Value::Char('\0'), Value::Null, Value::Char('z'), Value::Char('\0')],
        )
        .build();

    sanitize(&mut table);
    let values: Vec<Value> = table.column(0).unwrap().iter().collect();
    assert_eq!(
        values,
        vec![Value::Char(' '), Value::Null, Value::Char('z'), Value::Char(' ')]
    );
}

#[test]
fn test_nul_in_strings_is_left_alone() {
    let mut table = TestTableBuilder::new()
        .with_column("s", ColumnType::String, strings(&["a\0b"]))
        .build();

    sanitize(&mut table);
    assert_eq!(table.get(0, 0), Some(Value::String("a\0b".into())));
}

#[test]
fn test_empty_table_unchanged() {
    let mut table = Table::empty();
    sanitize(&mut table);
    assert_eq!(table, Table::empty());
    assert_eq!(table.column_names(), Some(vec![]));
}

#[test]
fn test_idempotent() {
    let mut once = TestTableBuilder::new()
        .with_unnamed_column(ColumnType::Char, vec![Value::Char('\0')])
        .build();
    sanitize(&mut once);
    let mut twice = once.clone();
    sanitize(&mut twice);
    assert_eq!(once, twice);
}
