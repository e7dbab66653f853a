//! Unit tests for column conversion through the public API.

use crate::helpers::{TestTableBuilder, single_column, strings};
use tabledit::convert::ColumnConversionError;
use tabledit::{ColumnType, Value, convert};

fn sample_value(kind: ColumnType) -> Value {
    match kind {
        ColumnType::Byte => Value::Byte(7),
        ColumnType::Short => Value::Short(-300),
        ColumnType::Int => Value::Int(70_000),
        ColumnType::Long => Value::Long(5_000_000_000),
        ColumnType::Float => Value::Float(2.5),
        ColumnType::Double => Value::Double(-1.25),
        ColumnType::Char => Value::Char('q'),
        ColumnType::Boolean => Value::Boolean(true),
        ColumnType::String => Value::String("text".into()),
        ColumnType::Binary => Value::Binary(vec![0xde, 0xad]),
    }
}

#[test]
fn test_every_kind_converts_to_string() {
    for &kind in ColumnType::all() {
        let value = sample_value(kind);
        let expected = Value::String(value.to_string());
        let column = single_column(kind, vec![value]);

        let converted = convert(&column, 1, ColumnType::String)
            .unwrap_or_else(|e| panic!("{} -> string failed: {}", kind, e));
        assert_eq!(converted.get(0), expected, "{} -> string", kind);
    }
}

#[test]
fn test_nulls_survive_every_target() {
    for &source_kind in ColumnType::all() {
        let column = single_column(source_kind, vec![Value::Null, Value::Null]);
        for &target in ColumnType::all() {
            let converted = convert(&column, 2, target).unwrap();
            assert_eq!(converted.kind(), target);
            assert!(converted.is_nullable());
            assert!(converted.iter().all(|v| v.is_null()), "{} -> {}", source_kind, target);
        }
    }
}

#[test]
fn test_result_length_matches_row_count() {
    let column = single_column(ColumnType::String, strings(&["1", "2", "3", "4"]));
    for rows in 0..=4 {
        let converted = convert(&column, rows, ColumnType::Long).unwrap();
        assert_eq!(converted.len(), rows);
    }
}

#[test]
fn test_numeric_widening_and_narrowing() {
    let longs = single_column(ColumnType::Long, vec![Value::Long(120), Value::Long(-5)]);
    let bytes = convert(&longs, 2, ColumnType::Byte).unwrap();
    assert_eq!(bytes.get(0), Value::Byte(120));

    let too_big = single_column(ColumnType::Long, vec![Value::Long(1), Value::Long(40_000)]);
    let err = convert(&too_big, 2, ColumnType::Short).unwrap_err();
    assert_eq!(err.message, "Invalid short");
    assert_eq!(err.value, "40000");
    assert_eq!(err.row, 1);

    // Text of a double is not an integer
    let doubles = single_column(ColumnType::Double, vec![Value::Double(3.5)]);
    assert!(convert(&doubles, 1, ColumnType::Int).is_err());
    let floats = convert(&doubles, 1, ColumnType::Float).unwrap();
    assert_eq!(floats.get(0), Value::Float(3.5));
}

#[test]
fn test_float_targets_accept_non_finite_tokens() {
    let column = single_column(
        ColumnType::String,
        strings(&["inf", "-Infinity", "NaN", "+INF"]),
    );
    let doubles = convert(&column, 4, ColumnType::Double).unwrap();
    assert_eq!(doubles.get(0), Value::Double(f64::INFINITY));
    assert_eq!(doubles.get(1), Value::Double(f64::NEG_INFINITY));
    assert!(matches!(doubles.get(2), Value::Double(v) if v.is_nan()));
    assert_eq!(doubles.get(3), Value::Double(f64::INFINITY));

    // Printed back in the short form
    let text = convert(&doubles, 4, ColumnType::String).unwrap();
    assert_eq!(text.get(1), Value::String("-inf".into()));
    assert_eq!(text.get(2), Value::String("NaN".into()));

    let floats = convert(&column, 1, ColumnType::Float).unwrap();
    assert_eq!(floats.get(0), Value::Float(f32::INFINITY));

    // Integer targets have no such tokens
    assert!(convert(&column, 1, ColumnType::Long).is_err());
}

#[test]
fn test_first_failure_wins() {
    let column = single_column(ColumnType::String, strings(&["1", "x", "y"]));
    let err = convert(&column, 3, ColumnType::Int).unwrap_err();
    assert_eq!(err.row, 1);
    assert_eq!(err.value, "x");
}

#[test]
fn test_char_to_boolean_uses_tokens() {
    let column = single_column(ColumnType::Char, vec![Value::Char('Y'), Value::Char('0')]);
    let converted = convert(&column, 2, ColumnType::Boolean).unwrap();
    assert_eq!(converted.get(0), Value::Boolean(true));
    assert_eq!(converted.get(1), Value::Boolean(false));
}

#[test]
fn test_binary_to_numeric_parses_hex_text() {
    // Binary text form is hex, so only digit-only hex parses as a number
    let column = single_column(ColumnType::Binary, vec![Value::Binary(vec![0x12, 0x34])]);
    let converted = convert(&column, 1, ColumnType::Int).unwrap();
    assert_eq!(converted.get(0), Value::Int(1234));

    let column = single_column(ColumnType::Binary, vec![Value::Binary(vec![0xab])]);
    assert!(convert(&column, 1, ColumnType::Int).is_err());
}

#[test]
fn test_table_convert_column_keeps_other_columns() {
    let mut table = TestTableBuilder::new()
        .with_column("id", ColumnType::String, strings(&["1", "2"]))
        .with_column("flag", ColumnType::Boolean, vec![Value::Boolean(true), Value::Boolean(false)])
        .build();

    table.convert_column(1, ColumnType::Int).unwrap();
    assert_eq!(table.column(1).unwrap().kind(), ColumnType::Int);
    assert_eq!(table.get(0, 1), Some(Value::Int(1)));
    assert_eq!(table.column(0).unwrap().kind(), ColumnType::String);
    assert_eq!(table.column_names(), Some(vec!["id", "flag"]));
}

#[test]
fn test_table_convert_column_failure_leaves_table() {
    let mut table = TestTableBuilder::new()
        .with_column("n", ColumnType::String, strings(&["1", "two"]))
        .build();
    let before = table.clone();

    match table.convert_column(0, ColumnType::Long) {
        Err(ColumnConversionError::Conversion(e)) => {
            assert_eq!(e.to_string(), "Invalid long: 'two' at row 1")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(table, before);
}
