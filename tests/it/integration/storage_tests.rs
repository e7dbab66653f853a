//! Store round trips through real files.

use crate::helpers::{TestTableBuilder, strings, write_fixture};
use tabledit::data::{DataError, FsTableStore, TableStore};
use tabledit::{ColumnType, FileDescriptor, Table, Value};
use tempfile::tempdir;

fn every_kind() -> Table {
    TestTableBuilder::new()
        .with_column("byte", ColumnType::Byte, vec![Value::Byte(-8), Value::Byte(127)])
        .with_column("short", ColumnType::Short, vec![Value::Short(300), Value::Short(0)])
        .with_nullable_column("int", ColumnType::Int, vec![Value::Null, Value::Int(9)])
        .with_column("long", ColumnType::Long, vec![Value::Long(i64::MAX), Value::Long(-1)])
        .with_column("float", ColumnType::Float, vec![Value::Float(0.5), Value::Float(-2.0)])
        .with_column("double", ColumnType::Double, vec![Value::Double(1e-3), Value::Double(7.25)])
        .with_column("char", ColumnType::Char, vec![Value::Char('x'), Value::Char('ü')])
        .with_nullable_column("bool", ColumnType::Boolean, vec![Value::Boolean(true), Value::Null])
        .with_column("text", ColumnType::String, strings(&["a \"quote\"", ""]))
        .with_column("bin", ColumnType::Binary, vec![Value::Binary(vec![0, 255]), Value::Binary(vec![])])
        .build()
}

#[test]
fn test_native_round_trip_every_kind() {
    let dir = tempdir().unwrap();
    let file = FileDescriptor::native(dir.path().join("all.tbl"));
    let store = FsTableStore::default();
    let table = every_kind();

    store.write(&file, &table).unwrap();
    assert!(store.exists(&file));
    assert_eq!(store.read(&file).unwrap(), table);
}

#[test]
fn test_native_overwrite_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.tbl");
    let store = FsTableStore::default();

    store.write_native(&path, &every_kind()).unwrap();
    store.write_native(&path, &Table::empty()).unwrap();

    assert_eq!(store.read_native(&path).unwrap(), Table::empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_native_rejects_invalid_tables() {
    let dir = tempdir().unwrap();
    let store = FsTableStore::default();

    // Lengths disagree with the declared row count
    let path = write_fixture(
        dir.path(),
        "short.tbl",
        r#"{"columns":[{"name":"a","nullable":true,"data":{"Int":[1]}}],"row_count":3}"#,
    );
    assert!(matches!(
        store.read_native(&path),
        Err(DataError::ColumnLengthMismatch { index: 0, len: 1, expected: 3 })
    ));

    // Null inside a non-nullable column
    let path = write_fixture(
        dir.path(),
        "null.tbl",
        r#"{"columns":[{"name":"a","nullable":false,"data":{"Int":[null]}}],"row_count":1}"#,
    );
    assert!(matches!(
        store.read_native(&path),
        Err(DataError::NullInNonNullable { index: 0, row: 0 })
    ));

    // Some columns named, some not
    let path = write_fixture(
        dir.path(),
        "mixed.tbl",
        r#"{"columns":[{"name":"a","nullable":true,"data":{"Int":[1]}},{"name":null,"nullable":true,"data":{"Int":[2]}}],"row_count":1}"#,
    );
    assert!(matches!(store.read_native(&path), Err(DataError::MixedColumnNames)));
}

#[test]
fn test_delimited_round_trip_through_descriptor() {
    let dir = tempdir().unwrap();
    let file = FileDescriptor::from_path(dir.path().join("out.tsv"));
    let store = FsTableStore::default();

    let table = TestTableBuilder::new()
        .with_column("id", ColumnType::Long, vec![Value::Long(1), Value::Long(2)])
        .with_nullable_column("note", ColumnType::String, vec![Value::String("tab\there".into()), Value::Null])
        .with_column("ok", ColumnType::Boolean, vec![Value::Boolean(true), Value::Boolean(false)])
        .build();

    store.write(&file, &table).unwrap();
    let back = store.read(&file).unwrap();

    assert_eq!(back.column_names(), Some(vec!["id", "note", "ok"]));
    assert_eq!(back.get(0, 0), Some(Value::Long(1)));
    assert_eq!(back.get(0, 1), Some(Value::String("tab\there".into())));
    assert_eq!(back.get(1, 1), Some(Value::Null));
    assert_eq!(back.get(1, 2), Some(Value::Boolean(false)));
}

#[test]
fn test_headerless_write_of_unnamed_table() {
    let dir = tempdir().unwrap();
    let file = FileDescriptor::delimited(dir.path().join("raw.txt"), false, ';');
    let store = FsTableStore::default();

    let table = TestTableBuilder::new()
        .with_unnamed_column(ColumnType::Long, vec![Value::Long(5)])
        .with_unnamed_column(ColumnType::String, strings(&["a;b"]))
        .build();
    store.write(&file, &table).unwrap();

    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "5;\"a;b\"\n");
    let back = store.read(&file).unwrap();
    assert_eq!(back.column_names(), None);
    assert_eq!(back.get(0, 1), Some(Value::String("a;b".into())));
}

#[test]
fn test_header_only_file_has_no_rows() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "header.csv", "a,b\n");
    let table = FsTableStore::default()
        .read(&FileDescriptor::from_path(path))
        .unwrap();
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.column_names(), Some(vec!["a", "b"]));
}

#[test]
fn test_empty_file_is_error() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "empty.csv", "\n\n");
    let result = FsTableStore::default().read(&FileDescriptor::from_path(path));
    assert!(matches!(result, Err(DataError::EmptyFile)));
}

#[test]
fn test_native_round_trip_non_finite_floats() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("special.tbl");
    let store = FsTableStore::default();

    // Values typed in as text, then retyped
    let mut table = TestTableBuilder::new()
        .with_column("d", ColumnType::String, strings(&["NaN", "inf", "-inf"]))
        .with_column("f", ColumnType::String, strings(&["-inf", "NaN", "0.25"]))
        .with_nullable_column("n", ColumnType::String, vec![Value::String("inf".into()), Value::Null, Value::String("NaN".into())])
        .build();
    table.convert_column(0, ColumnType::Double).unwrap();
    table.convert_column(1, ColumnType::Float).unwrap();
    table.convert_column(2, ColumnType::Double).unwrap();

    store.write_native(&path, &table).unwrap();
    let back = store.read_native(&path).unwrap();

    assert!(matches!(back.get(0, 0), Some(Value::Double(v)) if v.is_nan()));
    assert_eq!(back.get(1, 0), Some(Value::Double(f64::INFINITY)));
    assert_eq!(back.get(2, 0), Some(Value::Double(f64::NEG_INFINITY)));
    assert_eq!(back.get(0, 1), Some(Value::Float(f32::NEG_INFINITY)));
    assert!(matches!(back.get(1, 1), Some(Value::Float(v)) if v.is_nan()));
    assert_eq!(back.get(2, 1), Some(Value::Float(0.25)));

    // Nullable column keeps its values and its one real null
    assert_eq!(back.get(0, 2), Some(Value::Double(f64::INFINITY)));
    assert_eq!(back.get(1, 2), Some(Value::Null));
    assert!(matches!(back.get(2, 2), Some(Value::Double(v)) if v.is_nan()));
}

#[test]
fn test_delimited_round_trip_non_finite_doubles() {
    let dir = tempdir().unwrap();
    let file = FileDescriptor::from_path(dir.path().join("special.csv"));
    let store = FsTableStore::default();

    let table = TestTableBuilder::new()
        .with_column(
            "x",
            ColumnType::Double,
            vec![Value::Double(f64::INFINITY), Value::Double(f64::NAN), Value::Double(-1.5)],
        )
        .build();
    store.write(&file, &table).unwrap();

    let back = store.read(&file).unwrap();
    assert_eq!(back.column(0).unwrap().kind(), ColumnType::Double);
    assert_eq!(back.get(0, 0), Some(Value::Double(f64::INFINITY)));
    assert!(matches!(back.get(1, 0), Some(Value::Double(v)) if v.is_nan()));
    assert_eq!(back.get(2, 0), Some(Value::Double(-1.5)));
}

#[test]
fn test_delimited_round_trip_embedded_newlines() {
    let dir = tempdir().unwrap();
    let file = FileDescriptor::from_path(dir.path().join("notes.csv"));
    let store = FsTableStore::default();

    let table = TestTableBuilder::new()
        .with_column("id", ColumnType::Long, vec![Value::Long(1), Value::Long(2), Value::Long(3)])
        .with_nullable_column(
            "note",
            ColumnType::String,
            vec![
                Value::String("line1\nline2".into()),
                Value::String("cr\r\nlf, \"quoted\"".into()),
                Value::Null,
            ],
        )
        .build();
    store.write(&file, &table).unwrap();

    let back = store.read(&file).unwrap();
    assert_eq!(back.row_count(), 3);
    assert_eq!(back.get(0, 1), Some(Value::String("line1\nline2".into())));
    assert_eq!(back.get(1, 1), Some(Value::String("cr\r\nlf, \"quoted\"".into())));
    assert_eq!(back.get(2, 1), Some(Value::Null));
    assert_eq!(back.get(2, 0), Some(Value::Long(3)));
}
