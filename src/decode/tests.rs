//! Tests for decode module

use super::*;
use crate::error::ErrorKind;
use crate::schema::{ColumnDef, SchemaRegistry, SemanticType, TableSchema};
use arrow::array::{Array, Date32Array, Decimal128Array, Int32Array, Int64Array, StringArray};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use test_case::test_case;

fn customer_line() -> &'static str {
    "1|Alice|123 Main St|5|555-1234|1500.75|BUILDING|some comment|"
}

fn read_all(input: &str, arity: usize, chunk_size: usize) -> crate::Result<Vec<Vec<RawRecord>>> {
    DelimitedReader::new(Cursor::new(input.to_string()), "test.tbl", arity, chunk_size).collect()
}

// ============================================================================
// Reader Tests
// ============================================================================

#[test]
fn test_reader_splits_fields_with_trailing_field() {
    let chunks = read_all(customer_line(), 9, 10).unwrap();
    assert_eq!(chunks.len(), 1);

    let record = &chunks[0][0];
    assert_eq!(record.len(), 9);
    assert_eq!(record.line(), 1);
    assert_eq!(record.get(0), Some("1"));
    assert_eq!(record.get(5), Some("1500.75"));
    assert_eq!(record.get(8), Some(""));
}

#[test]
fn test_reader_chunk_sizes() {
    let input = "1|a|\n2|b|\n3|c|\n4|d|\n5|e|\n";
    let chunks = read_all(input, 3, 2).unwrap();

    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(chunks[2][0].get(1), Some("e"));
    assert_eq!(chunks[2][0].line(), 5);
}

#[test]
fn test_reader_exact_multiple_has_no_empty_chunk() {
    let input = "1|a|\n2|b|\n3|c|\n4|d|\n";
    let chunks = read_all(input, 3, 2).unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| !c.is_empty()));
}

#[test]
fn test_reader_empty_input() {
    let chunks = read_all("", 3, 2).unwrap();
    assert!(chunks.is_empty());
}

#[test]
fn test_reader_keeps_quotes_literally() {
    let chunks = read_all("1|\"quoted, text\"|\n", 3, 10).unwrap();
    assert_eq!(chunks[0][0].get(1), Some("\"quoted, text\""));
}

#[test]
fn test_reader_handles_crlf() {
    let chunks = read_all("1|a|\r\n2|b|\r\n", 3, 10).unwrap();
    assert_eq!(chunks[0].len(), 2);
    assert_eq!(chunks[0][1].get(1), Some("b"));
}

#[test]
fn test_reader_malformed_record() {
    let input = "1|a|\n2|b|extra|\n3|c|\n";
    let mut reader = DelimitedReader::new(Cursor::new(input.to_string()), "t.tbl", 3, 10);

    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    assert!(err.to_string().contains("line 2"));
    assert!(err.to_string().contains("expected 3 fields, found 4"));

    // The reader stops after a failure
    assert!(reader.next().is_none());
}

#[test]
fn test_reader_trailing_field_is_optional() {
    let chunks = read_all("1|a\n2|b|\n", 3, 10).unwrap();
    assert_eq!(chunks[0].len(), 2);
    assert_eq!(chunks[0][0].len(), 2);
    assert_eq!(chunks[0][0].get(1), Some("a"));
    assert_eq!(chunks[0][1].len(), 3);
}

#[test]
fn test_reader_too_few_fields_is_malformed() {
    let err = read_all("1|a|\n2\n", 3, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    assert!(err.to_string().contains("line 2"));
    assert!(err.to_string().contains("found 1"));
}

#[test]
fn test_reader_invalid_utf8_is_source_error() {
    let bytes: Vec<u8> = vec![b'1', b'|', 0xff, 0xfe, b'|', b'\n'];
    let mut reader = DelimitedReader::new(Cursor::new(bytes), "bad.tbl", 3, 10);
    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceIo);
    assert!(err.to_string().contains("bad.tbl"));
}

#[test]
fn test_reader_custom_delimiter() {
    let reader =
        DelimitedReader::new(Cursor::new("1,a,\n".to_string()), "t.csv", 3, 10).with_delimiter(b',');
    let chunks: Vec<_> = reader.collect::<crate::Result<_>>().unwrap();
    assert_eq!(chunks[0][0].get(1), Some("a"));
}

#[test]
fn test_table_source_restarts_from_beginning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region.tbl");
    std::fs::write(&path, "0|AFRICA|x|\n1|AMERICA|y|\n2|ASIA|z|\n").unwrap();

    let source = TableSource::new(&path);
    let first: Vec<_> = source.chunks(4, 2).unwrap().collect::<crate::Result<_>>().unwrap();
    let second: Vec<_> = source.chunks(4, 2).unwrap().collect::<crate::Result<_>>().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_table_source_missing_file() {
    let source = TableSource::new("/definitely/not/here.tbl");
    let err = source.chunks(4, 2).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::SourceIo);
}

// ============================================================================
// Coercer Tests
// ============================================================================

#[test_case("42", 42 ; "plain")]
#[test_case("-7", -7 ; "negative")]
#[test_case("+15", 15 ; "explicit plus")]
#[test_case("2147483647", i32::MAX ; "max")]
fn test_coerce_int32(raw: &str, expected: i32) {
    let coercer = Coercer::default();
    assert_eq!(
        coercer.coerce(raw, SemanticType::Int32).unwrap(),
        TypedValue::Int32(expected)
    );
}

#[test_case("" ; "empty")]
#[test_case("abc" ; "letters")]
#[test_case("1.5" ; "fraction")]
#[test_case("2147483648" ; "overflow")]
#[test_case(" 1" ; "leading space")]
fn test_coerce_int32_rejects(raw: &str) {
    let err = Coercer::default()
        .coerce(raw, SemanticType::Int32)
        .unwrap_err();
    assert!(matches!(err, CoercionError::IntegerParse { .. }));
}

#[test]
fn test_coerce_int64_wide_value() {
    let value = Coercer::default()
        .coerce("6000000000", SemanticType::Int64)
        .unwrap();
    assert_eq!(value, TypedValue::Int64(6_000_000_000));
}

#[test]
fn test_coerce_string_is_identity() {
    let coercer = Coercer::default();
    assert_eq!(
        coercer.coerce("  padded ", SemanticType::Utf8String).unwrap(),
        TypedValue::Utf8("  padded ")
    );
    assert_eq!(
        coercer.coerce("", SemanticType::Utf8String).unwrap(),
        TypedValue::Utf8("")
    );
}

#[test_case("1970-01-01", 0 ; "epoch")]
#[test_case("1969-12-31", -1 ; "before epoch")]
#[test_case("1995-03-15", 9204 ; "tpch date")]
#[test_case("1998-12-01", 10561 ; "late date")]
fn test_coerce_date(raw: &str, expected: i32) {
    assert_eq!(
        Coercer::default().coerce(raw, SemanticType::Date).unwrap(),
        TypedValue::Date(expected)
    );
}

#[test_case("" ; "empty")]
#[test_case("1995-13-01" ; "bad month")]
#[test_case("1995-02-30" ; "bad day")]
#[test_case("15/03/1995" ; "wrong layout")]
fn test_coerce_date_rejects(raw: &str) {
    let err = Coercer::default().coerce(raw, SemanticType::Date).unwrap_err();
    assert!(matches!(err, CoercionError::DateParse { .. }));
    assert!(err.to_string().contains("%Y-%m-%d"));
}

#[test]
fn test_coerce_date_custom_format() {
    let coercer = Coercer::new("%d/%m/%Y");
    assert_eq!(
        coercer.coerce("15/03/1995", SemanticType::Date).unwrap(),
        TypedValue::Date(9204)
    );
}

#[test_case("1500.75", Some(150_075) ; "two decimals")]
#[test_case("1500.7", Some(150_070) ; "one decimal")]
#[test_case("1500", Some(150_000) ; "integer")]
#[test_case("-999.99", Some(-99_999) ; "negative")]
#[test_case("+3.10", Some(310) ; "explicit plus")]
#[test_case(".5", Some(50) ; "no integer digits")]
#[test_case("7.", Some(700) ; "no fraction digits")]
#[test_case("0.10000", Some(10) ; "trailing zeros")]
#[test_case("0000012.34", Some(1234) ; "leading zeros")]
#[test_case("9999999999999.99", Some(999_999_999_999_999) ; "max precision")]
#[test_case("", None ; "empty is null")]
fn test_parse_decimal(raw: &str, expected: Option<i128>) {
    assert_eq!(parse_decimal(raw, 15, 2).unwrap(), expected);
}

#[test_case("abc" ; "letters")]
#[test_case("1.2.3" ; "two points")]
#[test_case("-" ; "sign only")]
#[test_case("." ; "point only")]
#[test_case("1e5" ; "exponent")]
#[test_case("1.234" ; "too many fraction digits")]
#[test_case("10000000000000.00" ; "exceeds precision")]
#[test_case("NaN" ; "nan")]
#[test_case(" 1.00" ; "leading space")]
fn test_parse_decimal_rejects(raw: &str) {
    let err = parse_decimal(raw, 15, 2).unwrap_err();
    assert!(matches!(err, CoercionError::DecimalParse { .. }));
}

#[test]
fn test_parse_decimal_is_exact_where_floats_are_not() {
    // 0.1 + 0.2 style values must survive untouched
    assert_eq!(parse_decimal("0.29", 15, 2).unwrap(), Some(29));
    assert_eq!(parse_decimal("1234567890123.45", 15, 2).unwrap(), Some(123_456_789_012_345));
    assert_eq!(parse_decimal("-0.01", 15, 2).unwrap(), Some(-1));
}

#[test]
fn test_parse_decimal_wide_precision() {
    let raw = "999999999999999999999999999999999999.99";
    assert_eq!(
        parse_decimal(raw, 38, 2).unwrap(),
        Some(99_999_999_999_999_999_999_999_999_999_999_999_999)
    );
    assert!(parse_decimal("1000000000000000000000000000000000000.00", 38, 2).is_err());
}

#[test]
fn test_parse_decimal_precision_beyond_i128_is_error() {
    let err = parse_decimal("1", 39, 2).unwrap_err();
    assert!(matches!(err, CoercionError::DecimalParse { .. }));
    assert!(err.to_string().contains("precision 39"));
    assert!(parse_decimal("1", u8::MAX, 0).is_err());
}

#[test]
fn test_coerce_unvalidated_wide_decimal_is_error() {
    let wide = SemanticType::FixedDecimal {
        precision: 40,
        scale: 2,
    };
    let err = Coercer::default().coerce("1.00", wide).unwrap_err();
    assert!(matches!(err, CoercionError::DecimalParse { .. }));
}

#[test]
fn test_coerce_decimal_carries_scale() {
    let value = Coercer::default()
        .coerce("12.5", SemanticType::decimal())
        .unwrap();
    assert_eq!(
        value,
        TypedValue::Decimal {
            value: Some(1250),
            scale: 2
        }
    );
}

#[test]
fn test_parse_date_direct() {
    assert_eq!(parse_date("1992-01-02", DEFAULT_DATE_FORMAT).unwrap(), 8036);
}

// ============================================================================
// ChunkBuilder Tests
// ============================================================================

fn customer_schema() -> TableSchema {
    SchemaRegistry::tpch().unwrap().get("customer").unwrap().clone()
}

#[test]
fn test_build_customer_batch() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let records = read_all(customer_line(), schema.raw_arity(), 10).unwrap();

    let batch = builder.build(0, &records[0]).unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 8);
    assert_eq!(batch.schema(), schema.arrow_schema());

    let custkey = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(custkey.value(0), 1);

    let nationkey = batch
        .column(3)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(nationkey.value(0), 5);

    let acctbal = batch
        .column(5)
        .as_any()
        .downcast_ref::<Decimal128Array>()
        .unwrap();
    assert_eq!(acctbal.value(0), 150_075);
    assert_eq!(acctbal.value_as_string(0), "1500.75");

    let comment = batch
        .column(7)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(comment.value(0), "some comment");
}

#[test]
fn test_build_empty_decimal_is_null() {
    let registry = SchemaRegistry::tpch().unwrap();
    let schema = registry.get("partsupp").unwrap();
    let builder = ChunkBuilder::new(schema, Coercer::default());
    let records = vec![
        RawRecord::from_fields(1, ["1", "2", "3", "", "no cost", ""]),
        RawRecord::from_fields(2, ["1", "3", "4", "0.00", "zero cost", ""]),
    ];

    let batch = builder.build(0, &records).unwrap();
    let cost = batch
        .column(3)
        .as_any()
        .downcast_ref::<Decimal128Array>()
        .unwrap();

    assert!(cost.is_null(0));
    assert!(!cost.is_null(1));
    assert_eq!(cost.value(1), 0);
}

#[test]
fn test_build_empty_string_stays_empty() {
    let registry = SchemaRegistry::tpch().unwrap();
    let schema = registry.get("region").unwrap();
    let builder = ChunkBuilder::new(schema, Coercer::default());
    let records = vec![RawRecord::from_fields(1, ["0", "AFRICA", "", ""])];

    let batch = builder.build(0, &records).unwrap();
    let comment = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(!comment.is_null(0));
    assert_eq!(comment.value(0), "");
}

#[test]
fn test_build_dates_and_int64() {
    let schema = TableSchema::new(
        "events",
        vec![
            ColumnDef::new("id", SemanticType::Int64),
            ColumnDef::new("day", SemanticType::Date),
        ],
    )
    .unwrap();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let records = vec![RawRecord::from_fields(1, ["6000000000", "1995-03-15", ""])];

    let batch = builder.build(0, &records).unwrap();
    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    let days = batch
        .column(1)
        .as_any()
        .downcast_ref::<Date32Array>()
        .unwrap();
    assert_eq!(ids.value(0), 6_000_000_000);
    assert_eq!(days.value(0), 9204);
}

#[test]
fn test_build_nullable_integer_and_date() {
    let schema = TableSchema::new(
        "events",
        vec![
            ColumnDef::new("id", SemanticType::Int32).with_nullable(true),
            ColumnDef::new("day", SemanticType::Date).with_nullable(true),
        ],
    )
    .unwrap();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let batch = builder
        .build(0, &[RawRecord::from_fields(1, ["", "", ""])])
        .unwrap();

    assert!(batch.column(0).is_null(0));
    assert!(batch.column(1).is_null(0));
}

#[test]
fn test_build_non_nullable_decimal_rejects_empty() {
    let schema = TableSchema::new(
        "prices",
        vec![ColumnDef::new("price", SemanticType::decimal()).with_nullable(false)],
    )
    .unwrap();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let err = builder
        .build(0, &[RawRecord::from_fields(1, ["", ""])])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecimalParse);
}

#[test]
fn test_build_failure_aborts_chunk_with_context() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let records = vec![
        RawRecord::from_fields(11, ["1", "A", "x", "5", "p", "1.00", "s", "c", ""]),
        RawRecord::from_fields(12, ["2", "B", "y", "5", "p", "12x", "s", "c", ""]),
    ];

    let err = builder.build(3, &records).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecimalParse);

    match err {
        crate::Error::Coercion {
            chunk,
            record,
            line,
            column,
            value,
            ..
        } => {
            assert_eq!(chunk, 3);
            assert_eq!(record, 1);
            assert_eq!(line, 12);
            assert_eq!(column, "c_acctbal");
            assert_eq!(value, "12x");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_build_non_numeric_integer() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let records = vec![RawRecord::from_fields(
        1,
        ["one", "A", "x", "5", "p", "1.00", "s", "c", ""],
    )];

    let err = builder.build(0, &records).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegerParse);
    assert!(err.to_string().contains("c_custkey"));
}

#[test]
fn test_build_customer_line_without_trailing_delimiter() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let line = "1|Alice|123 Main St|5|555-1234|1500.75|BUILDING|some comment";
    let records = read_all(line, schema.raw_arity(), 10).unwrap();

    let batch = builder.build(0, &records[0]).unwrap();
    assert_eq!(batch.num_rows(), 1);

    let custkey = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(custkey.value(0), 1);

    let nationkey = batch
        .column(3)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(nationkey.value(0), 5);

    let acctbal = batch
        .column(5)
        .as_any()
        .downcast_ref::<Decimal128Array>()
        .unwrap();
    assert_eq!(acctbal.value(0), 150_075);

    let comment = batch
        .column(7)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(comment.value(0), "some comment");
}

#[test]
fn test_build_rejects_wrong_arity() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let records = vec![RawRecord::from_fields(4, ["1", "A"])];

    let err = builder.build(0, &records).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
}

#[test]
fn test_build_empty_chunk() {
    let schema = customer_schema();
    let builder = ChunkBuilder::new(&schema, Coercer::default());
    let batch = builder.build(0, &[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 8);
}
