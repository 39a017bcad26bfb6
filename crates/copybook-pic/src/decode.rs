//! The fixed-width field walker.
//!
//! Records are newline-separated; within a record, fields sit at fixed
//! byte positions with no delimiters. The walker consumes the schema
//! depth-first, taking exactly `width` bytes per scalar occurrence, and
//! coerces each slice to its declared kind.
//!
//! Short records are tolerated: a field that runs past the end of the
//! record sees only the bytes that exist, so a blank or truncated line
//! decodes to zero values and coercion decides whether the content was
//! actually bad.

use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::schema::{FieldKind, FieldSchema, RecordSchema};
use crate::value::Value;

/// Decode a single record.
///
/// Only the first line of `input` is consumed. An empty input is an
/// [`DecodeError::UnexpectedEof`].
pub fn decode(input: &[u8], schema: &RecordSchema) -> Result<Value> {
    if input.is_empty() {
        return Err(DecodeError::UnexpectedEof);
    }
    let record = input.split(|&b| b == b'\n').next().unwrap_or(&[]);
    decode_record(record, schema)
}

/// Decode every record of a newline-separated stream, one value per
/// line.
///
/// A trailing newline produces no extra record; an empty line between
/// records decodes as a zero-valued row.
pub fn decode_lines(input: &[u8], schema: &RecordSchema) -> Result<Vec<Value>> {
    let mut records: Vec<&[u8]> = input.split(|&b| b == b'\n').collect();
    if matches!(records.last(), Some(r) if r.is_empty()) {
        records.pop();
    }
    debug!(schema = %schema.name, records = records.len(), "decoding fixed-width stream");

    records
        .into_iter()
        .map(|record| decode_record(record, schema))
        .collect()
}

fn decode_record(record: &[u8], schema: &RecordSchema) -> Result<Value> {
    let mut pos = 0;
    walk(record, &mut pos, &schema.fields)
}

fn walk(record: &[u8], pos: &mut usize, fields: &[FieldSchema]) -> Result<Value> {
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        out.push((field.name.clone(), decode_field(record, pos, field)?));
    }
    Ok(Value::Group(out))
}

fn decode_field(record: &[u8], pos: &mut usize, field: &FieldSchema) -> Result<Value> {
    if field.occurs > 0 {
        let items = (0..field.occurs)
            .map(|_| decode_occurrence(record, pos, field))
            .collect::<Result<Vec<Value>>>()?;
        return Ok(Value::Array(items));
    }
    decode_occurrence(record, pos, field)
}

fn decode_occurrence(record: &[u8], pos: &mut usize, field: &FieldSchema) -> Result<Value> {
    if field.kind == FieldKind::Group {
        return walk(record, pos, &field.fields);
    }
    let raw = take(record, pos, field.width);
    coerce(record, field, &String::from_utf8_lossy(raw))
}

/// Take the next `width` bytes, clamped to what the record still has.
fn take<'a>(record: &'a [u8], pos: &mut usize, width: usize) -> &'a [u8] {
    let start = (*pos).min(record.len());
    let end = (*pos + width).min(record.len());
    *pos += width;
    &record[start..end]
}

fn coerce(record: &[u8], field: &FieldSchema, raw: &str) -> Result<Value> {
    let conversion = |reason: String| DecodeError::Conversion {
        record: String::from_utf8_lossy(record).into_owned(),
        field: field.name.clone(),
        reason,
    };

    match field.kind {
        FieldKind::Str => Ok(Value::Str(raw.trim_end_matches(' ').to_string())),
        FieldKind::Uint => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::Uint(0));
            }
            trimmed
                .parse()
                .map(Value::Uint)
                .map_err(|e| conversion(format!("failed string->uint conversion: {e}")))
        }
        FieldKind::Int => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::Int(0));
            }
            trimmed
                .parse()
                .map(Value::Int)
                .map_err(|e| conversion(format!("failed string->int conversion: {e}")))
        }
        FieldKind::Float => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::Float(0.0));
            }
            trimmed
                .parse()
                .map(Value::Float)
                .map_err(|e| conversion(format!("failed string->float conversion: {e}")))
        }
        FieldKind::Group => unreachable!("groups are walked, not coerced"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schema::{FieldSchema, RecordSchema};

    fn basic() -> RecordSchema {
        RecordSchema::new(
            "basic",
            vec![
                FieldSchema::str("string", 5),
                FieldSchema::int("int", 5),
                FieldSchema::float("float", 5),
            ],
        )
    }

    fn row(string: &str, int: i64, float: f64) -> Value {
        Value::Group(vec![
            ("string".to_string(), Value::Str(string.to_string())),
            ("int".to_string(), Value::Int(int)),
            ("float".to_string(), Value::Float(float)),
        ])
    }

    #[test]
    fn test_decode_scalar_row() {
        let got = decode(b"foo  123  1.2  ", &basic()).unwrap();
        assert_eq!(got, row("foo", 123, 1.2));
    }

    #[test]
    fn test_decode_lines_without_trailing_newline() {
        let got = decode_lines(b"foo  123  1.2  \nbar  321  2.1  ", &basic()).unwrap();
        assert_eq!(got, vec![row("foo", 123, 1.2), row("bar", 321, 2.1)]);
    }

    #[test]
    fn test_decode_lines_with_trailing_newline() {
        let got = decode_lines(b"foo  123  1.2  \nbar  321  2.1  \n", &basic()).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_decode_lines_blank_line_mid_stream() {
        let got = decode_lines(b"foo  123  1.2  \n\nbar  321  2.1  \n", &basic()).unwrap();
        assert_eq!(
            got,
            vec![row("foo", 123, 1.2), row("", 0, 0.0), row("bar", 321, 2.1)]
        );
    }

    #[test]
    fn test_decode_conversion_error_is_annotated() {
        let err = decode(b"foo  nan  ddd  ", &basic()).unwrap_err();
        match err {
            DecodeError::Conversion { record, field, .. } => {
                assert_eq!(record, "foo  nan  ddd  ");
                assert_eq!(field, "int");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_input_is_eof() {
        assert!(matches!(
            decode(b"", &basic()),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_lines_empty_input() {
        assert_eq!(decode_lines(b"", &basic()).unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn test_decode_width_one_field() {
        let schema = RecordSchema::new("f1", vec![FieldSchema::str("f1", 1)]);
        let got = decode(b"v", &schema).unwrap();
        assert_eq!(got.get("f1").and_then(Value::as_str), Some("v"));
    }

    #[test]
    fn test_decode_occurs_offsets() {
        // Seventeen 13-wide columns, a 2-wide column, then a 13-wide
        // occurs tail; repetition must not shift later positions.
        let schema = RecordSchema::new(
            "offsets",
            vec![
                FieldSchema::str("a", 13),
                FieldSchema::str("b", 13),
                FieldSchema::str("g", 2),
                FieldSchema::str("h", 13).occurs(2),
            ],
        );
        let got = decode(
            b"000000000.01 000000000.02 XX000000000.03 000000000.04 ",
            &schema,
        )
        .unwrap();
        assert_eq!(got.get("a").and_then(Value::as_str), Some("000000000.01"));
        assert_eq!(got.get("b").and_then(Value::as_str), Some("000000000.02"));
        assert_eq!(got.get("g").and_then(Value::as_str), Some("XX"));
        assert_eq!(
            got.get("h").unwrap(),
            &Value::Array(vec![
                Value::Str("000000000.03".to_string()),
                Value::Str("000000000.04".to_string()),
            ])
        );
    }

    #[test]
    fn test_decode_int_occurs() {
        let schema = RecordSchema::new(
            "occ",
            vec![
                FieldSchema::str("string", 5),
                FieldSchema::int("int", 5),
                FieldSchema::int("int_occurs", 2).occurs(3),
            ],
        );
        let got = decode(b"foo  123  123456", &schema).unwrap();
        assert_eq!(
            got.get("int_occurs").unwrap(),
            &Value::Array(vec![Value::Int(12), Value::Int(34), Value::Int(56)])
        );
    }

    #[test]
    fn test_decode_nested_group() {
        let schema = RecordSchema::new(
            "nested",
            vec![
                FieldSchema::str("a", 13),
                FieldSchema::str("b", 13),
                FieldSchema::group("c", vec![FieldSchema::str("ca", 1).occurs(5)]),
            ],
        );
        let got = decode(b"thirteen13131thirteen13131ABCDE", &schema).unwrap();
        assert_eq!(
            got.get("c").unwrap().get("ca").unwrap(),
            &Value::Array(
                ["A", "B", "C", "D", "E"]
                    .iter()
                    .map(|s| Value::Str(s.to_string()))
                    .collect()
            )
        );
    }

    #[test]
    fn test_decode_multi_nested_group() {
        let schema = RecordSchema::new(
            "nested",
            vec![
                FieldSchema::str("a", 13),
                FieldSchema::str("b", 13),
                FieldSchema::group(
                    "c",
                    vec![
                        FieldSchema::str("ca", 1).occurs(5),
                        FieldSchema::group("cb", vec![FieldSchema::str("da", 2)]),
                    ],
                ),
            ],
        );
        let got = decode(b"thirteen13131thirteen13131ABCDEAA", &schema).unwrap();
        let c = got.get("c").unwrap();
        assert_eq!(c.get("ca").unwrap().as_array().unwrap().len(), 5);
        assert_eq!(
            c.get("cb").unwrap().get("da").and_then(Value::as_str),
            Some("AA")
        );
    }

    #[test]
    fn test_decode_occurs_of_group() {
        let dummy = FieldSchema::group(
            "dummy",
            vec![FieldSchema::int("a", 1), FieldSchema::int("b", 1)],
        );
        let schema = RecordSchema::new(
            "occ",
            vec![
                FieldSchema::str("string", 5),
                FieldSchema::int("int", 5),
                dummy.occurs(3),
            ],
        );
        let got = decode(b"foo  123  123456", &schema).unwrap();

        let pair = |a: i64, b: i64| {
            Value::Group(vec![
                ("a".to_string(), Value::Int(a)),
                ("b".to_string(), Value::Int(b)),
            ])
        };
        assert_eq!(
            got.get("dummy").unwrap(),
            &Value::Array(vec![pair(1, 2), pair(3, 4), pair(5, 6)])
        );
    }

    #[test]
    fn test_decode_short_record_blank_tail() {
        let got = decode(b"foo", &basic()).unwrap();
        assert_eq!(got, row("foo", 0, 0.0));
    }

    #[test]
    fn test_decode_uint_field() {
        let schema = RecordSchema::new("u", vec![FieldSchema::uint("n", 7)]);
        let got = decode(b"0001234", &schema).unwrap();
        assert_eq!(got.get("n").and_then(Value::as_uint), Some(1234));
    }
}
