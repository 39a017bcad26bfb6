//! Decode schemas.
//!
//! A [`RecordSchema`] is the caller's declaration of a fixed-width
//! record: an ordered list of named fields, each a scalar of some width,
//! a group of further fields, or a repetition of either. The decoder
//! walks it depth-first, consuming exactly the declared widths.
//!
//! Widths travel in a tiny textual grammar shared with generated code:
//! `w` for a scalar of width `w`, `w,k` for `k` elements of width `w`
//! each. [`FieldWidth`] parses and prints that form.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DecodeError;

/// Scalar coercion applied to a field's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Text; trailing spaces are trimmed.
    Str,
    /// Unsigned integer.
    Uint,
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// A group of subordinate fields.
    Group,
}

/// One field of a decode schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// Field name, used in decoded values and error annotations.
    pub name: String,
    /// Coercion kind; [`FieldKind::Group`] for nested fields.
    pub kind: FieldKind,
    /// Width of one occurrence in bytes. For groups this is derived
    /// from the children.
    pub width: usize,
    /// Repetition count; 0 means the field is not an array.
    pub occurs: usize,
    /// Subordinate fields, for groups.
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    /// A text field of `width` bytes.
    pub fn str(name: &str, width: usize) -> Self {
        Self::scalar(name, FieldKind::Str, width)
    }

    /// An unsigned integer field of `width` bytes.
    pub fn uint(name: &str, width: usize) -> Self {
        Self::scalar(name, FieldKind::Uint, width)
    }

    /// A signed integer field of `width` bytes.
    pub fn int(name: &str, width: usize) -> Self {
        Self::scalar(name, FieldKind::Int, width)
    }

    /// A floating-point field of `width` bytes.
    pub fn float(name: &str, width: usize) -> Self {
        Self::scalar(name, FieldKind::Float, width)
    }

    fn scalar(name: &str, kind: FieldKind, width: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            width,
            occurs: 0,
            fields: Vec::new(),
        }
    }

    /// A group of subordinate fields. The width is the sum of the
    /// children's effective widths.
    pub fn group(name: &str, fields: Vec<FieldSchema>) -> Self {
        let width = fields.iter().map(FieldSchema::effective_width).sum();
        Self {
            name: name.to_string(),
            kind: FieldKind::Group,
            width,
            occurs: 0,
            fields,
        }
    }

    /// Repeat this field `count` times.
    pub fn occurs(mut self, count: usize) -> Self {
        self.occurs = count;
        self
    }

    /// Bytes one pass over this field consumes, repetition included.
    pub fn effective_width(&self) -> usize {
        self.width * self.occurs.max(1)
    }

    /// This field's width annotation.
    pub fn tag(&self) -> FieldWidth {
        FieldWidth {
            width: self.width,
            count: (self.occurs > 0).then_some(self.occurs),
        }
    }
}

/// A whole-record schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSchema {
    /// Record name, for diagnostics.
    pub name: String,
    /// The record's fields in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Create a record schema.
    pub fn new(name: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    /// Total bytes one record occupies.
    pub fn width(&self) -> usize {
        self.fields.iter().map(FieldSchema::effective_width).sum()
    }
}

/// A parsed width annotation: `w` or `w,k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldWidth {
    /// Width of one occurrence in bytes.
    pub width: usize,
    /// Element count, when the annotation declares an array.
    pub count: Option<usize>,
}

impl FromStr for FieldWidth {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::InvalidWidth {
            tag: tag.to_string(),
        };

        let mut parts = tag.split(',');
        let width = parts
            .next()
            .and_then(|w| w.trim().parse().ok())
            .ok_or_else(invalid)?;
        let count = match parts.next() {
            Some(c) => Some(c.trim().parse().map_err(|_| invalid())?),
            None => None,
        };
        if parts.next().is_some() || count == Some(0) {
            return Err(invalid());
        }
        Ok(Self { width, count })
    }
}

impl fmt::Display for FieldWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{},{}", self.width, count),
            None => write!(f, "{}", self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_widths() {
        assert_eq!(FieldSchema::str("a", 13).effective_width(), 13);
        assert_eq!(FieldSchema::str("a", 13).occurs(12).effective_width(), 156);
    }

    #[test]
    fn test_group_width_derives_from_children() {
        let g = FieldSchema::group(
            "g",
            vec![FieldSchema::uint("a", 1), FieldSchema::uint("b", 1)],
        );
        assert_eq!(g.width, 2);
        assert_eq!(g.occurs(3).effective_width(), 6);
    }

    #[test]
    fn test_record_width() {
        let schema = RecordSchema::new(
            "row",
            vec![
                FieldSchema::str("s", 5),
                FieldSchema::int("i", 5),
                FieldSchema::float("f", 5),
            ],
        );
        assert_eq!(schema.width(), 15);
    }

    #[test]
    fn test_width_tag_parse() {
        assert_eq!(
            "13".parse::<FieldWidth>().unwrap(),
            FieldWidth {
                width: 13,
                count: None
            }
        );
        assert_eq!(
            "13,12".parse::<FieldWidth>().unwrap(),
            FieldWidth {
                width: 13,
                count: Some(12)
            }
        );
    }

    #[test]
    fn test_width_tag_rejects_garbage() {
        for tag in ["", "w", "13,", "13,0", "13,12,1"] {
            assert!(tag.parse::<FieldWidth>().is_err(), "tag {tag:?}");
        }
    }

    #[test]
    fn test_width_tag_roundtrip() {
        for tag in ["5", "13,12"] {
            assert_eq!(tag.parse::<FieldWidth>().unwrap().to_string(), tag);
        }
    }

    #[test]
    fn test_field_tag() {
        assert_eq!(FieldSchema::str("a", 5).tag().to_string(), "5");
        assert_eq!(FieldSchema::uint("a", 2).occurs(3).tag().to_string(), "2,3");
    }
}
