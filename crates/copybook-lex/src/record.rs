//! The record schema tree.
//!
//! A [`Record`] is one node of the schema extracted from a copybook: a
//! leaf field described by a PIC clause, or a group whose children are
//! further records. The tree builder constructs records in an arena and
//! materialises this read-only form when the build completes.

use std::fmt;

use serde::Serialize;

/// Field type inferred from a PIC clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PicKind {
    /// Alphanumeric (`X`).
    Str,
    /// Unsigned numeric (`9`).
    Uint,
    /// Signed numeric (`S9`).
    Int,
    /// Numeric with an implied decimal point (`9V9`).
    Float,
    /// A group of subordinate records.
    Group,
}

/// One node of the record schema tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Field or group name.
    pub name: String,
    /// Field type; `Group` for records with children.
    pub kind: PicKind,
    /// Width in characters. For a group, the sum of the children's
    /// effective lengths.
    pub length: usize,
    /// Repetition count; 0 means the field is not an array.
    pub occurs: usize,
    /// The textual level number this record was declared at, e.g. "05".
    pub depth: String,
    /// Subordinate records, in declaration order. Empty unless `kind`
    /// is [`PicKind::Group`].
    pub children: Vec<Record>,
}

impl Record {
    /// Whether this record is a group.
    pub fn is_group(&self) -> bool {
        self.kind == PicKind::Group
    }

    /// The characters this record occupies in a fixed-width stream,
    /// repetition included.
    pub fn effective_length(&self) -> usize {
        self.length * self.occurs.max(1)
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Record> {
        self.children.iter().find(|c| c.name == name)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{} {:?}", "", self.name, self.kind)?;
        if self.kind != PicKind::Group {
            write!(f, " len {}", self.length)?;
        }
        if self.occurs > 0 {
            write!(f, " occurs {}", self.occurs)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_indented(f, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
