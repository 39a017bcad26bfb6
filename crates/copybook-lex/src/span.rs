//! Source location tracking for error reporting.
//!
//! Tokens carry raw byte offsets; when the scanner reports an error it
//! resolves the offset into a [`Location`] so the message can point at the
//! exact line and column of the offending character.

use std::fmt;

/// Resolved location information for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The copybook name or path.
    pub name: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            line,
            column,
        }
    }

    /// Resolve a byte offset in `source` into a location.
    pub fn resolve(name: impl Into<String>, source: &str, offset: usize) -> Self {
        let (line, column) = offset_to_line_col(source, offset);
        Self::new(name, line, column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.column)
    }
}

/// Compute line and column from a byte offset in source text.
///
/// Returns `(line, column)`, both 1-indexed.
pub fn offset_to_line_col(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_col() {
        let source = "line 1\nline 2\nline 3";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 5), (1, 6));
        assert_eq!(offset_to_line_col(source, 7), (2, 1));
        assert_eq!(offset_to_line_col(source, 14), (3, 1));
    }

    #[test]
    fn test_offset_to_line_col_empty() {
        assert_eq!(offset_to_line_col("", 0), (1, 1));
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new("test.cpy", 10, 5);
        assert_eq!(loc.to_string(), "test.cpy:10:5");
    }

    #[test]
    fn test_location_resolve() {
        let loc = Location::resolve("book", "05  A\n05  B", 8);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
    }
}
