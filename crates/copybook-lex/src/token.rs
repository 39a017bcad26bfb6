//! Token types for copybook lexical analysis.

use std::fmt;

/// Token types produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Scanning error; the token text is the error message.
    Error,
    /// Boolean constant (`true` / `false`).
    Bool,
    /// Printable ASCII character; grab bag for punctuation with no
    /// dedicated kind.
    Char,
    /// End of input.
    Eof,
    /// End of line (`\r` or `\n`).
    Eol,
    /// Name of a PIC field or group.
    Identifier,
    /// Number, including level numbers and sequence numbers.
    Number,
    /// Run of spaces separating tokens.
    Space,
    /// The statement terminator, spelled `.`.
    Dot,
    /// OCCURS keyword.
    Occurs,
    /// PIC clause, including the `PIC ` prefix and the trailing `.`
    /// when present.
    Pic,
    /// REDEFINES keyword.
    Redefines,
}

/// A token returned from the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of this token.
    pub kind: TokenKind,
    /// Starting byte offset of this token in the input.
    pub pos: u32,
    /// The token text.
    pub text: String,
    /// Line number at the start of this token (0-indexed).
    pub line: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, pos: u32, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            pos,
            text: text.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error => write!(f, "{}", self.text),
            _ if self.text.len() > 10 => write!(f, "{:?}...", &self.text[..10]),
            _ => write!(f, "{:?}", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_truncates_long_text() {
        let tok = Token::new(TokenKind::Pic, 0, "PIC X(201).", 0);
        assert_eq!(tok.to_string(), "\"PIC X(201)\"...");
    }

    #[test]
    fn test_display_eof() {
        let tok = Token::new(TokenKind::Eof, 12, "", 3);
        assert_eq!(tok.to_string(), "EOF");
    }

    #[test]
    fn test_display_short_text() {
        let tok = Token::new(TokenKind::Identifier, 0, "G-1", 0);
        assert_eq!(tok.to_string(), "\"G-1\"");
    }
}
