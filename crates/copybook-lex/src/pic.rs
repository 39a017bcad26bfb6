//! PIC-clause micro-parser.
//!
//! A PIC clause declares a leaf field's type and width with the
//! characters `X` (char), `9` (digit), `S` (sign), and `V` (implied
//! decimal point). Widths come from bare repetition (`XXXX` is four
//! characters) or a parenthesised count (`X(4)`), and the two may mix
//! (`9(4)V99` is six digits wide).

use crate::error::{CopybookError, Result};
use crate::record::PicKind;

/// Strip the scanner's framing from a PIC token: the `PIC ` prefix, the
/// trailing terminator, and any padding between them.
pub fn clause(token_text: &str) -> &str {
    token_text
        .strip_prefix("PIC")
        .unwrap_or(token_text)
        .trim_matches(' ')
        .trim_end_matches('.')
}

/// Infer the field kind from a PIC clause.
pub fn parse_kind(clause: &str) -> PicKind {
    let digit = clause.contains('9');
    let alpha = clause.contains('X');
    let signed = clause.contains('S');
    let decimal = clause.contains('V');

    if digit && !alpha && !decimal && !signed {
        PicKind::Uint
    } else if digit && signed {
        PicKind::Int
    } else if decimal {
        PicKind::Float
    } else {
        PicKind::Str
    }
}

/// Compute the character width of a PIC clause.
///
/// Only `X` and `9` occupy characters; `S` and `V` are declarative.
/// A parenthesised count replaces the single occurrence of the
/// character before it.
pub fn parse_length(clause: &str) -> Result<usize> {
    let invalid = |reason: &str| CopybookError::InvalidPicture {
        clause: clause.to_string(),
        reason: reason.to_string(),
    };

    let mut length = 0;
    let mut chars = clause.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            'X' | '9' => {
                if chars.peek() == Some(&'(') {
                    chars.next();
                    let mut digits = String::new();
                    for n in chars.by_ref() {
                        if n == ')' {
                            break;
                        }
                        digits.push(n);
                    }
                    let count: usize = digits
                        .trim()
                        .parse()
                        .map_err(|_| invalid("repetition count is not a number"))?;
                    length += count;
                } else {
                    length += 1;
                }
            }
            'S' | 'V' | ' ' => {}
            '.' => break,
            '(' => return Err(invalid("count with no preceding character")),
            _ => return Err(invalid("unexpected character")),
        }
    }

    Ok(length)
}

/// Parse an OCCURS repetition count.
pub fn parse_occurs_count(text: &str) -> Result<usize> {
    let count: usize = text
        .trim()
        .parse()
        .map_err(|_| CopybookError::InvalidOccursCount {
            text: text.to_string(),
        })?;
    if count == 0 {
        return Err(CopybookError::InvalidOccursCount {
            text: text.to_string(),
        });
    }
    Ok(count)
}
