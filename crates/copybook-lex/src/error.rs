//! Error types for copybook parsing.

use miette::Diagnostic;
use thiserror::Error;

use crate::span::Location;

/// Result type for copybook operations.
pub type Result<T> = std::result::Result<T, CopybookError>;

/// Errors that can occur while lexing and parsing a copybook.
#[derive(Debug, Error, Diagnostic)]
pub enum CopybookError {
    /// The scanner hit a character it cannot tokenize.
    #[error("unrecognized character {character:?} at {location}")]
    #[diagnostic(code(copybook::lex::unrecognized_character))]
    UnrecognizedCharacter {
        /// The offending character.
        character: char,
        /// Where it was found.
        location: Location,
    },

    /// A numeric lexeme did not scan.
    #[error("bad number syntax {text:?} at {location}")]
    #[diagnostic(code(copybook::lex::bad_number))]
    BadNumber {
        /// The partial lexeme.
        text: String,
        /// Where it was found.
        location: Location,
    },

    /// An identifier was followed by a character that cannot terminate one.
    #[error("bad character {character:?} after identifier at {location}")]
    #[diagnostic(code(copybook::lex::bad_terminator))]
    BadTerminator {
        /// The offending character.
        character: char,
        /// Where it was found.
        location: Location,
    },

    /// A PIC clause whose length could not be computed.
    #[error("invalid picture clause {clause:?}: {reason}")]
    #[diagnostic(code(copybook::parse::invalid_picture))]
    InvalidPicture {
        /// The clause text, without the `PIC ` prefix.
        clause: String,
        /// Why it did not parse.
        reason: String,
    },

    /// An OCCURS repetition count that is not a positive integer.
    #[error("invalid occurs count {text:?}")]
    #[diagnostic(code(copybook::parse::invalid_occurs))]
    InvalidOccursCount {
        /// The count text.
        text: String,
    },

    /// A REDEFINES clause naming a field that is not a sibling.
    #[error("redefinition target {target} does not exist")]
    #[diagnostic(
        code(copybook::parse::redefines_target_missing),
        help("REDEFINES must name a previously declared field at the same level")
    )]
    RedefinesTargetMissing {
        /// The named target.
        target: String,
    },

    /// A multi-line definition whose continuation line has the wrong shape.
    #[error("multi-line {kind} definition at line {line}, but the next line is not a valid continuation")]
    #[diagnostic(code(copybook::parse::bad_continuation))]
    BadContinuation {
        /// Which definition kind was being continued.
        kind: &'static str,
        /// Line number of the first half (1-indexed).
        line: u32,
    },

    /// More than one level-01 record description in a single copybook.
    #[error("multiple record descriptions (level 01) in one copybook")]
    #[diagnostic(
        code(copybook::parse::multiple_record_descriptions),
        help("split the copybook so each file declares a single 01 record")
    )]
    MultipleRecordDescriptions,
}
