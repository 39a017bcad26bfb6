//! Error types for fixed-width decoding.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding fixed-width records.
#[derive(Debug, Error, Diagnostic)]
pub enum DecodeError {
    /// The input was empty but a record was required.
    #[error("unexpected end of input")]
    #[diagnostic(code(decode::unexpected_eof))]
    UnexpectedEof,

    /// A field's bytes did not convert to the declared kind.
    #[error("cannot decode record {record:?} into field {field}: {reason}")]
    #[diagnostic(code(decode::conversion))]
    Conversion {
        /// The source record text.
        record: String,
        /// The offending field's name.
        field: String,
        /// The conversion failure.
        reason: String,
    },

    /// A width annotation that is not `w` or `w,k`.
    #[error("invalid width annotation {tag:?}")]
    #[diagnostic(
        code(decode::invalid_width),
        help("width annotations are a width `w`, or `w,k` for k elements of width w")
    )]
    InvalidWidth {
        /// The annotation text.
        tag: String,
    },
}
