//! COBOL copybook schema extraction.
//!
//! This crate turns copybook record definitions into a typed schema
//! tree. The pipeline is:
//! 1. The scanner produces a token stream from the source text
//! 2. The classifier groups tokens into lines and fingerprints each one
//! 3. The tree builder assembles the classified lines into a [`Record`]
//!    tree, resolving level numbers, OCCURS counts, and REDEFINES
//!    replacements
//!
//! The resulting tree is the input for fixed-width decoding and for
//! source-code rendering of record layouts.
//!
//! # Example
//!
//! ```
//! let record = copybook_lex::parse(
//!     "accounts",
//!     "000160     05  ACCT-ID       PIC X(8).        00000115\n\
//!      000170     05  ACCT-BALANCE  PIC 9(7).        00000116\n",
//! )?;
//! assert_eq!(record.length, 15);
//! assert_eq!(record.children[0].name, "ACCT-ID");
//! # Ok::<(), copybook_lex::CopybookError>(())
//! ```

pub mod classify;
pub mod error;
pub mod pic;
pub mod record;
pub mod scanner;
pub mod span;
pub mod token;
pub mod tree;

pub use classify::{classify, Line, LineKind};
pub use error::{CopybookError, Result};
pub use record::{PicKind, Record};
pub use scanner::{scan, Scanner};
pub use span::{offset_to_line_col, Location};
pub use token::{Token, TokenKind};
pub use tree::Tree;

/// Parse copybook source into a record tree.
///
/// `name` labels the synthetic root group and shows up in error
/// locations; `source` is the full copybook text.
pub fn parse(name: &str, source: &str) -> Result<Record> {
    let (tokens, mut errors) = scan(name, source);
    if !errors.is_empty() {
        return Err(errors.remove(0));
    }
    let lines = classify(tokens);
    Tree::new(lines).build(name)
}
