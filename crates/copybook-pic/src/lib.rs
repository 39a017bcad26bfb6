//! Fixed-width record decoding.
//!
//! This crate decodes newline-separated fixed-width byte streams
//! against a caller-declared [`RecordSchema`]: per-field byte widths,
//! nested groups, and OCCURS repetition, including repetition of whole
//! groups. Decoded records come back as [`Value`] trees shaped like the
//! schema.
//!
//! # Example
//!
//! ```
//! use copybook_pic::{decode, FieldSchema, RecordSchema, Value};
//!
//! let schema = RecordSchema::new(
//!     "row",
//!     vec![
//!         FieldSchema::str("string", 5),
//!         FieldSchema::int("int", 5),
//!         FieldSchema::float("float", 5),
//!     ],
//! );
//! let row = decode(b"foo  123  1.2  ", &schema)?;
//! assert_eq!(row.get("string").and_then(Value::as_str), Some("foo"));
//! assert_eq!(row.get("int").and_then(Value::as_int), Some(123));
//! # Ok::<(), copybook_pic::DecodeError>(())
//! ```

pub mod decode;
pub mod error;
pub mod schema;
pub mod value;

pub use decode::{decode, decode_lines};
pub use error::{DecodeError, Result};
pub use schema::{FieldKind, FieldSchema, FieldWidth, RecordSchema};
pub use value::Value;
