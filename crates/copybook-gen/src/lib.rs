//! Rust source rendering for copybook record trees.
//!
//! Takes the [`Record`] tree extracted from a copybook and renders a
//! struct definition ready for fixed-width decoding: one field per
//! leaf, width annotations in the same `w` / `w,k` grammar the decoder
//! reads, and a trailing comment tracking each field's byte range
//! within the record.
//!
//! Groups without repetition flatten into their parent, matching the
//! flat byte layout of the record itself. A group with an OCCURS count
//! becomes a `Vec` of a nested struct, rendered with its own byte
//! offsets relative to one element.

use std::sync::LazyLock;

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use copybook_lex::{PicKind, Record};
use copybook_pic::FieldWidth;

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering a record tree.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    /// The root of a rendering must be a group.
    #[error("cannot render {name}: not a group record")]
    #[diagnostic(code(gen::not_a_group))]
    NotAGroup {
        /// The offending record's name.
        name: String,
    },
}

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]+").expect("static pattern"));

const HEADER: &str = "// AUTOGENERATED FILE - regenerate from the copybook instead of editing.\n";

/// Cumulative byte offsets threaded through one struct rendering.
///
/// Offsets are 1-based and inclusive, so the first four-character field
/// reports `start:1 end:4`. Each rendering owns its own counters; a
/// nested struct's offsets are relative to one element of its group.
struct Offsets {
    start: usize,
    end: usize,
}

impl Offsets {
    fn new() -> Self {
        Self { start: 1, end: 1 }
    }

    fn advance(&mut self, size: usize) -> (usize, usize) {
        let s = self.start;
        self.end += size;
        self.start = self.end;
        (s, self.end - 1)
    }
}

/// Render a record tree as Rust struct definitions.
pub fn render(record: &Record) -> Result<String> {
    if !record.is_group() {
        return Err(RenderError::NotAGroup {
            name: record.name.clone(),
        });
    }

    let mut structs = Vec::new();
    render_struct(record, &mut structs);

    let mut out = String::from(HEADER);
    for body in structs {
        out.push('\n');
        out.push_str(&body);
    }
    Ok(out)
}

/// Render one struct definition into `structs` and return its type
/// name. Nested OCCURS groups append their own definitions after it.
fn render_struct(record: &Record, structs: &mut Vec<String>) -> String {
    let type_name = type_name(&record.name);
    let slot = structs.len();
    structs.push(String::new());

    let mut body = String::new();
    body.push_str(&format!(
        "/// Fixed-width layout of the {} record.\n",
        record.name
    ));
    body.push_str(&format!("pub struct {type_name} {{\n"));
    let mut offsets = Offsets::new();
    render_fields(record, &mut body, &mut offsets, structs);
    body.push_str("}\n");

    structs[slot] = body;
    type_name
}

fn render_fields(
    group: &Record,
    body: &mut String,
    offsets: &mut Offsets,
    structs: &mut Vec<String>,
) {
    for child in &group.children {
        // A group without repetition contributes its leaves in place.
        if child.is_group() && child.occurs == 0 {
            render_fields(child, body, offsets, structs);
            continue;
        }

        let ty = if child.is_group() {
            let inner = render_struct(child, structs);
            format!("Vec<{inner}>")
        } else {
            rust_type(child.kind, child.occurs > 0)
        };
        let tag = FieldWidth {
            width: child.length,
            count: (child.occurs > 0).then_some(child.occurs),
        };
        let (start, end) = offsets.advance(child.effective_length());

        body.push_str(&format!("    #[pic(\"{tag}\")]\n"));
        body.push_str(&format!(
            "    pub {}: {ty}, // start:{start} end:{end}\n",
            field_name(&child.name)
        ));
    }
}

/// Translate a record kind into a Rust type.
fn rust_type(kind: PicKind, repeated: bool) -> String {
    let base = match kind {
        PicKind::Str => "String",
        PicKind::Uint => "u64",
        PicKind::Int => "i64",
        PicKind::Float => "f64",
        PicKind::Group => unreachable!("groups render as nested structs"),
    };
    if repeated {
        format!("Vec<{base}>")
    } else {
        base.to_string()
    }
}

/// Sanitise a copybook name into a snake_case field name.
fn field_name(name: &str) -> String {
    SPECIAL
        .replace_all(name, "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Sanitise a copybook name into an UpperCamelCase type name.
fn type_name(name: &str) -> String {
    SPECIAL
        .split(name)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let lower = segment.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
