//! Line classification by token fingerprints.
//!
//! Tokens are grouped into lines, and each line is classified by its
//! fingerprint — the ordered sequence of token kinds on the line. The
//! known fingerprints live in a small trie keyed by token kind, so a
//! lookup walks the line once regardless of how many patterns are
//! registered.
//!
//! Two definitions span lines: a REDEFINES whose target and clause sit
//! on a continuation line, and a PIC whose OCCURS sits on a continuation
//! line. The first has a fingerprint of its own; the second looks like a
//! plain PIC line and is only recognised by peeking at the line after it.

use std::collections::HashMap;

use tracing::warn;

use crate::token::{Token, TokenKind};

/// What a line's fingerprint says it declares, and therefore which parse
/// routine the tree builder dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Group declaration delimited by sequence numbers.
    StructNum,
    /// Group declaration without sequence numbers.
    StructNonNum,
    /// Leaf field with a PIC clause.
    Pic,
    /// PIC field redefining a sibling, on one line.
    Redefines,
    /// Group redefining a sibling.
    GroupRedefines,
    /// PIC field with an inline OCCURS count.
    Occurs,
    /// First line of a two-line REDEFINES definition.
    MultiRedefines,
    /// First line of a two-line OCCURS definition.
    MultiOccurs,
    /// Continuation line of a two-line REDEFINES definition.
    RedefinesPart,
    /// Continuation line of a two-line OCCURS definition.
    OccursPart,
    /// No pattern matched; the line is skipped.
    Unknown,
}

/// A classified source line: its tokens and the classification tag.
#[derive(Debug, Clone)]
pub struct Line {
    /// The tokens covering the line, terminator included.
    pub tokens: Vec<Token>,
    /// The classification.
    pub kind: LineKind,
}

impl Line {
    /// Source line number of the first token (1-indexed for messages).
    pub fn number(&self) -> u32 {
        self.tokens.first().map(|t| t.line + 1).unwrap_or(0)
    }

    /// Whether the line carries nothing but spaces and a terminator.
    pub fn is_blank(&self) -> bool {
        self.tokens.iter().all(|t| {
            matches!(
                t.kind,
                TokenKind::Space | TokenKind::Eol | TokenKind::Eof
            )
        })
    }
}

// ───────────────────────── fingerprints ─────────────────────────

/// Compute a line's normalized fingerprint.
///
/// `Eof` counts as a terminator like `Eol`, and a space run just before
/// the terminator is dropped, so trailing padding does not defeat a
/// match.
pub fn fingerprint(tokens: &[Token]) -> Vec<TokenKind> {
    let mut fp = Vec::with_capacity(tokens.len());
    for t in tokens {
        match t.kind {
            TokenKind::Eol | TokenKind::Eof => {
                if fp.last() == Some(&TokenKind::Space) {
                    fp.pop();
                }
                fp.push(TokenKind::Eol);
                break;
            }
            k => fp.push(k),
        }
    }
    fp
}

/// Trie over token-kind sequences.
struct Trie {
    nodes: Vec<TrieNode>,
}

#[derive(Default)]
struct TrieNode {
    children: HashMap<TokenKind, usize>,
    terminal: Option<LineKind>,
}

impl Trie {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    fn insert(&mut self, pattern: &[TokenKind], kind: LineKind) {
        let mut at = 0;
        for &k in pattern {
            at = match self.nodes[at].children.get(&k).copied() {
                Some(next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[at].children.insert(k, next);
                    next
                }
            };
        }
        self.nodes[at].terminal = Some(kind);
    }

    fn lookup(&self, fp: &[TokenKind]) -> Option<LineKind> {
        let mut at = 0;
        for k in fp {
            at = *self.nodes[at].children.get(k)?;
        }
        self.nodes[at].terminal
    }
}

/// Build the pattern trie. Each pattern is registered with and without
/// the trailing sequence number, since fixed-form copybooks carry one in
/// columns 73-80 but hand-trimmed sources often do not.
fn patterns() -> Trie {
    const N: TokenKind = TokenKind::Number;
    const S: TokenKind = TokenKind::Space;
    const I: TokenKind = TokenKind::Identifier;
    const D: TokenKind = TokenKind::Dot;
    const P: TokenKind = TokenKind::Pic;
    const O: TokenKind = TokenKind::Occurs;
    const R: TokenKind = TokenKind::Redefines;
    const E: TokenKind = TokenKind::Eol;

    let mut trie = Trie::new();
    let mut add = |pattern: &[TokenKind], kind: LineKind| trie.insert(pattern, kind);

    add(&[N, S, N, S, I, D, S, N, E], LineKind::StructNum);
    add(&[N, S, N, S, I, D, E], LineKind::StructNum);
    add(&[S, N, S, I, D, E], LineKind::StructNonNum);

    add(&[N, S, N, S, I, S, P, S, N, E], LineKind::Pic);
    add(&[N, S, N, S, I, S, P, E], LineKind::Pic);

    add(&[N, S, N, S, I, S, R, S, I, S, P, S, N, E], LineKind::Redefines);
    add(&[N, S, N, S, I, S, R, S, I, S, P, E], LineKind::Redefines);

    add(&[N, S, N, S, I, S, R, S, I, D, S, N, E], LineKind::GroupRedefines);
    add(&[N, S, N, S, I, S, R, S, I, D, E], LineKind::GroupRedefines);

    add(&[N, S, N, S, I, S, P, S, O, S, N, D, S, N, E], LineKind::Occurs);
    add(&[N, S, N, S, I, S, P, S, O, S, N, D, E], LineKind::Occurs);

    add(&[N, S, N, S, I, S, R, S, N, E], LineKind::MultiRedefines);
    add(&[N, S, N, S, I, S, R, E], LineKind::MultiRedefines);

    add(&[N, S, I, S, P, S, N, E], LineKind::RedefinesPart);
    add(&[N, S, I, S, P, E], LineKind::RedefinesPart);

    add(&[N, S, O, S, N, D, S, N, E], LineKind::OccursPart);
    add(&[N, S, O, S, N, D, E], LineKind::OccursPart);

    trie
}

// ──────────────────────── classification ────────────────────────

/// Group a token stream into classified lines.
///
/// A PIC-shaped line followed by an OCCURS continuation is reclassified
/// as the first half of a two-line OCCURS definition; everything else is
/// what its own fingerprint says it is. Unmatched lines are tagged
/// [`LineKind::Unknown`], logged, and later skipped by the tree builder.
pub fn classify(tokens: Vec<Token>) -> Vec<Line> {
    let trie = patterns();

    let mut lines = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        let terminator = matches!(token.kind, TokenKind::Eol | TokenKind::Eof);
        let empty = current.is_empty() && matches!(token.kind, TokenKind::Eof);
        current.push(token);
        if terminator {
            // A bare EOF after a final newline is not a line.
            if !empty {
                let kind = trie
                    .lookup(&fingerprint(&current))
                    .unwrap_or(LineKind::Unknown);
                lines.push(Line {
                    tokens: std::mem::take(&mut current),
                    kind,
                });
            } else {
                current.clear();
            }
        }
    }
    if !current.is_empty() {
        // Input ended without a terminator; classify what we have.
        let kind = trie
            .lookup(&fingerprint(&current))
            .unwrap_or(LineKind::Unknown);
        lines.push(Line {
            tokens: current,
            kind,
        });
    }

    // A PIC line is only the first half of a two-line OCCURS when the
    // next line is an OCCURS continuation.
    for i in 0..lines.len() {
        if lines[i].kind == LineKind::Pic
            && matches!(lines.get(i + 1), Some(next) if next.kind == LineKind::OccursPart)
        {
            lines[i].kind = LineKind::MultiOccurs;
        }
    }

    for line in &lines {
        if line.kind == LineKind::Unknown && !line.is_blank() {
            warn!(line = line.number(), "no fingerprint matched; line skipped");
        }
    }

    lines
}

// ─────────────────────────── splicing ───────────────────────────

/// Splice a two-line REDEFINES definition into the single-line shape.
///
/// The first line contributes everything through the REDEFINES keyword;
/// the continuation contributes the target identifier and PIC clause.
pub fn splice_redefines(first: &Line, second: &Line) -> Line {
    splice(first, second, TokenKind::Redefines, LineKind::Redefines)
}

/// Splice a two-line OCCURS definition into the single-line shape.
///
/// The first line contributes everything through the PIC clause; the
/// continuation contributes the OCCURS keyword and its count.
pub fn splice_occurs(first: &Line, second: &Line) -> Line {
    splice(first, second, TokenKind::Pic, LineKind::Occurs)
}

fn splice(first: &Line, second: &Line, anchor: TokenKind, kind: LineKind) -> Line {
    let cut = first
        .tokens
        .iter()
        .position(|t| t.kind == anchor)
        .expect("first line verified against its fingerprint");

    let mut tokens: Vec<Token> = first.tokens[..=cut].to_vec();
    let line = first.tokens[cut].line;
    let pos = first.tokens[cut].pos;
    tokens.push(Token::new(TokenKind::Space, pos, " ", line));
    // Skip the continuation's sequence number and the space after it.
    tokens.extend(second.tokens.iter().skip(2).cloned());

    Line { tokens, kind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn classified(input: &str) -> Vec<Line> {
        let (tokens, errors) = scan("test", input);
        assert!(errors.is_empty());
        classify(tokens)
    }

    #[test]
    fn test_classify_struct_lines() {
        let lines = classified(
            "000160     05  DUMMY-GROUP-1.                                           00000115\n",
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::StructNum);
    }

    #[test]
    fn test_classify_non_num_struct() {
        let lines = classified("           05  DUMMY-GROUP-2.                   \n");
        assert_eq!(lines[0].kind, LineKind::StructNonNum);
    }

    #[test]
    fn test_classify_pic() {
        let lines = classified(
            "000600         10  DUMMY-GROUP-1-OBJECT-A       PIC X.                  00000167\n",
        );
        assert_eq!(lines[0].kind, LineKind::Pic);
    }

    #[test]
    fn test_classify_inline_redefines() {
        let lines = classified(
            "001140         10  G-F       REDEFINES  G-E     PIC X(4).               00000226\n",
        );
        assert_eq!(lines[0].kind, LineKind::Redefines);
    }

    #[test]
    fn test_classify_group_redefines() {
        let lines = classified(
            "000830     05  DUMMY-GROUP-2     REDEFINES      DUMMY-BIGDATA.          00000195\n",
        );
        assert_eq!(lines[0].kind, LineKind::GroupRedefines);
    }

    #[test]
    fn test_classify_inline_occurs() {
        let lines = classified(
            "000180             15  G-1-A   PIC 9  OCCURS 12.       00000117\n",
        );
        assert_eq!(lines[0].kind, LineKind::Occurs);
    }

    #[test]
    fn test_classify_multiline_redefines() {
        let lines = classified(
            "001140         10  G-F       REDEFINES               00000226\n\
             001150             G-E       PIC XXXX.               00000227\n",
        );
        assert_eq!(lines[0].kind, LineKind::MultiRedefines);
        assert_eq!(lines[1].kind, LineKind::RedefinesPart);
    }

    #[test]
    fn test_classify_multiline_occurs() {
        let lines = classified(
            "001290           15  SUB-2-A  PIC X(12)               00000241\n\
             001300             OCCURS 12.                         00000242\n",
        );
        assert_eq!(lines[0].kind, LineKind::MultiOccurs);
        assert_eq!(lines[1].kind, LineKind::OccursPart);
    }

    #[test]
    fn test_classify_unknown_line() {
        let lines = classified("* a comment line\n");
        assert_eq!(lines[0].kind, LineKind::Unknown);
    }

    #[test]
    fn test_blank_lines_are_unknown() {
        let lines = classified("   \n\n");
        assert!(lines.iter().all(|l| l.kind == LineKind::Unknown));
        assert!(lines.iter().all(|l| l.is_blank()));
    }

    #[test]
    fn test_trailing_newline_produces_no_extra_line() {
        let lines = classified("000160     05  G-1.   00000115\n");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_splice_occurs_shape() {
        let lines = classified(
            "001290           15  SUB-2-A  PIC X(12)               00000241\n\
             001300             OCCURS 12.                         00000242\n",
        );
        let spliced = splice_occurs(&lines[0], &lines[1]);
        assert_eq!(spliced.kind, LineKind::Occurs);
        let fp = fingerprint(&spliced.tokens);
        let expect = fingerprint(
            &classified("001290   15  SUB-2-A  PIC X(12)  OCCURS 12.   00000242\n")[0].tokens,
        );
        assert_eq!(fp, expect);
        assert_eq!(spliced.tokens[4].text, "SUB-2-A");
        assert_eq!(spliced.tokens[6].text, "PIC X(12)");
        assert_eq!(spliced.tokens[10].text, "12");
    }

    #[test]
    fn test_splice_redefines_shape() {
        let lines = classified(
            "001140         10  G-F       REDEFINES               00000226\n\
             001150             G-E       PIC XXXX.               00000227\n",
        );
        let spliced = splice_redefines(&lines[0], &lines[1]);
        assert_eq!(spliced.kind, LineKind::Redefines);
        assert_eq!(spliced.tokens[4].text, "G-F");
        assert_eq!(spliced.tokens[8].text, "G-E");
        assert_eq!(spliced.tokens[10].text, "PIC XXXX.");
    }
}
