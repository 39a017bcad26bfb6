//! Copybook token scanner (lexer).
//!
//! The scanner converts copybook source text into a stream of tokens.
//! It is a character-level state machine: each state function consumes
//! input and hands back the next state, and a `None` return ends the
//! scan. The grammar it accepts is deliberately small — level numbers,
//! identifiers, PIC clauses, the OCCURS and REDEFINES keywords — with a
//! general-purpose number sub-scanner inherited from the template
//! tokenizer this lexer descends from.

use crate::error::CopybookError;
use crate::span::Location;
use crate::token::{Token, TokenKind};

/// Scanner states. Each maps to one `lex_*` step function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Dispatch on the next character.
    Statement,
    /// Absorb a run of spaces.
    Space,
    /// Scan a numeric lexeme.
    Number,
    /// Scan an identifier or boolean.
    Identifier,
    /// Scan a PIC clause.
    Pic,
}

/// The copybook scanner.
pub struct Scanner {
    /// Copybook name, used in error locations.
    name: String,
    /// The raw input, kept for line/column resolution.
    input: String,
    /// Input characters; the grammar is ASCII so char and byte offsets
    /// coincide.
    chars: Vec<char>,
    /// Current position within `chars`.
    pos: usize,
    /// Start of the current lexeme.
    start: usize,
    /// Line number at `start` (0-indexed).
    line: u32,
    /// Accumulated tokens.
    tokens: Vec<Token>,
    /// Accumulated errors. The scan halts on the first one.
    errors: Vec<CopybookError>,
}

impl Scanner {
    /// Create a new scanner over copybook source text.
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        let input = input.into();
        let chars = input.chars().collect();
        Self {
            name: name.into(),
            input,
            chars,
            pos: 0,
            start: 0,
            line: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scan all tokens from the input.
    ///
    /// Returns the token stream and any errors. An error halts the scan,
    /// so at most one is reported and the token stream ends with an
    /// `Error` token instead of `Eof`.
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<CopybookError>) {
        let mut state = Some(State::Statement);
        while let Some(s) = state {
            state = match s {
                State::Statement => self.lex_statement(),
                State::Space => self.lex_space(),
                State::Number => self.lex_number(),
                State::Identifier => self.lex_identifier(),
                State::Pic => self.lex_pic(),
            };
        }
        (self.tokens, self.errors)
    }

    // ────────────────────── cursor primitives ──────────────────────

    fn next(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn backup(&mut self) {
        self.pos -= 1;
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// Whether the input at the cursor starts with `literal`.
    fn looking_at(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Consume the next character if it is in `set`.
    fn accept(&mut self, set: &str) -> bool {
        if let Some(c) = self.peek() {
            if set.contains(c) {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    /// Consume a run of characters from `set`.
    fn accept_run(&mut self, set: &str) {
        while self.accept(set) {}
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.pos].iter().collect()
    }

    fn emit(&mut self, kind: TokenKind) {
        let text = self.lexeme();
        self.tokens
            .push(Token::new(kind, self.start as u32, text, self.line));
        if kind == TokenKind::Eol {
            self.line += 1;
        }
        self.start = self.pos;
    }

    /// Resolve the cursor into a line/column location.
    fn location(&self) -> Location {
        let offset: usize = self.chars[..self.pos].iter().map(|c| c.len_utf8()).sum();
        Location::resolve(self.name.clone(), &self.input, offset)
    }

    /// Record an error, emit it as an `Error` token, and halt the scan.
    fn error(&mut self, err: CopybookError) -> Option<State> {
        self.tokens.push(Token::new(
            TokenKind::Error,
            self.start as u32,
            err.to_string(),
            self.line,
        ));
        self.errors.push(err);
        None
    }

    // ─────────────────────── state functions ───────────────────────

    fn lex_statement(&mut self) -> Option<State> {
        let c = match self.next() {
            Some(c) => c,
            None => {
                self.emit(TokenKind::Eof);
                return None;
            }
        };

        match c {
            c if is_eol(c) => {
                self.emit(TokenKind::Eol);
                Some(State::Statement)
            }
            c if is_space(c) => {
                self.backup();
                Some(State::Space)
            }
            // Look-ahead for "PIC " so an identifier that merely starts
            // with P is not misread.
            'P' if self.looking_at("IC")
                && matches!(self.peek_at(2), Some(c) if is_space(c)) =>
            {
                Some(State::Pic)
            }
            'O' if self.looking_at("CCURS")
                && matches!(self.peek_at(5), Some(c) if is_space(c)) =>
            {
                for _ in 0..5 {
                    self.next();
                }
                self.emit(TokenKind::Occurs);
                Some(State::Statement)
            }
            'R' if self.looking_at("EDEFINES")
                && matches!(self.peek_at(8), Some(c) if is_space(c)) =>
            {
                for _ in 0..8 {
                    self.next();
                }
                self.emit(TokenKind::Redefines);
                Some(State::Statement)
            }
            '+' | '-' | '0'..='9' => {
                self.backup();
                Some(State::Number)
            }
            c if is_alphanumeric(c) => {
                self.backup();
                Some(State::Identifier)
            }
            '.' => {
                self.emit(TokenKind::Dot);
                Some(State::Statement)
            }
            c if c.is_ascii() && !c.is_ascii_control() => {
                self.emit(TokenKind::Char);
                Some(State::Statement)
            }
            c => {
                let location = self.location();
                self.error(CopybookError::UnrecognizedCharacter {
                    character: c,
                    location,
                })
            }
        }
    }

    /// Scan a run of space characters into a single token.
    fn lex_space(&mut self) -> Option<State> {
        while matches!(self.peek(), Some(c) if is_space(c)) {
            self.next();
        }
        self.emit(TokenKind::Space);
        Some(State::Statement)
    }

    /// Scan a number: decimal, octal, hex, float, or imaginary. This is
    /// not a perfect number scanner — it accepts "0x0.2" and "089" — but
    /// when it is wrong the input is invalid anyway and the tree parsers
    /// will notice.
    fn lex_number(&mut self) -> Option<State> {
        if !self.scan_number() {
            let text = self.lexeme();
            let location = self.location();
            return self.error(CopybookError::BadNumber { text, location });
        }
        if matches!(self.peek(), Some('+') | Some('-')) {
            // Imaginary pair such as 1+2i. No spaces, must end in 'i'.
            if !self.scan_number() || self.chars[self.pos - 1] != 'i' {
                let text = self.lexeme();
                let location = self.location();
                return self.error(CopybookError::BadNumber { text, location });
            }
        }
        self.emit(TokenKind::Number);
        Some(State::Statement)
    }

    fn scan_number(&mut self) -> bool {
        // Optional leading sign.
        self.accept("+-");
        // Is it hex?
        let mut digits = "0123456789_";
        if self.accept("0") {
            // Leading 0 does not mean octal in floats.
            if self.accept("xX") {
                digits = "0123456789abcdefABCDEF_";
            } else if self.accept("oO") {
                digits = "01234567_";
            } else if self.accept("bB") {
                digits = "01_";
            }
        }
        self.accept_run(digits);
        // A period is part of the number only when a digit follows;
        // otherwise it is the statement terminator.
        if self.peek() == Some('.')
            && matches!(self.peek_at(1), Some(c) if digits.contains(c))
        {
            self.next();
            self.accept_run(digits);
        }
        if digits.len() == 10 + 1 && self.accept("eE") {
            self.accept("+-");
            self.accept_run("0123456789_");
        }
        if digits.len() == 16 + 6 + 1 && self.accept("pP") {
            self.accept("+-");
            self.accept_run("0123456789_");
        }
        // Is it imaginary?
        self.accept("i");
        // Next thing mustn't be alphanumeric.
        if matches!(self.peek(), Some(c) if is_alphanumeric(c)) {
            self.next();
            return false;
        }
        true
    }

    /// Scan an identifier or boolean constant.
    fn lex_identifier(&mut self) -> Option<State> {
        loop {
            match self.next() {
                Some(c) if is_alphanumeric(c) => {
                    // absorb.
                }
                other => {
                    if other.is_some() {
                        self.backup();
                    }
                    if !self.at_terminator() {
                        let character = self.peek().unwrap_or('\0');
                        let location = self.location();
                        return self.error(CopybookError::BadTerminator {
                            character,
                            location,
                        });
                    }
                    let word = self.lexeme();
                    match word.as_str() {
                        "true" | "false" => self.emit(TokenKind::Bool),
                        _ => self.emit(TokenKind::Identifier),
                    }
                    break;
                }
            }
        }
        Some(State::Statement)
    }

    /// Scan a PIC clause into a single token.
    ///
    /// Entered with the leading `P` consumed and `IC ` guaranteed by the
    /// statement look-ahead. The clause runs over the PIC character set
    /// plus parenthesised counts, and terminates on either a space after
    /// the clause body (so a trailing OCCURS or REDEFINES is lexed
    /// separately) or on a `.` terminator, which is consumed as part of
    /// the token.
    ///
    /// Known limitation: a clause with an embedded decimal point such as
    /// `PIC 9(11).9(2)` is absorbed whole and its length misreported, as
    /// the terminator check only looks one character ahead.
    fn lex_pic(&mut self) -> Option<State> {
        // "IC" after the consumed 'P'.
        self.next();
        self.next();

        let mut seen_clause = false;
        loop {
            match self.peek() {
                None => break,
                Some(c) if is_eol(c) => break,
                Some(c) if is_space(c) => {
                    if seen_clause {
                        break;
                    }
                    self.next();
                }
                Some('.') => match self.peek_at(1) {
                    Some(n) if is_pic_char(n) || n == '(' => {
                        self.next();
                    }
                    _ => {
                        // Terminator, part of the token.
                        self.next();
                        break;
                    }
                },
                Some(c) if is_pic_char(c) => {
                    seen_clause = true;
                    self.next();
                }
                Some(_) => break,
            }
        }
        self.emit(TokenKind::Pic);
        Some(State::Statement)
    }

    /// Whether the cursor is at a character that may follow an
    /// identifier.
    fn at_terminator(&self) -> bool {
        match self.peek() {
            None => true,
            Some(c) if is_space(c) || is_eol(c) => true,
            Some('.' | ',' | '|' | ':' | ')' | '(') => true,
            _ => false,
        }
    }
}

/// Scan copybook source and return the tokens plus any errors.
pub fn scan(name: &str, input: &str) -> (Vec<Token>, Vec<CopybookError>) {
    Scanner::new(name, input).scan_all()
}

// ─────────────────────── character classes ───────────────────────

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_eol(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_alphanumeric(c: char) -> bool {
    c == '_' || c == '-' || c.is_alphanumeric()
}

fn is_pic_char(c: char) -> bool {
    matches!(c, 'P' | 'I' | 'C' | 'X' | '9' | 'S' | 'V' | '(' | ')') || c.is_ascii_digit()
}
