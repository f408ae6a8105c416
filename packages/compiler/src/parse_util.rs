//! Parse Utilities
//!
//! Source positions and markup parse errors shared by every stage of the compiler

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position of a node in the source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        SourcePosition { line, column }
    }
}

impl fmt::Display for SourcePosition {
    /// Human readable form is one-based, like editors show it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Cursor over source text that tracks line and column while advancing
#[derive(Debug, Clone)]
pub struct SourceCursor<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> SourceCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        SourceCursor {
            input,
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn peek(&self) -> char {
        self.input[self.offset..].chars().next().unwrap_or(crate::chars::EOF)
    }

    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Case-insensitive prefix test, used for `<!DOCTYPE` and raw text close tags
    pub fn starts_with_ignore_case(&self, s: &str) -> bool {
        let rest = self.rest();
        rest.len() >= s.len()
            && rest.is_char_boundary(s.len())
            && rest[..s.len()].eq_ignore_ascii_case(s)
    }

    pub fn advance(&mut self) {
        let ch = self.peek();
        if self.is_eof() {
            return;
        }
        self.offset += ch.len_utf8();
        if ch == crate::chars::NEWLINE {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.offset]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

/// Error produced while building the tag tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseError {
    pub position: SourcePosition,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(position: SourcePosition, msg: String) -> Self {
        ParseError {
            position,
            msg,
            level: ParseErrorLevel::Error,
        }
    }

    pub fn warning(position: SourcePosition, msg: String) -> Self {
        ParseError {
            position,
            msg,
            level: ParseErrorLevel::Warning,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.msg, self.position)
    }
}
