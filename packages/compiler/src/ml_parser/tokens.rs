//! ML Parser Tokens

use crate::parse_util::SourcePosition;

/// Token types for markup parsing
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name`
    TagOpenStart { name: String, position: SourcePosition },
    /// An attribute inside an open tag; `value` is `None` for valueless attributes
    Attribute {
        name: String,
        value: Option<String>,
        position: SourcePosition,
    },
    /// `>`
    TagOpenEnd,
    /// `/>`
    TagOpenEndVoid,
    /// `</name>`
    TagClose { name: String, position: SourcePosition },
    Text { data: String, position: SourcePosition },
    Comment { data: String, position: SourcePosition },
    CData { data: String, position: SourcePosition },
    DocType { data: String, position: SourcePosition },
    Instruction { data: String, position: SourcePosition },
    Eof,
}
