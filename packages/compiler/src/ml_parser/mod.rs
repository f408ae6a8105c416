//! ML (Markup Language) Parser Module
//!
//! Parses template markup into a generic tag tree

pub mod ast;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tokens;

pub use ast::*;
pub use html_tags::{is_raw_text_element, is_void_element};
pub use lexer::{tokenize, TokenizeResult};
pub use parser::{parse, ParseOptions, ParseTreeResult};
pub use tokens::Token;
