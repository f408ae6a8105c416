/**
 * Expression Parser Module
 *
 * Lexer, parser and serializer for the mustache expression language
 */
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use serializer::{serialize, serialize_expression};
