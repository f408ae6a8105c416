#![deny(clippy::all)]

/**
 * Wasaby Template Compiler
 *
 * Turns WML/TMPL markup into a typed, annotated template AST
 */

// Core modules
pub mod chars;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod parse_util;

// Parser modules
pub mod expression_parser;
pub mod ml_parser;
pub mod template_parser;

// AST and traversal
pub mod wasaby;

// Re-exports
pub use compiler::{compile_template, CompileResult};
pub use config::CompilerConfig;
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticMeta, ErrorHandler, StackErrorHandler};
pub use error::{CompilerError, Result};
pub use wasaby::ast::Ast;
pub use wasaby::traverse::Traverse;
