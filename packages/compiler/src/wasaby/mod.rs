//! Wasaby
//!
//! Typed template AST and the traverse that builds it from the markup tree.

pub mod ast;
pub mod traverse;

pub use ast::{Ast, AstVisitor, Flags, NodeMeta, TextContent};
pub use traverse::{Traverse, TraverseContext, TraverseState};
