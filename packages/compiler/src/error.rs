//! Compiler Errors
//!
//! Error values raised by the services the traverse engine calls. The engine turns them
//! into scoped diagnostics, see [`crate::diagnostics`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("{message}")]
    ParseError { message: String },

    #[error("invalid path \"{path}\": {message}")]
    PathError { path: String, message: String },

    #[error("{message}")]
    ExpressionError { message: String },

    #[error("option \"{name}\" is already defined")]
    DuplicateOption { name: String },

    #[error("{kind} cannot be set as an option")]
    UnexpectedOptionNode { kind: &'static str },

    #[error("template \"{name}\" is already defined")]
    DuplicateTemplate { name: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompilerError {
    pub fn parse(message: impl Into<String>) -> Self {
        CompilerError::ParseError {
            message: message.into(),
        }
    }

    pub fn path(path: &str, message: impl Into<String>) -> Self {
        CompilerError::PathError {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn expression(message: impl Into<String>) -> Self {
        CompilerError::ExpressionError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
