//! Diagnostics
//!
//! Severity-graded reports collected during one compilation. `warn` never blocks,
//! `error` means a node was dropped, `critical` and `fatal` mark the whole compilation
//! as failed even when a tree is still returned.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

use crate::parse_util::SourcePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagnosticLevel {
    Warning,
    Error,
    Critical,
    Fatal,
}

impl DiagnosticLevel {
    fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Critical => "critical",
            DiagnosticLevel::Fatal => "fatal",
        }
    }
}

/// Where a diagnostic points to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticMeta {
    pub file_name: String,
    pub position: Option<SourcePosition>,
}

impl DiagnosticMeta {
    pub fn new(file_name: &str, position: SourcePosition) -> Self {
        DiagnosticMeta {
            file_name: file_name.to_string(),
            position: Some(position),
        }
    }

    pub fn file(file_name: &str) -> Self {
        DiagnosticMeta {
            file_name: file_name.to_string(),
            position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub file_name: String,
    pub position: Option<SourcePosition>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "{}:{}: {}: {}",
                self.file_name,
                position,
                self.level.as_str(),
                self.message
            ),
            None => write!(f, "{}: {}: {}", self.file_name, self.level.as_str(), self.message),
        }
    }
}

/// Diagnostics sink consumed by every stage of the compiler
pub trait ErrorHandler {
    fn report(&self, level: DiagnosticLevel, message: String, meta: &DiagnosticMeta);

    /// Number of critical and fatal diagnostics reported so far
    fn failure_count(&self) -> usize;

    /// True once a critical or fatal diagnostic has been reported
    fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// True once an error (or anything worse) has been reported
    fn has_errors(&self) -> bool;

    fn warn(&self, message: String, meta: &DiagnosticMeta) {
        self.report(DiagnosticLevel::Warning, message, meta);
    }

    fn error(&self, message: String, meta: &DiagnosticMeta) {
        self.report(DiagnosticLevel::Error, message, meta);
    }

    fn critical(&self, message: String, meta: &DiagnosticMeta) {
        self.report(DiagnosticLevel::Critical, message, meta);
    }

    fn fatal(&self, message: String, meta: &DiagnosticMeta) {
        self.report(DiagnosticLevel::Fatal, message, meta);
    }
}

/// Buffers diagnostics of a single compilation until they are flushed.
///
/// Not `Sync`: every compilation owns its own handler.
#[derive(Debug, Default)]
pub struct StackErrorHandler {
    stack: RefCell<Vec<Diagnostic>>,
}

impl StackErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain buffered diagnostics in report order
    pub fn flush(&self) -> Vec<Diagnostic> {
        self.stack.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Snapshot of buffered diagnostics, leaving the buffer intact
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.stack.borrow().clone()
    }

    fn any_at_least(&self, level: DiagnosticLevel) -> bool {
        self.stack.borrow().iter().any(|d| d.level >= level)
    }
}

impl ErrorHandler for StackErrorHandler {
    fn report(&self, level: DiagnosticLevel, message: String, meta: &DiagnosticMeta) {
        let (line, column) = meta
            .position
            .map(|p| (p.line + 1, p.column + 1))
            .unwrap_or((0, 0));
        match level {
            DiagnosticLevel::Warning => {
                tracing::warn!(file = %meta.file_name, line, column, "{}", message)
            }
            _ => tracing::error!(
                file = %meta.file_name,
                line,
                column,
                level = level.as_str(),
                "{}",
                message
            ),
        }
        self.stack.borrow_mut().push(Diagnostic {
            level,
            message,
            file_name: meta.file_name.clone(),
            position: meta.position,
        });
    }

    fn failure_count(&self) -> usize {
        self.stack
            .borrow()
            .iter()
            .filter(|d| d.level >= DiagnosticLevel::Critical)
            .count()
    }

    fn has_errors(&self) -> bool {
        self.any_at_least(DiagnosticLevel::Error)
    }
}
