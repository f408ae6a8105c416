//! Compiler Facade
//!
//! One call per template file: markup parse, traverse, then everything collected in scope.
//! Services holding per-compilation state are created here and dropped with the result.

use serde::Serialize;

use crate::config::CompilerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticMeta, ErrorHandler, StackErrorHandler};
use crate::ml_parser::{self, ParseOptions};
use crate::parse_util::ParseErrorLevel;
use crate::template_parser::{Scope, TranslationPolicy, TranslationUnit};
use crate::wasaby::{Ast, Traverse};

#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub file_name: String,
    pub nodes: Vec<Ast>,
    /// Component and static partial paths as written, in first-use order
    pub dependencies: Vec<String>,
    pub translations: Vec<TranslationUnit>,
    pub diagnostics: Vec<Diagnostic>,
    /// A critical or fatal diagnostic was reported; `nodes` may still be partial
    pub failed: bool,
}

/// Compile one template source
pub fn compile_template(source: &str, config: &CompilerConfig) -> CompileResult {
    let span = tracing::debug_span!("compile_template", file = %config.file_name);
    let _enter = span.enter();

    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let policy = TranslationPolicy::new(config);

    let parsed = ml_parser::parse(
        source,
        &ParseOptions {
            preserve_whitespaces: config.preserve_whitespaces,
        },
    );
    for error in &parsed.errors {
        let meta = DiagnosticMeta::new(&config.file_name, error.position);
        match error.level {
            ParseErrorLevel::Warning => handler.warn(error.msg.clone(), &meta),
            ParseErrorLevel::Error => handler.critical(error.msg.clone(), &meta),
        }
    }
    tracing::debug!(
        nodes = parsed.root_nodes.len(),
        errors = parsed.errors.len(),
        "markup parsed"
    );

    let nodes = {
        let mut traverse = Traverse::new(config, &handler, &scope, &policy);
        traverse.transform(&parsed.root_nodes)
    };

    let failed = handler.has_failures();
    let diagnostics = handler.flush();
    if failed {
        tracing::warn!(diagnostics = diagnostics.len(), "compilation failed");
    }

    CompileResult {
        file_name: config.file_name.clone(),
        nodes,
        dependencies: scope.dependencies(),
        translations: scope.translations(),
        diagnostics,
        failed,
    }
}
