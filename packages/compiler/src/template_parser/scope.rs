//! Compilation Scope
//!
//! Per-file registrar of inline templates, module dependencies and translation units.
//! Uses interior mutability so every service of one compilation can share it by reference;
//! it is not `Sync` and must never outlive its compilation.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::cell::RefCell;

use super::resolvers::Path;
use crate::error::{CompilerError, Result};
use crate::wasaby::ast::TemplateNode;

/// Text collected for the translation dictionary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TranslationUnit {
    pub text: String,
    pub context: String,
}

#[derive(Debug, Default)]
pub struct Scope {
    templates: RefCell<IndexMap<String, TemplateNode>>,
    dependencies: RefCell<IndexSet<String>>,
    translations: RefCell<IndexSet<TranslationUnit>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a module dependency; repeated paths are kept once, in first-seen order
    pub fn register_dependency(&self, path: &Path) {
        self.dependencies.borrow_mut().insert(path.get_full_path());
    }

    pub fn register_template(&self, name: &str, template: TemplateNode) -> Result<()> {
        let mut templates = self.templates.borrow_mut();
        if templates.contains_key(name) {
            return Err(CompilerError::DuplicateTemplate {
                name: name.to_string(),
            });
        }
        templates.insert(name.to_string(), template);
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.borrow().contains_key(name)
    }

    pub fn get_template(&self, name: &str) -> Option<TemplateNode> {
        self.templates.borrow().get(name).cloned()
    }

    pub fn register_translation(&self, text: &str, context: &str) {
        self.translations.borrow_mut().insert(TranslationUnit {
            text: text.to_string(),
            context: context.to_string(),
        });
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies.borrow().iter().cloned().collect()
    }

    pub fn translations(&self) -> Vec<TranslationUnit> {
        self.translations.borrow().iter().cloned().collect()
    }
}
