//! Compiler configuration
//!
//! Loaded from JSON (camelCase keys); every field has a default so a partial file is valid.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

use crate::error::{CompilerError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Name used in diagnostics and for module path registration
    pub file_name: String,
    /// Keep whitespace-only text between tags
    pub preserve_whitespaces: bool,
    /// Produce comment nodes instead of dropping comments
    pub preserve_comments: bool,
    /// Emit plain markup text as translation nodes
    pub generate_translations: bool,
    /// Allow `ws:partial` to reference inline templates declared in another file
    pub allow_external_inline_templates: bool,
    /// Translatable options per component physical path
    pub translatable_options: IndexMap<String, Vec<String>>,
}

impl CompilerConfig {
    pub fn new(file_name: &str) -> Self {
        CompilerConfig {
            file_name: file_name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|err| CompilerError::Config {
            message: format!("{}: {}", path.display(), err),
        })
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }
}
