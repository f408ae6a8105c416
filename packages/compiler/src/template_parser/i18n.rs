//! Translation Policy
//!
//! Answers whether an attribute or a component option holds translatable text.

use indexmap::IndexMap;

use crate::config::CompilerConfig;

const TRANSLATABLE_ATTRIBUTES: &[&str] = &["title", "alt", "placeholder", "aria-label"];

pub trait Description {
    fn is_attribute_translatable(&self, name: &str) -> bool;

    /// `component` is the full physical path of the component module
    fn is_option_translatable(&self, component: &str, name: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct TranslationPolicy {
    translatable_options: IndexMap<String, Vec<String>>,
}

impl TranslationPolicy {
    pub fn new(config: &CompilerConfig) -> Self {
        TranslationPolicy {
            translatable_options: config.translatable_options.clone(),
        }
    }
}

impl Description for TranslationPolicy {
    fn is_attribute_translatable(&self, name: &str) -> bool {
        TRANSLATABLE_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str())
    }

    fn is_option_translatable(&self, component: &str, name: &str) -> bool {
        self.translatable_options
            .get(component)
            .map_or(false, |options| options.iter().any(|o| o == name))
    }
}
