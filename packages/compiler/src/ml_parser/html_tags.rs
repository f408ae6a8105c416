//! HTML Tag Definitions
//!
//! Parsing rules for the few HTML tags that need them: void elements never take children
//! and raw text elements keep their content verbatim.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    ParsableData,
}

#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub is_void: bool,
    pub content_type: TagContentType,
}

impl HtmlTagDefinition {
    pub fn new() -> Self {
        HtmlTagDefinition {
            is_void: false,
            content_type: TagContentType::ParsableData,
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self
    }

    pub fn with_content_type(mut self, content_type: TagContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

impl Default for HtmlTagDefinition {
    fn default() -> Self {
        Self::new()
    }
}

static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();
    for name in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(name, HtmlTagDefinition::new().with_void(true));
    }
    defs.insert(
        "script",
        HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
    );
    defs.insert(
        "style",
        HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
    );
    defs
});

static DEFAULT_TAG_DEFINITION: Lazy<HtmlTagDefinition> = Lazy::new(HtmlTagDefinition::new);

/// Lookup is case-insensitive; unknown tags get the default definition
pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name.to_ascii_lowercase().as_str())
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}

pub fn is_void_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).is_void
}

pub fn is_raw_text_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).content_type == TagContentType::RawText
}
