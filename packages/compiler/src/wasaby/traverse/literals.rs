//! Data Literals
//!
//! The seven `ws:` data type directives and the checks applied to their text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::state::TraverseState;
use crate::error::{CompilerError, Result};
use crate::wasaby::ast::TextContent;

static NUMBER_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?|0[xX][0-9a-fA-F]+|0[bB][01]+|0[oO][0-7]+|Infinity|NaN)$").unwrap()
});

static FUNCTION_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:js!|tmpl!)?[\w/.\-$]+(?::[\w.$]+)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Array,
    Boolean,
    Function,
    Number,
    Object,
    String,
    Value,
}

impl DataType {
    /// `ws:Array`, `ws:Boolean`, …
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name.strip_prefix("ws:")? {
            "Array" => Some(DataType::Array),
            "Boolean" => Some(DataType::Boolean),
            "Function" => Some(DataType::Function),
            "Number" => Some(DataType::Number),
            "Object" => Some(DataType::Object),
            "String" => Some(DataType::String),
            "Value" => Some(DataType::Value),
            _ => None,
        }
    }

    /// Value of a `type="…"` attribute, case-insensitive
    pub fn from_type_attribute(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "array" => Some(DataType::Array),
            "boolean" => Some(DataType::Boolean),
            "function" => Some(DataType::Function),
            "number" => Some(DataType::Number),
            "object" => Some(DataType::Object),
            "string" => Some(DataType::String),
            "value" => Some(DataType::Value),
            _ => None,
        }
    }

    pub fn state(&self) -> TraverseState {
        match self {
            DataType::Array => TraverseState::ArrayDataType,
            DataType::Boolean => TraverseState::BooleanDataType,
            DataType::Function => TraverseState::FunctionDataType,
            DataType::Number => TraverseState::NumberDataType,
            DataType::Object => TraverseState::ObjectDataType,
            DataType::String => TraverseState::StringDataType,
            DataType::Value => TraverseState::ValueDataType,
        }
    }

    pub fn tag_name(&self) -> &'static str {
        match self {
            DataType::Array => "ws:Array",
            DataType::Boolean => "ws:Boolean",
            DataType::Function => "ws:Function",
            DataType::Number => "ws:Number",
            DataType::Object => "ws:Object",
            DataType::String => "ws:String",
            DataType::Value => "ws:Value",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Content without whitespace-only text runs
fn meaningful(content: &[TextContent]) -> Vec<&TextContent> {
    content.iter().filter(|item| !item.is_whitespace()).collect()
}

fn reject_translations(data_type: DataType, content: &[&TextContent]) -> Result<()> {
    if content.iter().any(|item| matches!(item, TextContent::Translation(_))) {
        return Err(CompilerError::parse(format!(
            "Translations are not allowed in {}",
            data_type
        )));
    }
    Ok(())
}

/// A single text literal, or expressions only
fn check_scalar(
    data_type: DataType,
    content: &[TextContent],
    is_valid: impl Fn(&str) -> bool,
) -> Result<()> {
    let content = meaningful(content);
    reject_translations(data_type, &content)?;
    let texts: Vec<&str> = content
        .iter()
        .filter_map(|item| match item {
            TextContent::TextData(node) => Some(node.content.trim()),
            _ => None,
        })
        .collect();
    match texts.as_slice() {
        [] => Ok(()),
        [text] if content.len() == 1 && is_valid(text) => Ok(()),
        _ => Err(CompilerError::parse(format!(
            "Invalid {} value \"{}\"",
            data_type,
            texts.join("")
        ))),
    }
}

pub fn validate_boolean(content: &[TextContent]) -> Result<()> {
    check_scalar(DataType::Boolean, content, |text| text == "true" || text == "false")
}

pub fn validate_number(content: &[TextContent]) -> Result<()> {
    check_scalar(DataType::Number, content, |text| NUMBER_REGEXP.is_match(text))
}

/// The function path written inside `ws:Function`
pub fn validate_function(content: &[TextContent]) -> Result<String> {
    let content = meaningful(content);
    match content.as_slice() {
        [TextContent::TextData(node)] if FUNCTION_REGEXP.is_match(node.content.trim()) => {
            Ok(node.content.trim().to_string())
        }
        [TextContent::TextData(node)] => Err(CompilerError::parse(format!(
            "Invalid function path \"{}\"",
            node.content.trim()
        ))),
        [] => Err(CompilerError::parse("Function path is empty")),
        _ => Err(CompilerError::parse(
            "Function path must be plain text without expressions or translations",
        )),
    }
}
