//! Attribute Processor
//!
//! Classifies the raw attributes of a tag into html attributes, component options and
//! event or bind handlers.

use indexmap::IndexMap;

use super::expression_validator::{check_bind_expression, check_event_expression};
use super::i18n::Description;
use super::scope::Scope;
use super::text_processor::{TextContentFlags, TextProcessor, TextProcessorOptions};
use crate::diagnostics::{DiagnosticMeta, ErrorHandler};
use crate::error::{CompilerError, Result};
use crate::expression_parser::Parser;
use crate::ml_parser::ast::{Attribute, Attributes};
use crate::parse_util::SourcePosition;
use crate::wasaby::ast::{
    Ast, AttributeNode, BindNode, EventBinding, EventNode, Flags, NodeMeta, OptionNode, TextContent,
    ValueNode,
};

const ATTRIBUTE_PREFIX: &str = "attr:";
const BIND_PREFIX: &str = "bind:";
const EVENT_PREFIX: &str = "on:";

const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

const COLLAPSED_ATTRIBUTES: &[&str] = &["class", "style"];

#[derive(Debug, Clone, Copy)]
pub struct AttributeProcessorOptions<'a> {
    pub file_name: &'a str,
    /// Every non-event attribute is an html attribute, as on plain elements
    pub has_attributes_only: bool,
    /// Physical path of the component the attributes belong to
    pub component: Option<&'a str>,
    /// Translatable attributes and options produce translation nodes
    pub translate_text: bool,
    pub position: SourcePosition,
}

#[derive(Debug, Default)]
pub struct ProcessedAttributes {
    pub attributes: IndexMap<String, AttributeNode>,
    pub options: IndexMap<String, OptionNode>,
    pub events: IndexMap<String, EventBinding>,
}

pub struct AttributeProcessor<'a> {
    parser: Parser,
    text_processor: TextProcessor<'a>,
    handler: &'a dyn ErrorHandler,
    description: &'a dyn Description,
}

impl<'a> AttributeProcessor<'a> {
    pub fn new(handler: &'a dyn ErrorHandler, scope: &'a Scope, description: &'a dyn Description) -> Self {
        AttributeProcessor {
            parser: Parser::new(),
            text_processor: TextProcessor::new(handler, scope),
            handler,
            description,
        }
    }

    pub fn process(&self, attributes: &Attributes, options: &AttributeProcessorOptions) -> ProcessedAttributes {
        let mut result = ProcessedAttributes::default();

        for attribute in attributes.values() {
            let meta = DiagnosticMeta::new(options.file_name, attribute.position);
            let name = attribute.name.as_str();

            if let Some(property) = name.strip_prefix(BIND_PREFIX) {
                if result.events.contains_key(name) {
                    self.report_duplicate(name, &meta);
                    continue;
                }
                match self.process_bind(property, attribute, &meta) {
                    Ok(mut node) => {
                        node.meta.key = result.events.len();
                        result.events.insert(name.to_string(), EventBinding::Bind(node));
                    }
                    Err(err) => self
                        .handler
                        .critical(format!("Invalid binding \"{}\": {}", name, err), &meta),
                }
                continue;
            }

            if let Some(event) = name.strip_prefix(EVENT_PREFIX) {
                if result.events.contains_key(name) {
                    self.report_duplicate(name, &meta);
                    continue;
                }
                match self.process_event(event, attribute, &meta) {
                    Ok(mut node) => {
                        node.meta.key = result.events.len();
                        result.events.insert(name.to_string(), EventBinding::Event(node));
                    }
                    Err(err) => self
                        .handler
                        .critical(format!("Invalid event handler \"{}\": {}", name, err), &meta),
                }
                continue;
            }

            let prefixed = name.strip_prefix(ATTRIBUTE_PREFIX);
            if prefixed.is_some() || options.has_attributes_only {
                if prefixed.is_some() && options.has_attributes_only {
                    self.handler.warn(
                        format!(
                            "Prefix \"{}\" is useless on attribute \"{}\" of an html element",
                            ATTRIBUTE_PREFIX, name
                        ),
                        &meta,
                    );
                }
                let attribute_name = prefixed.unwrap_or(name);
                if result.attributes.contains_key(attribute_name) {
                    self.report_duplicate(attribute_name, &meta);
                    continue;
                }
                match self.process_attribute(attribute_name, attribute, options, &meta) {
                    Ok(mut node) => {
                        node.meta.key = result.attributes.len();
                        result.attributes.insert(attribute_name.to_string(), node);
                    }
                    Err(err) => self
                        .handler
                        .critical(format!("Invalid attribute \"{}\": {}", name, err), &meta),
                }
                continue;
            }

            if result.options.contains_key(name) {
                self.report_duplicate(name, &meta);
                continue;
            }
            match self.process_option(attribute, options, &meta) {
                Ok(mut node) => {
                    node.meta.key = result.options.len();
                    result.options.insert(name.to_string(), node);
                }
                Err(err) => self
                    .handler
                    .critical(format!("Invalid option \"{}\": {}", name, err), &meta),
            }
        }
        result
    }

    /// Process attributes where only options are expected
    pub fn process_options(
        &self,
        attributes: &Attributes,
        options: &AttributeProcessorOptions,
    ) -> IndexMap<String, OptionNode> {
        let options = AttributeProcessorOptions {
            has_attributes_only: false,
            ..*options
        };
        let processed = self.process(attributes, &options);
        for name in processed.attributes.keys().chain(processed.events.keys()) {
            self.handler.warn(
                format!("Attribute \"{}\" is ignored: only options are expected here", name),
                &DiagnosticMeta::new(options.file_name, options.position),
            );
        }
        processed.options
    }

    /// Keep expected attributes only; anything else is reported and dropped
    pub fn filter(
        &self,
        attributes: &Attributes,
        expected: &[&str],
        options: &AttributeProcessorOptions,
    ) -> Attributes {
        let mut filtered = Attributes::new();
        for (name, attribute) in attributes {
            if expected.contains(&name.as_str()) {
                filtered.insert(name.clone(), attribute.clone());
                continue;
            }
            self.handler.warn(
                format!("Unexpected attribute \"{}\" is ignored", name),
                &DiagnosticMeta::new(options.file_name, attribute.position),
            );
        }
        filtered
    }

    /// Raw value of a required attribute
    pub fn validate_value(
        &self,
        attributes: &Attributes,
        name: &str,
        _options: &AttributeProcessorOptions,
    ) -> Result<String> {
        let attribute = attributes
            .get(name)
            .ok_or_else(|| CompilerError::parse(format!("Attribute \"{}\" is required", name)))?;
        attribute
            .value
            .clone()
            .ok_or_else(|| CompilerError::parse(format!("Attribute \"{}\" has no value", name)))
    }

    fn report_duplicate(&self, name: &str, meta: &DiagnosticMeta) {
        self.handler.error(
            format!("Attribute \"{}\" is already defined; the duplicate is ignored", name),
            meta,
        );
    }

    fn process_bind(&self, property: &str, attribute: &Attribute, meta: &DiagnosticMeta) -> Result<BindNode> {
        let program = self.parse_handler_value(attribute)?;
        check_bind_expression(&program, self.handler, meta)?;
        Ok(BindNode {
            property: property.to_string(),
            value: program,
            meta: NodeMeta::at(attribute.position),
        })
    }

    fn process_event(&self, event: &str, attribute: &Attribute, meta: &DiagnosticMeta) -> Result<EventNode> {
        let program = self.parse_handler_value(attribute)?;
        check_event_expression(&program, self.handler, meta)?;
        Ok(EventNode {
            event: event.to_string(),
            handler: program,
            meta: NodeMeta::at(attribute.position),
        })
    }

    fn parse_handler_value(&self, attribute: &Attribute) -> Result<crate::expression_parser::ProgramNode> {
        let value = attribute
            .value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CompilerError::expression("value is empty".to_string()))?;
        self.parser.parse(value)
    }

    fn process_attribute(
        &self,
        name: &str,
        attribute: &Attribute,
        options: &AttributeProcessorOptions,
        meta: &DiagnosticMeta,
    ) -> Result<AttributeNode> {
        let raw_value = match attribute.value.as_deref() {
            Some(value) => value.to_string(),
            None if BOOLEAN_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()) => "true".to_string(),
            None => {
                self.handler
                    .warn(format!("Attribute \"{}\" has no value", name), meta);
                String::new()
            }
        };
        let raw_value = if COLLAPSED_ATTRIBUTES.contains(&name) {
            raw_value.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            raw_value
        };
        let value = self.process_text(
            &raw_value,
            options.translate_text && self.description.is_attribute_translatable(name),
            attribute.position,
            options,
        )?;
        Ok(AttributeNode {
            name: name.to_string(),
            value,
            meta: NodeMeta::at(attribute.position),
        })
    }

    fn process_option(
        &self,
        attribute: &Attribute,
        options: &AttributeProcessorOptions,
        meta: &DiagnosticMeta,
    ) -> Result<OptionNode> {
        let name = attribute.name.as_str();
        let raw_value = attribute.value.clone().unwrap_or_else(|| {
            self.handler
                .warn(format!("Option \"{}\" has no value", name), meta);
            String::new()
        });
        let translate = options.translate_text
            && options
                .component
                .map_or(false, |component| self.description.is_option_translatable(component, name));
        let value = self.process_text(&raw_value, translate, attribute.position, options)?;

        let mut value_meta = NodeMeta::at(attribute.position);
        value_meta.set_flag(Flags::TYPE_CASTED);
        let mut option_meta = NodeMeta::at(attribute.position);
        option_meta.set_flag(Flags::UNPACKED);
        Ok(OptionNode {
            name: name.to_string(),
            value: Box::new(Ast::Value(ValueNode {
                value,
                meta: value_meta,
            })),
            meta: option_meta,
        })
    }

    fn process_text(
        &self,
        text: &str,
        translate_text: bool,
        position: SourcePosition,
        options: &AttributeProcessorOptions,
    ) -> Result<Vec<TextContent>> {
        self.text_processor.process(
            text,
            &TextProcessorOptions {
                file_name: options.file_name,
                allowed_content: TextContentFlags::FULL_TEXT,
                translate_text,
                position,
            },
        )
    }
}
