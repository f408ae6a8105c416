//! Attribute Processor Tests
//!
//! Classification of tag attributes with a custom translation description

use pretty_assertions::assert_eq;

use wasaby_compiler::diagnostics::{ErrorHandler, StackErrorHandler};
use wasaby_compiler::ml_parser::ast::{Attribute, Attributes};
use wasaby_compiler::parse_util::SourcePosition;
use wasaby_compiler::template_parser::{
    AttributeProcessor, AttributeProcessorOptions, Description, Scope, TranslationUnit,
};
use wasaby_compiler::wasaby::ast::{Ast, EventBinding, Flags, TextContent};

/// Translates `tooltip` attributes and the `caption` option of `Controls/buttons`
struct Glossary;

impl Description for Glossary {
    fn is_attribute_translatable(&self, name: &str) -> bool {
        name == "tooltip"
    }

    fn is_option_translatable(&self, component: &str, name: &str) -> bool {
        component == "Controls/buttons" && name == "caption"
    }
}

fn attributes(pairs: &[(&str, Option<&str>)]) -> Attributes {
    pairs
        .iter()
        .enumerate()
        .map(|(column, (name, value))| {
            (
                name.to_string(),
                Attribute::new(name, *value, SourcePosition::new(0, column)),
            )
        })
        .collect()
}

fn component_options(translate_text: bool) -> AttributeProcessorOptions<'static> {
    AttributeProcessorOptions {
        file_name: "Module/view.wml",
        has_attributes_only: false,
        component: Some("Controls/buttons"),
        translate_text,
        position: SourcePosition::new(0, 0),
    }
}

fn element_options() -> AttributeProcessorOptions<'static> {
    AttributeProcessorOptions {
        has_attributes_only: true,
        component: None,
        ..component_options(true)
    }
}

fn is_translation(content: &[TextContent]) -> bool {
    matches!(content, [TextContent::Translation(_)])
}

#[test]
fn should_ask_description_about_translations() {
    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let processor = AttributeProcessor::new(&handler, &scope, &Glossary);

    let result = processor.process(
        &attributes(&[("caption", Some("Save")), ("icon", Some("save"))]),
        &component_options(true),
    );
    let caption = match result.options["caption"].value.as_ref() {
        Ast::Value(node) => &node.value,
        other => panic!("Expected value, got {:?}", other),
    };
    assert!(is_translation(caption));
    match result.options["icon"].value.as_ref() {
        Ast::Value(node) => assert!(!is_translation(&node.value)),
        other => panic!("Expected value, got {:?}", other),
    }

    let result = processor.process(
        &attributes(&[("tooltip", Some("Close")), ("title", Some("Close"))]),
        &element_options(),
    );
    assert!(is_translation(&result.attributes["tooltip"].value));
    assert!(!is_translation(&result.attributes["title"].value));

    assert_eq!(
        scope.translations(),
        vec![
            TranslationUnit {
                text: "Save".to_string(),
                context: String::new(),
            },
            TranslationUnit {
                text: "Close".to_string(),
                context: String::new(),
            },
        ]
    );
    assert!(handler.is_empty());
}

#[test]
fn should_not_translate_when_disabled() {
    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let processor = AttributeProcessor::new(&handler, &scope, &Glossary);
    let result = processor.process(&attributes(&[("caption", Some("Save"))]), &component_options(false));
    assert!(result.options["caption"].value.has_flag(Flags::TYPE_CASTED));
    assert!(scope.translations().is_empty());
}

#[test]
fn should_key_each_group_separately() {
    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let processor = AttributeProcessor::new(&handler, &scope, &Glossary);
    let result = processor.process(
        &attributes(&[
            ("on:click", Some("onClick()")),
            ("attr:class", Some("big")),
            ("size", Some("l")),
            ("bind:value", Some("value")),
            ("attr:id", Some("x")),
            ("style", Some("primary")),
        ]),
        &component_options(true),
    );
    let attribute_keys: Vec<(String, usize)> = result
        .attributes
        .iter()
        .map(|(name, node)| (name.clone(), node.meta.key))
        .collect();
    assert_eq!(attribute_keys, vec![("class".to_string(), 0), ("id".to_string(), 1)]);
    let option_keys: Vec<(String, usize)> = result
        .options
        .iter()
        .map(|(name, node)| (name.clone(), node.meta.key))
        .collect();
    assert_eq!(option_keys, vec![("size".to_string(), 0), ("style".to_string(), 1)]);
    let events: Vec<(String, usize)> = result
        .events
        .iter()
        .map(|(name, binding)| {
            let key = match binding {
                EventBinding::Bind(node) => node.meta.key,
                EventBinding::Event(node) => node.meta.key,
            };
            (name.clone(), key)
        })
        .collect();
    assert_eq!(
        events,
        vec![("on:click".to_string(), 0), ("bind:value".to_string(), 1)]
    );
}

#[test]
fn should_warn_about_ignored_attributes_where_options_are_expected() {
    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let processor = AttributeProcessor::new(&handler, &scope, &Glossary);
    let options = processor.process_options(
        &attributes(&[
            ("caption", Some("Ok")),
            ("attr:class", Some("wide")),
            ("on:click", Some("onClick()")),
        ]),
        &element_options(),
    );
    assert_eq!(options.keys().collect::<Vec<_>>(), vec!["caption"]);
    let messages: Vec<String> = handler.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(
        messages,
        vec![
            "Attribute \"class\" is ignored: only options are expected here".to_string(),
            "Attribute \"on:click\" is ignored: only options are expected here".to_string(),
        ]
    );
}

#[test]
fn should_report_invalid_values_as_critical() {
    let handler = StackErrorHandler::new();
    let scope = Scope::new();
    let processor = AttributeProcessor::new(&handler, &scope, &Glossary);
    let result = processor.process(
        &attributes(&[
            ("on:click", Some("")),
            ("size", Some("{{ a + }}")),
            ("caption", Some("{{ 'open")),
        ]),
        &component_options(true),
    );
    assert!(result.events.is_empty());
    assert!(result.attributes.is_empty());
    assert!(result.options.is_empty());
    assert_eq!(handler.failure_count(), 3);
    let messages: Vec<String> = handler.flush().into_iter().map(|d| d.message).collect();
    assert!(messages[0].starts_with("Invalid event handler \"on:click\": value is empty"));
    assert!(messages[2].starts_with("Invalid option \"caption\": Unterminated expression"));
}
