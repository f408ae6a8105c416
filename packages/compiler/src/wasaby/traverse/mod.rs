//! Traverse
//!
//! Turns the generic tag tree into the Wasaby AST. A recursive visitor over `ml_parser` nodes
//! driven by [`TraverseState`]: the state of the parent decides how a tag is read, and every
//! processed child narrows the state of its siblings.
//!
//! Errors raised by the services are caught at the directive being processed and reported
//! through the [`ErrorHandler`]; the directive is dropped or flagged BROKEN and traversal goes on.

pub mod context;
pub mod cycle;
pub mod literals;
pub mod state;

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::config::CompilerConfig;
use crate::diagnostics::{DiagnosticMeta, ErrorHandler};
use crate::error::Result;
use crate::expression_parser::{Parser, ProgramNode};
use crate::ml_parser::ast::{self as ml, Attributes, NodeVisitor};
use crate::parse_util::SourcePosition;
use crate::template_parser::attributes::{AttributeProcessor, AttributeProcessorOptions};
use crate::template_parser::i18n::Description;
use crate::template_parser::resolvers::{
    is_component, is_option, parse_component_name, parse_function_path, parse_template_path,
    strip_ws_prefix, Path,
};
use crate::template_parser::scope::Scope;
use crate::template_parser::text_processor::{TextContentFlags, TextProcessor, TextProcessorOptions};
use crate::wasaby::ast::*;

pub use context::TraverseContext;
pub use cycle::{parse_cycle, CycleParameters};
pub use literals::DataType;
pub use state::{ChildKind, TransitionError, TraverseState};

const CONTENT_OPTION_NAME: &str = "content";
const TEMPLATE_OPTION_NAME: &str = "template";
const LEGACY_COMPONENT_TAG: &str = "component";
/// HTML elements whose `for` attribute references a form control
const NATIVE_FOR_TAGS: &[&str] = &["label", "output"];

/// How a tag name is read, before the state is taken into account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    If,
    Else,
    For,
    Template,
    Partial,
    DataType(DataType),
    Component,
    Option,
    Element,
}

impl TagKind {
    fn of(name: &str) -> Self {
        match name {
            "ws:if" => TagKind::If,
            "ws:else" => TagKind::Else,
            "ws:for" => TagKind::For,
            "ws:template" => TagKind::Template,
            "ws:partial" => TagKind::Partial,
            _ => {
                if let Some(data_type) = DataType::from_tag_name(name) {
                    TagKind::DataType(data_type)
                } else if is_component(name) {
                    TagKind::Component
                } else if is_option(name) {
                    TagKind::Option
                } else {
                    TagKind::Element
                }
            }
        }
    }

    fn is_content_directive(&self) -> bool {
        matches!(
            self,
            TagKind::If | TagKind::Else | TagKind::For | TagKind::Partial
        )
    }
}

fn child_kind(node: &Ast) -> ChildKind {
    match node {
        Ast::Option(_) | Ast::ContentOption(_) => ChildKind::Option,
        node if node.is_data_type() => ChildKind::DataType,
        _ => ChildKind::Content,
    }
}

fn is_whitespace_text(node: &Ast) -> bool {
    matches!(node, Ast::Text(text) if text.content.iter().all(TextContent::is_whitespace))
}

/// Whitespace and comments do not decide whether a parent holds content or options
fn is_neutral(node: &Ast) -> bool {
    is_whitespace_text(node) || matches!(node, Ast::Comment(_))
}

fn keeps_neutral_children(state: TraverseState) -> bool {
    matches!(
        state,
        TraverseState::Markup
            | TraverseState::ComponentWithUnknownContent
            | TraverseState::ComponentWithContent
            | TraverseState::ObjectPropertyWithUnknownContent
            | TraverseState::ObjectPropertyWithContent
    )
}

/// Strip an optional `{{ … }}` around a directive value
fn unwrap_mustache(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix("{{")
        .and_then(|inner| inner.strip_suffix("}}"))
        .map_or(value, str::trim)
}

/// Attributes of `tag` without the named ones
fn without<'t>(attributes: &'t Attributes, names: &[&str]) -> Cow<'t, Attributes> {
    if !names.iter().any(|name| attributes.contains_key(*name)) {
        return Cow::Borrowed(attributes);
    }
    let mut filtered = attributes.clone();
    for name in names {
        filtered.shift_remove(*name);
    }
    Cow::Owned(filtered)
}

pub struct Traverse<'a> {
    config: &'a CompilerConfig,
    handler: &'a dyn ErrorHandler,
    scope: &'a Scope,
    parser: Parser,
    text_processor: TextProcessor<'a>,
    attribute_processor: AttributeProcessor<'a>,
}

impl<'a> Traverse<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        handler: &'a dyn ErrorHandler,
        scope: &'a Scope,
        description: &'a dyn Description,
    ) -> Self {
        Traverse {
            config,
            handler,
            scope,
            parser: Parser::new(),
            text_processor: TextProcessor::new(handler, scope),
            attribute_processor: AttributeProcessor::new(handler, scope, description),
        }
    }

    /// Build the AST of a whole template
    pub fn transform(&mut self, nodes: &[ml::Node]) -> Vec<Ast> {
        let context = TraverseContext::new(&self.config.file_name, self.config.generate_translations);
        self.visit_all(nodes, &context).0
    }

    /// Visit siblings in document order: drops rejected children, merges adjacent text,
    /// links else branches and assigns keys. Returns the children and the narrowed state.
    fn visit_all(&mut self, nodes: &[ml::Node], context: &TraverseContext) -> (Vec<Ast>, TraverseState) {
        let mut state = context.state;
        let mut children: Vec<Ast> = Vec::with_capacity(nodes.len());

        for node in nodes {
            let child_context = context.with_state(state);
            let Some(child) = node.accept(self, &child_context) else {
                continue;
            };

            if let Ast::Else(branch) = child {
                self.attach_else(&mut children, branch, context, node.position());
                continue;
            }

            if !is_neutral(&child) {
                match state.transition(child_kind(&child)) {
                    Ok(next) => state = next,
                    Err(err) => {
                        self.handler.fatal(err.to_string(), &context.meta(node.position()));
                        continue;
                    }
                }
            }

            if let Ast::Text(text) = child {
                if let Some(Ast::Text(previous)) = children.last_mut() {
                    previous.content.extend(text.content);
                    rekey_text_content(&mut previous.content);
                    continue;
                }
                children.push(Ast::Text(text));
            } else {
                children.push(child);
            }
        }

        if !keeps_neutral_children(state) {
            children.retain(|child| !is_neutral(child));
        }
        for (key, child) in children.iter_mut().enumerate() {
            child.set_key(key);
        }
        (children, state)
    }

    fn attach_else(
        &mut self,
        children: &mut Vec<Ast>,
        branch: ElseNode,
        context: &TraverseContext,
        position: SourcePosition,
    ) {
        let meta = context.meta(position);
        let Some(index) = children.iter().rposition(|child| !is_whitespace_text(child)) else {
            self.handler.critical(
                "Unexpected ws:else: expected if or else-if predecessor".to_string(),
                &meta,
            );
            return;
        };
        let attached = match &mut children[index] {
            Ast::If(node) if node.accepts_alternate() => {
                node.append_alternate(branch);
                true
            }
            Ast::If(_) => {
                self.handler.critical(
                    "Unexpected ws:else: the preceding ws:else has no condition and must be the last branch"
                        .to_string(),
                    &meta,
                );
                false
            }
            other => {
                self.handler.critical(
                    format!(
                        "Unexpected ws:else after {}: expected if or else-if predecessor",
                        other.kind_name()
                    ),
                    &meta,
                );
                false
            }
        };
        if attached {
            children.truncate(index + 1);
        }
    }

    fn critical(&self, message: String, context: &TraverseContext, position: SourcePosition) {
        self.handler.critical(message, &context.meta(position));
    }

    fn attribute_options<'o>(
        &self,
        context: &'o TraverseContext,
        position: SourcePosition,
        has_attributes_only: bool,
    ) -> AttributeProcessorOptions<'o> {
        AttributeProcessorOptions {
            file_name: &context.file_name,
            has_attributes_only,
            component: context.component.as_deref(),
            translate_text: context.translate_text,
            position,
        }
    }

    /// Parse a directive expression such as the `data` of `ws:if`
    fn parse_directive_value(&self, value: &str) -> Result<ProgramNode> {
        self.parser.parse(unwrap_mustache(value))
    }

    fn required_value(&self, tag: &ml::Tag, name: &str, context: &TraverseContext) -> Option<String> {
        let options = self.attribute_options(context, tag.position, true);
        let filtered = self.attribute_processor.filter(&tag.attributes, &[name], &options);
        match self.attribute_processor.validate_value(&filtered, name, &options) {
            Ok(value) => Some(value),
            Err(err) => {
                self.critical(format!("{}: {}", tag.name, err), context, tag.position);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Markup

    fn visit_markup_tag(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        match TagKind::of(&tag.name) {
            TagKind::If => self.process_if(tag, context),
            TagKind::Else => self.process_else(tag, context),
            TagKind::For => self.process_for(tag, context),
            TagKind::Template => self.process_template(tag, context),
            TagKind::Partial => self.process_unpacked(tag, &tag.attributes, context),
            TagKind::DataType(data_type) => {
                self.critical(
                    format!(
                        "Unexpected {}: data-type directives are only allowed inside an option or an array",
                        data_type
                    ),
                    context,
                    tag.position,
                );
                None
            }
            TagKind::Option => {
                self.critical(
                    format!("Unknown directive <{}>", tag.name),
                    context,
                    tag.position,
                );
                None
            }
            TagKind::Component | TagKind::Element => self.process_unpacked(tag, &tag.attributes, context),
        }
    }

    /// Unpack `if` and `for` attributes into directives wrapping the tag itself
    fn process_unpacked(&mut self, tag: &ml::Tag, attributes: &Attributes, context: &TraverseContext) -> Option<Ast> {
        let if_attribute = attributes.get("if").cloned();
        let for_attribute = if NATIVE_FOR_TAGS.contains(&tag.name.as_str()) {
            None
        } else {
            attributes.get("for").cloned()
        };
        if if_attribute.is_none() && for_attribute.is_none() {
            return self.process_markup_element(tag, attributes, context);
        }
        if if_attribute.is_some() && for_attribute.is_some() {
            self.handler.warn(
                format!(
                    "Both \"if\" and \"for\" are set on <{}>: the condition is evaluated inside every iteration",
                    tag.name
                ),
                &context.meta(tag.position),
            );
        }

        let unpacked: &[&str] = if for_attribute.is_some() { &["if", "for"] } else { &["if"] };
        let remaining = without(attributes, unpacked);
        let mut node = self.process_markup_element(tag, &remaining, context)?;

        if let Some(attribute) = if_attribute {
            tracing::debug!(tag = %tag.name, "unpacking \"if\" attribute");
            let test = match self.parse_directive_value(attribute.value.as_deref().unwrap_or_default()) {
                Ok(test) => test,
                Err(err) => {
                    self.critical(format!("Invalid \"if\" attribute on <{}>: {}", tag.name, err), context, attribute.position);
                    return None;
                }
            };
            let mut meta = NodeMeta::at(attribute.position);
            meta.set_flag(Flags::UNPACKED);
            node = Ast::If(IfNode {
                test,
                consequent: vec![node],
                alternate: None,
                meta,
            });
        }

        if let Some(attribute) = for_attribute {
            tracing::debug!(tag = %tag.name, "unpacking \"for\" attribute");
            let data = attribute.value.as_deref().unwrap_or_default();
            node = match parse_cycle(&self.parser, data) {
                Ok(parameters) => self.build_cycle(parameters, vec![node], attribute.position, Flags::UNPACKED),
                Err(err) => {
                    self.critical(format!("Invalid \"for\" attribute on <{}>: {}", tag.name, err), context, attribute.position);
                    return None;
                }
            };
        }
        Some(node)
    }

    fn process_markup_element(&mut self, tag: &ml::Tag, attributes: &Attributes, context: &TraverseContext) -> Option<Ast> {
        match TagKind::of(&tag.name) {
            TagKind::Partial => self.process_partial(tag, attributes, context),
            TagKind::Component => match parse_component_name(&tag.name) {
                Ok(path) => self.process_component(tag, attributes, path, context),
                Err(err) => {
                    self.critical(err.to_string(), context, tag.position);
                    None
                }
            },
            _ if tag.name == LEGACY_COMPONENT_TAG && attributes.contains_key("data") => {
                self.process_legacy_component(tag, attributes, context)
            }
            _ => self.process_element(tag, attributes, context),
        }
    }

    fn process_element(&mut self, tag: &ml::Tag, attributes: &Attributes, context: &TraverseContext) -> Option<Ast> {
        let options = self.attribute_options(context, tag.position, true);
        let processed = self.attribute_processor.process(attributes, &options);
        let (content, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::Markup));
        Some(Ast::Element(ElementNode {
            name: tag.name.clone(),
            data: HtmlElementData {
                attributes: processed.attributes,
                events: processed.events,
            },
            content,
            meta: NodeMeta::at(tag.position),
        }))
    }

    fn process_if(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let data = self.required_value(tag, "data", context)?;
        let test = match self.parse_directive_value(&data) {
            Ok(test) => test,
            Err(err) => {
                self.critical(format!("Invalid ws:if condition \"{}\": {}", data, err), context, tag.position);
                return None;
            }
        };
        let (consequent, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::Markup));
        Some(Ast::If(IfNode {
            test,
            consequent,
            alternate: None,
            meta: NodeMeta::at(tag.position),
        }))
    }

    fn process_else(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let options = self.attribute_options(context, tag.position, true);
        let attributes = self.attribute_processor.filter(&tag.attributes, &["data"], &options);
        let test = match attributes.get("data") {
            Some(attribute) => {
                let data = attribute.value.as_deref().unwrap_or_default();
                match self.parse_directive_value(data) {
                    Ok(test) => Some(test),
                    Err(err) => {
                        self.critical(format!("Invalid ws:else condition \"{}\": {}", data, err), context, tag.position);
                        return None;
                    }
                }
            }
            None => None,
        };
        let (consequent, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::Markup));
        Some(Ast::Else(ElseNode {
            test,
            consequent,
            alternate: None,
            meta: NodeMeta::at(tag.position),
        }))
    }

    fn process_for(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let data = self.required_value(tag, "data", context)?;
        let parameters = match parse_cycle(&self.parser, &data) {
            Ok(parameters) => parameters,
            Err(err) => {
                self.critical(format!("Invalid ws:for parameters: {}", err), context, tag.position);
                return None;
            }
        };
        let (content, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::Markup));
        Some(self.build_cycle(parameters, content, tag.position, Flags::empty()))
    }

    fn build_cycle(
        &self,
        parameters: CycleParameters,
        content: Vec<Ast>,
        position: SourcePosition,
        flags: Flags,
    ) -> Ast {
        let mut meta = NodeMeta::at(position);
        meta.set_flag(flags);
        match parameters {
            CycleParameters::For { init, test, update } => Ast::For(ForNode {
                init,
                test,
                update,
                content,
                meta,
            }),
            CycleParameters::Foreach {
                index,
                iterator,
                collection,
            } => Ast::Foreach(ForeachNode {
                index,
                iterator,
                collection,
                content,
                meta,
            }),
        }
    }

    fn process_template(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let name = self.required_value(tag, "name", context)?;
        let (content, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::Markup));
        let node = TemplateNode {
            name: name.clone(),
            content,
            meta: NodeMeta::at(tag.position),
        };
        if let Err(err) = self.scope.register_template(&name, node.clone()) {
            self.handler.error(err.to_string(), &context.meta(tag.position));
            return None;
        }
        Some(Ast::Template(node))
    }

    // -----------------------------------------------------------------------
    // Components and partials

    /// Attributes, options and children of a component-like tag. Content children are
    /// packed into one `content` option.
    fn process_wasaby_data(
        &mut self,
        tag: &ml::Tag,
        attributes: &Attributes,
        context: &TraverseContext,
    ) -> WasabyElementData {
        let options = self.attribute_options(context, tag.position, false);
        let processed = self.attribute_processor.process(attributes, &options);
        let mut data = WasabyElementData::new(HtmlElementData {
            attributes: processed.attributes,
            events: processed.events,
        });
        data.options = processed.options;

        let children_context = context.with_state(TraverseState::ComponentWithUnknownContent);
        let (children, state) = self.visit_all(&tag.children, &children_context);
        match state {
            TraverseState::ComponentWithContent => {
                tracing::debug!(tag = %tag.name, "wrapping children into content option");
                let mut meta = NodeMeta::at(tag.position);
                meta.set_flag(Flags::NEST_CASTED);
                let content = Ast::ContentOption(ContentOptionNode {
                    name: CONTENT_OPTION_NAME.to_string(),
                    content: children,
                    meta,
                });
                if let Err(err) = data.set_option(content) {
                    self.handler.error(err.to_string(), &context.meta(tag.position));
                }
            }
            TraverseState::ComponentWithOptions => {
                for child in children {
                    let position = child.meta().position.unwrap_or(tag.position);
                    if let Err(err) = data.set_option(child) {
                        self.handler.error(format!("<{}>: {}", tag.name, err), &context.meta(position));
                    }
                }
            }
            _ => {
                if !tag.is_self_closing && tag.children.is_empty() {
                    self.handler.warn(
                        format!("<{}> has no content; use a self-closing tag", tag.name),
                        &context.meta(tag.position),
                    );
                }
            }
        }
        data
    }

    fn process_component(
        &mut self,
        tag: &ml::Tag,
        attributes: &Attributes,
        path: Path,
        context: &TraverseContext,
    ) -> Option<Ast> {
        let failures = self.handler.failure_count();
        self.scope.register_dependency(&path);
        let component_context = context.with_component(&path.get_full_physical_path());
        let data = self.process_wasaby_data(tag, attributes, &component_context);
        let mut meta = NodeMeta::at(tag.position);
        if self.handler.failure_count() > failures {
            meta.set_flag(Flags::BROKEN);
        }
        Some(Ast::Component(ComponentNode { path, data, meta }))
    }

    fn process_legacy_component(
        &mut self,
        tag: &ml::Tag,
        attributes: &Attributes,
        context: &TraverseContext,
    ) -> Option<Ast> {
        let name = attributes
            .get("data")
            .and_then(|attribute| attribute.value.clone())
            .unwrap_or_default();
        self.handler.warn(
            format!(
                "<component data=\"{}\"> is deprecated; use <{}/> instead",
                name,
                name.replace('/', ".")
            ),
            &context.meta(tag.position),
        );
        match parse_template_path(name.trim()) {
            Ok(path) => {
                let remaining = without(attributes, &["data"]);
                self.process_component(tag, &remaining, path, context)
            }
            Err(err) => {
                self.critical(err.to_string(), context, tag.position);
                None
            }
        }
    }

    fn process_partial(&mut self, tag: &ml::Tag, attributes: &Attributes, context: &TraverseContext) -> Option<Ast> {
        let failures = self.handler.failure_count();
        let mut data = self.process_wasaby_data(tag, attributes, context);
        let Some(template) = data.remove_option(TEMPLATE_OPTION_NAME) else {
            self.critical(
                "ws:partial requires the \"template\" option".to_string(),
                context,
                tag.position,
            );
            return None;
        };
        let mut node = match self.resolve_partial_template(&template, context, tag.position)? {
            PartialTarget::Dynamic(expression) => Ast::DynamicPartial(DynamicPartialNode {
                expression,
                data,
                meta: NodeMeta::default(),
            }),
            PartialTarget::Static(path) => {
                self.scope.register_dependency(&path);
                Ast::StaticPartial(StaticPartialNode {
                    path,
                    data,
                    meta: NodeMeta::default(),
                })
            }
            PartialTarget::Inline(name) => {
                if !self.scope.has_template(&name) && !self.config.allow_external_inline_templates {
                    self.critical(
                        format!("Inline template \"{}\" is not defined in this file", name),
                        context,
                        tag.position,
                    );
                    return None;
                }
                Ast::InlineTemplate(InlineTemplateNode {
                    name,
                    data,
                    meta: NodeMeta::default(),
                })
            }
        };
        *node.meta_mut() = NodeMeta::at(tag.position);
        if self.handler.failure_count() > failures {
            node.set_flag(Flags::BROKEN);
        }
        Some(node)
    }

    fn resolve_partial_template(
        &self,
        template: &OptionNode,
        context: &TraverseContext,
        position: SourcePosition,
    ) -> Option<PartialTarget> {
        let parts: Vec<&TextContent> = match template.value.as_ref() {
            Ast::Value(value) => value.value.iter().filter(|item| !item.is_whitespace()).collect(),
            other => {
                self.critical(
                    format!("Incorrectly specified template option: unexpected {}", other.kind_name()),
                    context,
                    position,
                );
                return None;
            }
        };
        match parts.as_slice() {
            [] => {
                self.critical("Template option of ws:partial is empty".to_string(), context, position);
                None
            }
            [TextContent::Expression(expression)] => Some(PartialTarget::Dynamic(expression.program.clone())),
            [TextContent::Translation(_)] => {
                self.critical(
                    "Template option of ws:partial cannot be a translation".to_string(),
                    context,
                    position,
                );
                None
            }
            [TextContent::TextData(text)] => {
                let value = text.content.trim();
                if value.contains(['/', '.', '!']) {
                    match parse_template_path(value) {
                        Ok(path) => Some(PartialTarget::Static(path)),
                        Err(err) => {
                            self.critical(err.to_string(), context, position);
                            None
                        }
                    }
                } else {
                    Some(PartialTarget::Inline(value.to_string()))
                }
            }
            _ => {
                self.handler.fatal(
                    "Incorrectly specified template option: expected a single expression or template name"
                        .to_string(),
                    &context.meta(position),
                );
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Options

    fn process_option(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let name = strip_ws_prefix(&tag.name).to_string();

        if let Some(attribute) = tag.attributes.get("type") {
            let declared = attribute.value.as_deref().unwrap_or_default();
            match DataType::from_type_attribute(declared) {
                Some(DataType::String) if is_legacy_string_content(tag) => {}
                Some(data_type) => return self.cast_option_with_type(tag, name, data_type, context),
                None => self.handler.warn(
                    format!("Unknown type \"{}\" of option \"{}\" is ignored", declared, name),
                    &context.meta(attribute.position),
                ),
            }
        }

        let attributes = without(&tag.attributes, &["type"]);
        let options = self.attribute_options(context, tag.position, false);
        let attribute_options = self.attribute_processor.process_options(&attributes, &options);
        let property_context = context
            .with_state(TraverseState::ObjectPropertyWithUnknownContent)
            .with_explicit_data_type(None);
        let (children, state) = self.visit_all(&tag.children, &property_context);
        let meta = NodeMeta::at(tag.position);

        if !attribute_options.is_empty() && !matches!(
            state,
            TraverseState::ObjectPropertyWithUnknownContent | TraverseState::ObjectPropertyWithContentTypeCastedToObject
        ) {
            self.handler.warn(
                format!("Attributes of option \"{}\" are ignored because it has content", name),
                &context.meta(tag.position),
            );
        }

        let value = match state {
            TraverseState::ObjectPropertyWithContent => {
                return Some(Ast::ContentOption(ContentOptionNode {
                    name,
                    content: children,
                    meta,
                }));
            }
            TraverseState::ObjectPropertyWithDataType => children.into_iter().next()?,
            TraverseState::ObjectPropertyWithContentTypeCastedToArray => Ast::Array(ArrayNode {
                elements: children,
                meta: NodeMeta::at(tag.position),
            }),
            TraverseState::ObjectPropertyWithContentTypeCastedToObject => {
                let mut object = ObjectNode::new(NodeMeta::at(tag.position));
                self.fill_object(&mut object, attribute_options, children, context);
                Ast::Object(object)
            }
            _ if !attribute_options.is_empty() => {
                let mut object_meta = NodeMeta::at(tag.position);
                object_meta.set_flag(Flags::UNPACKED);
                let mut object = ObjectNode::new(object_meta);
                self.fill_object(&mut object, attribute_options, Vec::new(), context);
                Ast::Object(object)
            }
            _ => Ast::Value(ValueNode {
                value: Vec::new(),
                meta: NodeMeta::at(tag.position),
            }),
        };
        Some(Ast::Option(OptionNode {
            name,
            value: Box::new(value),
            meta,
        }))
    }

    fn cast_option_with_type(
        &mut self,
        tag: &ml::Tag,
        name: String,
        data_type: DataType,
        context: &TraverseContext,
    ) -> Option<Ast> {
        let attributes = without(&tag.attributes, &["type"]);
        let cast_context = context.with_explicit_data_type(Some(data_type));
        let mut value = self.build_literal(tag, &attributes, data_type, &cast_context)?;
        value.set_flag(Flags::OBVIOUSLY_TYPE_CASTED);
        Some(Ast::Option(OptionNode {
            name,
            value: Box::new(value),
            meta: NodeMeta::at(tag.position),
        }))
    }

    fn fill_object(
        &self,
        object: &mut ObjectNode,
        options: IndexMap<String, OptionNode>,
        children: Vec<Ast>,
        context: &TraverseContext,
    ) {
        let properties = options.into_values().map(Ast::Option).chain(children);
        for property in properties {
            let position = property.meta().position;
            if let Err(err) = object.set_property(property) {
                let meta = match position {
                    Some(position) => context.meta(position),
                    None => DiagnosticMeta::file(&context.file_name),
                };
                self.handler.error(err.to_string(), &meta);
            }
        }
        for (key, property) in object.properties.values_mut().enumerate() {
            property.set_key(key);
        }
    }

    // -----------------------------------------------------------------------
    // Data literals

    fn process_data_type(&mut self, tag: &ml::Tag, data_type: DataType, context: &TraverseContext) -> Option<Ast> {
        let context = context.with_explicit_data_type(None);
        self.build_literal(tag, &tag.attributes, data_type, &context)
    }

    fn build_literal(
        &mut self,
        tag: &ml::Tag,
        attributes: &Attributes,
        data_type: DataType,
        context: &TraverseContext,
    ) -> Option<Ast> {
        let meta = NodeMeta::at(tag.position);
        let literal = match data_type {
            DataType::Array => {
                let (elements, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::ArrayDataType));
                Ast::Array(ArrayNode { elements, meta })
            }
            DataType::Object => return self.build_object(tag, attributes, context),
            DataType::Function => {
                let content = self.collect_text(tag, data_type, context)?;
                let path = literals::validate_function(&content).and_then(|path| parse_function_path(&path));
                let path = match path {
                    Ok(path) => path,
                    Err(err) => {
                        self.critical(format!("{}: {}", data_type, err), context, tag.position);
                        return None;
                    }
                };
                let options = self.attribute_options(context, tag.position, false);
                let options = self.attribute_processor.process_options(attributes, &options);
                Ast::Function(FunctionNode { path, options, meta })
            }
            DataType::Boolean => {
                let value = self.collect_text(tag, data_type, context)?;
                if let Err(err) = literals::validate_boolean(&value) {
                    self.critical(err.to_string(), context, tag.position);
                    return None;
                }
                Ast::Boolean(BooleanNode { value, meta })
            }
            DataType::Number => {
                let value = self.collect_text(tag, data_type, context)?;
                if let Err(err) = literals::validate_number(&value) {
                    self.critical(err.to_string(), context, tag.position);
                    return None;
                }
                Ast::Number(NumberNode { value, meta })
            }
            DataType::String => Ast::String(StringNode {
                value: self.collect_text(tag, data_type, context)?,
                meta,
            }),
            DataType::Value => Ast::Value(ValueNode {
                value: self.collect_text(tag, data_type, context)?,
                meta,
            }),
        };
        Some(literal)
    }

    fn build_object(&mut self, tag: &ml::Tag, attributes: &Attributes, context: &TraverseContext) -> Option<Ast> {
        let meaningful: Vec<&ml::Node> = tag
            .children
            .iter()
            .filter(|child| match child {
                ml::Node::Text(text) => !text.data.trim().is_empty(),
                ml::Node::Comment(_) => false,
                _ => true,
            })
            .collect();

        // <ws:Object>text</ws:Object> reads as a value
        if !meaningful.is_empty() && meaningful.iter().all(|child| matches!(child, ml::Node::Text(_))) {
            let value = self.collect_text(tag, DataType::Value, context)?;
            return Some(Ast::Value(ValueNode {
                value,
                meta: NodeMeta::at(tag.position),
            }));
        }
        // <ws:Object><ws:Array>…</ws:Array></ws:Object> reads as the inner literal
        if let [ml::Node::Tag(inner)] = meaningful.as_slice() {
            if let Some(data_type) = DataType::from_tag_name(&inner.name) {
                return self.process_data_type(inner, data_type, context);
            }
        }

        let options = self.attribute_options(context, tag.position, false);
        let attribute_options = self.attribute_processor.process_options(attributes, &options);
        let (children, _) = self.visit_all(&tag.children, &context.with_state(TraverseState::ObjectDataType));
        let mut object = ObjectNode::new(NodeMeta::at(tag.position));
        self.fill_object(&mut object, attribute_options, children, context);
        Some(Ast::Object(object))
    }

    /// Text of a scalar literal, visited in the literal's leaf state
    fn collect_text(&mut self, tag: &ml::Tag, data_type: DataType, context: &TraverseContext) -> Option<Vec<TextContent>> {
        let failures = self.handler.failure_count();
        let leaf_context = context.with_state(data_type.state());
        let mut content = Vec::new();
        for child in &tag.children {
            if let Some(Ast::Text(text)) = child.accept(self, &leaf_context) {
                content.extend(text.content);
            }
        }
        if self.handler.failure_count() > failures {
            return None;
        }
        rekey_text_content(&mut content);
        Some(content)
    }

    /// A tag inside a scalar literal: reported as a duplicated type when it repeats the
    /// type declared by the enclosing option
    fn test_double_type_definition(&self, tag: &ml::Tag, context: &TraverseContext) {
        let nested = DataType::from_tag_name(&tag.name);
        match (context.explicit_data_type, nested) {
            (Some(declared), Some(nested)) if declared == nested => self.critical(
                format!(
                    "Double type definition: the option is already cast to {} by its \"type\" attribute",
                    declared
                ),
                context,
                tag.position,
            ),
            _ => self.critical(
                format!("Tags are not allowed here, found <{}>", tag.name),
                context,
                tag.position,
            ),
        }
    }

    fn process_text(&self, text: &ml::Text, context: &TraverseContext) -> Option<Ast> {
        let (allowed_content, translate_text) = match context.state {
            TraverseState::FunctionDataType => (TextContentFlags::TEXT, false),
            state if state.is_text_data_type() => (TextContentFlags::FULL_TEXT, false),
            _ => (TextContentFlags::FULL_TEXT, context.translate_text),
        };
        let options = TextProcessorOptions {
            file_name: &context.file_name,
            allowed_content,
            translate_text,
            position: text.position,
        };
        match self.text_processor.process(&text.data, &options) {
            Ok(content) => Some(Ast::Text(TextNode {
                content,
                meta: NodeMeta::at(text.position),
            })),
            Err(err) => {
                self.critical(err.to_string(), context, text.position);
                None
            }
        }
    }
}

enum PartialTarget {
    Dynamic(ProgramNode),
    Static(Path),
    Inline(String),
}

/// Legacy `type="string"` options holding text or a single literal keep their plain reading
fn is_legacy_string_content(tag: &ml::Tag) -> bool {
    let tags: Vec<&ml::Tag> = tag.children.iter().filter_map(ml::Node::as_tag).collect();
    match tags.as_slice() {
        [] => true,
        [inner] => DataType::from_tag_name(&inner.name).is_some(),
        _ => false,
    }
}

impl<'a> NodeVisitor for Traverse<'a> {
    type Context = TraverseContext;
    type Output = Option<Ast>;

    fn visit_tag(&mut self, tag: &ml::Tag, context: &TraverseContext) -> Option<Ast> {
        let kind = TagKind::of(&tag.name);
        match context.state {
            TraverseState::Markup => self.visit_markup_tag(tag, context),

            TraverseState::ComponentWithUnknownContent
            | TraverseState::ComponentWithContent
            | TraverseState::ComponentWithOptions => match kind {
                TagKind::Option => self.process_option(tag, context),
                TagKind::DataType(data_type) => {
                    self.critical(
                        format!(
                            "Unexpected {}: data-type directives are only allowed inside an option or an array",
                            data_type
                        ),
                        context,
                        tag.position,
                    );
                    None
                }
                _ => self.visit_markup_tag(tag, &context.with_state(TraverseState::Markup)),
            },

            TraverseState::ArrayDataType => match kind {
                TagKind::DataType(data_type) => self.process_data_type(tag, data_type, context),
                _ => {
                    self.critical(
                        format!("Unexpected <{}>: only data types are allowed in ws:Array", tag.name),
                        context,
                        tag.position,
                    );
                    None
                }
            },

            TraverseState::ObjectDataType => match kind {
                TagKind::Option => self.process_option(tag, context),
                kind if kind.is_content_directive() => {
                    self.critical(
                        format!("Directive <{}> is not allowed in ws:Object", tag.name),
                        context,
                        tag.position,
                    );
                    None
                }
                _ => {
                    self.critical(
                        format!("Unexpected <{}>: only options are allowed in ws:Object", tag.name),
                        context,
                        tag.position,
                    );
                    None
                }
            },

            TraverseState::ObjectPropertyWithUnknownContent
            | TraverseState::ObjectPropertyWithContent
            | TraverseState::ObjectPropertyWithDataType
            | TraverseState::ObjectPropertyWithContentTypeCastedToArray
            | TraverseState::ObjectPropertyWithContentTypeCastedToObject => match kind {
                TagKind::DataType(data_type) => self.process_data_type(tag, data_type, context),
                TagKind::Option => self.process_option(tag, context),
                _ => self.visit_markup_tag(tag, &context.with_state(TraverseState::Markup)),
            },

            TraverseState::BooleanDataType
            | TraverseState::FunctionDataType
            | TraverseState::NumberDataType
            | TraverseState::StringDataType
            | TraverseState::ValueDataType => {
                self.test_double_type_definition(tag, context);
                None
            }
        }
    }

    fn visit_text(&mut self, text: &ml::Text, context: &TraverseContext) -> Option<Ast> {
        match context.state {
            TraverseState::ArrayDataType | TraverseState::ObjectDataType => {
                if !text.data.trim().is_empty() {
                    self.critical(
                        format!("Unexpected text \"{}\": only tags are allowed here", text.data.trim()),
                        context,
                        text.position,
                    );
                }
                None
            }
            _ => self.process_text(text, context),
        }
    }

    fn visit_comment(&mut self, comment: &ml::Comment, _context: &TraverseContext) -> Option<Ast> {
        if !self.config.preserve_comments {
            return None;
        }
        Some(Ast::Comment(CommentNode {
            data: comment.data.clone(),
            meta: NodeMeta::at(comment.position),
        }))
    }

    fn visit_cdata(&mut self, cdata: &ml::CData, _context: &TraverseContext) -> Option<Ast> {
        Some(Ast::CData(CDataNode {
            data: cdata.data.clone(),
            meta: NodeMeta::at(cdata.position),
        }))
    }

    fn visit_doctype(&mut self, doctype: &ml::Doctype, _context: &TraverseContext) -> Option<Ast> {
        Some(Ast::Doctype(DoctypeNode {
            data: doctype.data.clone(),
            meta: NodeMeta::at(doctype.position),
        }))
    }

    fn visit_instruction(&mut self, instruction: &ml::Instruction, _context: &TraverseContext) -> Option<Ast> {
        Some(Ast::Instruction(InstructionNode {
            data: instruction.data.clone(),
            meta: NodeMeta::at(instruction.position),
        }))
    }
}
