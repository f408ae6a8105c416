//! Wasaby AST
//!
//! Typed tree produced by the traverse engine. Four node families:
//! html nodes, wasaby directives, data literals and structural nodes (attributes, options,
//! bindings, events). Text primitives live inside text-bearing nodes as [`TextContent`].

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CompilerError, Result};
use crate::expression_parser::ProgramNode;
use crate::parse_util::SourcePosition;
use crate::template_parser::resolvers::Path;

bitflags! {
    /// Provenance facts of a node; flags are only ever added
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Flags: u16 {
        const VALIDATED = 1 << 0;
        const BROKEN = 1 << 1;
        const UNKNOWN = 1 << 2;
        /// Produced from attribute sugar rather than from a tag
        const UNPACKED = 1 << 3;
        const TYPE_CASTED = 1 << 4;
        const TARGET_TYPE_CASTED = 1 << 5;
        const NEST_CASTED = 1 << 6;
        const IGNORABLE = 1 << 7;
        /// Cast through an explicit `type="…"` attribute
        const OBVIOUSLY_TYPE_CASTED = Self::TYPE_CASTED.bits() | Self::TARGET_TYPE_CASTED.bits();
    }
}

/// Data shared by every node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeMeta {
    pub key: usize,
    pub flags: Flags,
    pub position: Option<SourcePosition>,
}

impl NodeMeta {
    pub fn at(position: SourcePosition) -> Self {
        NodeMeta {
            key: 0,
            flags: Flags::empty(),
            position: Some(position),
        }
    }

    pub fn set_flag(&mut self, flag: Flags) {
        self.flags |= flag;
    }

    /// True only when every bit of `flag` is set
    pub fn has_flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_obviously_type_casted(&self) -> bool {
        self.has_flag(Flags::OBVIOUSLY_TYPE_CASTED)
    }
}

/// Visitor over the closed set of AST node kinds
pub trait AstVisitor {
    type Context;
    type Output;

    fn visit_element(&mut self, node: &ElementNode, context: &Self::Context) -> Self::Output;
    fn visit_doctype(&mut self, node: &DoctypeNode, context: &Self::Context) -> Self::Output;
    fn visit_cdata(&mut self, node: &CDataNode, context: &Self::Context) -> Self::Output;
    fn visit_instruction(&mut self, node: &InstructionNode, context: &Self::Context) -> Self::Output;
    fn visit_comment(&mut self, node: &CommentNode, context: &Self::Context) -> Self::Output;
    fn visit_text(&mut self, node: &TextNode, context: &Self::Context) -> Self::Output;

    fn visit_template(&mut self, node: &TemplateNode, context: &Self::Context) -> Self::Output;
    fn visit_inline_template(&mut self, node: &InlineTemplateNode, context: &Self::Context) -> Self::Output;
    fn visit_static_partial(&mut self, node: &StaticPartialNode, context: &Self::Context) -> Self::Output;
    fn visit_dynamic_partial(&mut self, node: &DynamicPartialNode, context: &Self::Context) -> Self::Output;
    fn visit_component(&mut self, node: &ComponentNode, context: &Self::Context) -> Self::Output;
    fn visit_if(&mut self, node: &IfNode, context: &Self::Context) -> Self::Output;
    fn visit_else(&mut self, node: &ElseNode, context: &Self::Context) -> Self::Output;
    fn visit_for(&mut self, node: &ForNode, context: &Self::Context) -> Self::Output;
    fn visit_foreach(&mut self, node: &ForeachNode, context: &Self::Context) -> Self::Output;

    fn visit_array(&mut self, node: &ArrayNode, context: &Self::Context) -> Self::Output;
    fn visit_boolean(&mut self, node: &BooleanNode, context: &Self::Context) -> Self::Output;
    fn visit_function(&mut self, node: &FunctionNode, context: &Self::Context) -> Self::Output;
    fn visit_number(&mut self, node: &NumberNode, context: &Self::Context) -> Self::Output;
    fn visit_object(&mut self, node: &ObjectNode, context: &Self::Context) -> Self::Output;
    fn visit_string(&mut self, node: &StringNode, context: &Self::Context) -> Self::Output;
    fn visit_value(&mut self, node: &ValueNode, context: &Self::Context) -> Self::Output;

    fn visit_text_data(&mut self, node: &TextDataNode, context: &Self::Context) -> Self::Output;
    fn visit_expression(&mut self, node: &ExpressionNode, context: &Self::Context) -> Self::Output;
    fn visit_translation(&mut self, node: &TranslationNode, context: &Self::Context) -> Self::Output;

    fn visit_attribute(&mut self, node: &AttributeNode, context: &Self::Context) -> Self::Output;
    fn visit_option(&mut self, node: &OptionNode, context: &Self::Context) -> Self::Output;
    fn visit_content_option(&mut self, node: &ContentOptionNode, context: &Self::Context) -> Self::Output;
    fn visit_bind(&mut self, node: &BindNode, context: &Self::Context) -> Self::Output;
    fn visit_event(&mut self, node: &EventNode, context: &Self::Context) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Ast {
    Element(ElementNode),
    Doctype(DoctypeNode),
    CData(CDataNode),
    Instruction(InstructionNode),
    Comment(CommentNode),
    Text(TextNode),

    Template(TemplateNode),
    InlineTemplate(InlineTemplateNode),
    StaticPartial(StaticPartialNode),
    DynamicPartial(DynamicPartialNode),
    Component(ComponentNode),
    If(IfNode),
    Else(ElseNode),
    For(ForNode),
    Foreach(ForeachNode),

    Array(ArrayNode),
    Boolean(BooleanNode),
    Function(FunctionNode),
    Number(NumberNode),
    Object(ObjectNode),
    String(StringNode),
    Value(ValueNode),

    Attribute(AttributeNode),
    Option(OptionNode),
    ContentOption(ContentOptionNode),
    Bind(BindNode),
    Event(EventNode),
}

macro_rules! for_each_variant {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            Ast::Element($node) => $body,
            Ast::Doctype($node) => $body,
            Ast::CData($node) => $body,
            Ast::Instruction($node) => $body,
            Ast::Comment($node) => $body,
            Ast::Text($node) => $body,
            Ast::Template($node) => $body,
            Ast::InlineTemplate($node) => $body,
            Ast::StaticPartial($node) => $body,
            Ast::DynamicPartial($node) => $body,
            Ast::Component($node) => $body,
            Ast::If($node) => $body,
            Ast::Else($node) => $body,
            Ast::For($node) => $body,
            Ast::Foreach($node) => $body,
            Ast::Array($node) => $body,
            Ast::Boolean($node) => $body,
            Ast::Function($node) => $body,
            Ast::Number($node) => $body,
            Ast::Object($node) => $body,
            Ast::String($node) => $body,
            Ast::Value($node) => $body,
            Ast::Attribute($node) => $body,
            Ast::Option($node) => $body,
            Ast::ContentOption($node) => $body,
            Ast::Bind($node) => $body,
            Ast::Event($node) => $body,
        }
    };
}

impl Ast {
    pub fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V, context: &V::Context) -> V::Output {
        match self {
            Ast::Element(n) => visitor.visit_element(n, context),
            Ast::Doctype(n) => visitor.visit_doctype(n, context),
            Ast::CData(n) => visitor.visit_cdata(n, context),
            Ast::Instruction(n) => visitor.visit_instruction(n, context),
            Ast::Comment(n) => visitor.visit_comment(n, context),
            Ast::Text(n) => visitor.visit_text(n, context),
            Ast::Template(n) => visitor.visit_template(n, context),
            Ast::InlineTemplate(n) => visitor.visit_inline_template(n, context),
            Ast::StaticPartial(n) => visitor.visit_static_partial(n, context),
            Ast::DynamicPartial(n) => visitor.visit_dynamic_partial(n, context),
            Ast::Component(n) => visitor.visit_component(n, context),
            Ast::If(n) => visitor.visit_if(n, context),
            Ast::Else(n) => visitor.visit_else(n, context),
            Ast::For(n) => visitor.visit_for(n, context),
            Ast::Foreach(n) => visitor.visit_foreach(n, context),
            Ast::Array(n) => visitor.visit_array(n, context),
            Ast::Boolean(n) => visitor.visit_boolean(n, context),
            Ast::Function(n) => visitor.visit_function(n, context),
            Ast::Number(n) => visitor.visit_number(n, context),
            Ast::Object(n) => visitor.visit_object(n, context),
            Ast::String(n) => visitor.visit_string(n, context),
            Ast::Value(n) => visitor.visit_value(n, context),
            Ast::Attribute(n) => visitor.visit_attribute(n, context),
            Ast::Option(n) => visitor.visit_option(n, context),
            Ast::ContentOption(n) => visitor.visit_content_option(n, context),
            Ast::Bind(n) => visitor.visit_bind(n, context),
            Ast::Event(n) => visitor.visit_event(n, context),
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        for_each_variant!(self, node => &node.meta)
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        for_each_variant!(self, node => &mut node.meta)
    }

    pub fn set_key(&mut self, key: usize) {
        self.meta_mut().key = key;
    }

    pub fn set_flag(&mut self, flag: Flags) {
        self.meta_mut().set_flag(flag);
    }

    pub fn has_flag(&self, flag: Flags) -> bool {
        self.meta().has_flag(flag)
    }

    pub fn with_flag(mut self, flag: Flags) -> Self {
        self.set_flag(flag);
        self
    }

    /// Concrete node kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Ast::Element(_) => "ElementNode",
            Ast::Doctype(_) => "DoctypeNode",
            Ast::CData(_) => "CDataNode",
            Ast::Instruction(_) => "InstructionNode",
            Ast::Comment(_) => "CommentNode",
            Ast::Text(_) => "TextNode",
            Ast::Template(_) => "TemplateNode",
            Ast::InlineTemplate(_) => "InlineTemplateNode",
            Ast::StaticPartial(_) => "StaticPartialNode",
            Ast::DynamicPartial(_) => "DynamicPartialNode",
            Ast::Component(_) => "ComponentNode",
            Ast::If(_) => "IfNode",
            Ast::Else(_) => "ElseNode",
            Ast::For(_) => "ForNode",
            Ast::Foreach(_) => "ForeachNode",
            Ast::Array(_) => "ArrayNode",
            Ast::Boolean(_) => "BooleanNode",
            Ast::Function(_) => "FunctionNode",
            Ast::Number(_) => "NumberNode",
            Ast::Object(_) => "ObjectNode",
            Ast::String(_) => "StringNode",
            Ast::Value(_) => "ValueNode",
            Ast::Attribute(_) => "AttributeNode",
            Ast::Option(_) => "OptionNode",
            Ast::ContentOption(_) => "ContentOptionNode",
            Ast::Bind(_) => "BindNode",
            Ast::Event(_) => "EventNode",
        }
    }

    /// Data literal nodes: the values allowed inside arrays and typed options
    pub fn is_data_type(&self) -> bool {
        matches!(
            self,
            Ast::Array(_)
                | Ast::Boolean(_)
                | Ast::Function(_)
                | Ast::Number(_)
                | Ast::Object(_)
                | Ast::String(_)
                | Ast::Value(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Text primitives

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TextContent {
    TextData(TextDataNode),
    Expression(ExpressionNode),
    Translation(TranslationNode),
}

impl TextContent {
    pub fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V, context: &V::Context) -> V::Output {
        match self {
            TextContent::TextData(n) => visitor.visit_text_data(n, context),
            TextContent::Expression(n) => visitor.visit_expression(n, context),
            TextContent::Translation(n) => visitor.visit_translation(n, context),
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        match self {
            TextContent::TextData(n) => &n.meta,
            TextContent::Expression(n) => &n.meta,
            TextContent::Translation(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            TextContent::TextData(n) => &mut n.meta,
            TextContent::Expression(n) => &mut n.meta,
            TextContent::Translation(n) => &mut n.meta,
        }
    }

    pub fn set_key(&mut self, key: usize) {
        self.meta_mut().key = key;
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, TextContent::TextData(n) if n.content.trim().is_empty())
    }
}

/// Renumber a text content sequence from zero
pub fn rekey_text_content(content: &mut [TextContent]) {
    for (index, item) in content.iter_mut().enumerate() {
        item.set_key(index);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDataNode {
    pub content: String,
    pub meta: NodeMeta,
}

impl TextDataNode {
    pub fn new(content: &str) -> Self {
        TextDataNode {
            content: content.to_string(),
            meta: NodeMeta::default(),
        }
    }
}

/// A mustache expression inside text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionNode {
    pub program: ProgramNode,
    pub meta: NodeMeta,
}

impl ExpressionNode {
    pub fn new(program: ProgramNode) -> Self {
        ExpressionNode {
            program,
            meta: NodeMeta::default(),
        }
    }
}

/// Translatable text with an optional dictionary context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationNode {
    pub text: String,
    pub context: String,
    pub meta: NodeMeta,
}

impl TranslationNode {
    pub fn new(text: &str, context: &str) -> Self {
        TranslationNode {
            text: text.to_string(),
            context: context.to_string(),
            meta: NodeMeta::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Html

/// Attributes and event handlers of any element-like node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HtmlElementData {
    pub attributes: IndexMap<String, AttributeNode>,
    /// Keyed by the raw attribute name, e.g. `on:click` or `bind:value`
    pub events: IndexMap<String, EventBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EventBinding {
    Bind(BindNode),
    Event(EventNode),
}

/// Attributes, events, options and content options of a component-like node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WasabyElementData {
    #[serde(flatten)]
    pub html: HtmlElementData,
    pub options: IndexMap<String, OptionNode>,
    pub contents: IndexMap<String, ContentOptionNode>,
}

impl WasabyElementData {
    pub fn new(html: HtmlElementData) -> Self {
        WasabyElementData {
            html,
            ..Default::default()
        }
    }

    /// Add an Option or ContentOption node. Options and content options share one
    /// namespace; a name may only be set once.
    pub fn set_option(&mut self, node: Ast) -> Result<()> {
        let name = match &node {
            Ast::Option(option) => option.name.clone(),
            Ast::ContentOption(option) => option.name.clone(),
            other => {
                return Err(CompilerError::UnexpectedOptionNode {
                    kind: other.kind_name(),
                })
            }
        };
        if self.has_option(&name) {
            return Err(CompilerError::DuplicateOption { name });
        }
        match node {
            Ast::Option(option) => {
                self.options.insert(name, option);
            }
            Ast::ContentOption(option) => {
                self.contents.insert(name, option);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name) || self.contents.contains_key(name)
    }

    pub fn remove_option(&mut self, name: &str) -> Option<OptionNode> {
        self.options.shift_remove(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    pub name: String,
    #[serde(flatten)]
    pub data: HtmlElementData,
    pub content: Vec<Ast>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctypeNode {
    pub data: String,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CDataNode {
    pub data: String,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionNode {
    pub data: String,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub data: String,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub content: Vec<TextContent>,
    pub meta: NodeMeta,
}

// ---------------------------------------------------------------------------
// Wasaby directives

/// `<ws:template name="…">`, registered in the compilation scope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateNode {
    pub name: String,
    pub content: Vec<Ast>,
    pub meta: NodeMeta,
}

impl TemplateNode {
    pub fn new(name: &str, content: Vec<Ast>) -> Self {
        TemplateNode {
            name: name.to_string(),
            content,
            meta: NodeMeta::default(),
        }
    }
}

/// Partial that references a template of the same file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineTemplateNode {
    pub name: String,
    #[serde(flatten)]
    pub data: WasabyElementData,
    pub meta: NodeMeta,
}

/// Partial that references a template module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticPartialNode {
    pub path: Path,
    #[serde(flatten)]
    pub data: WasabyElementData,
    pub meta: NodeMeta,
}

/// Partial whose template is computed at runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicPartialNode {
    pub expression: ProgramNode,
    #[serde(flatten)]
    pub data: WasabyElementData,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentNode {
    pub path: Path,
    #[serde(flatten)]
    pub data: WasabyElementData,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfNode {
    pub test: ProgramNode,
    pub consequent: Vec<Ast>,
    pub alternate: Option<Box<ElseNode>>,
    pub meta: NodeMeta,
}

impl IfNode {
    /// Last node of the alternate chain, if any
    pub fn last_alternate_mut(&mut self) -> Option<&mut ElseNode> {
        let mut current = self.alternate.as_deref_mut()?;
        while current.alternate.is_some() {
            current = current.alternate.as_deref_mut()?;
        }
        Some(current)
    }

    /// Append an else/else-if branch to the end of the chain
    pub fn append_alternate(&mut self, node: ElseNode) {
        match self.last_alternate_mut() {
            Some(last) => last.alternate = Some(Box::new(node)),
            None => self.alternate = Some(Box::new(node)),
        }
    }

    /// True when another branch may still follow: the chain does not end in a plain else
    pub fn accepts_alternate(&self) -> bool {
        let mut current = self.alternate.as_deref();
        while let Some(node) = current {
            if node.alternate.is_none() {
                return node.is_else_if();
            }
            current = node.alternate.as_deref();
        }
        true
    }
}

/// `<ws:else>` or, with a `data` test, an else-if branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseNode {
    pub test: Option<ProgramNode>,
    pub consequent: Vec<Ast>,
    pub alternate: Option<Box<ElseNode>>,
    pub meta: NodeMeta,
}

impl ElseNode {
    pub fn is_else_if(&self) -> bool {
        self.test.is_some()
    }
}

/// `init; test; update` cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForNode {
    pub init: Option<ProgramNode>,
    pub test: ProgramNode,
    pub update: Option<ProgramNode>,
    pub content: Vec<Ast>,
    pub meta: NodeMeta,
}

/// `[index,] iterator in collection` cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeachNode {
    pub index: Option<ProgramNode>,
    pub iterator: ProgramNode,
    pub collection: ProgramNode,
    pub content: Vec<Ast>,
    pub meta: NodeMeta,
}

// ---------------------------------------------------------------------------
// Data literals

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayNode {
    pub elements: Vec<Ast>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanNode {
    pub value: Vec<TextContent>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionNode {
    pub path: Path,
    pub options: IndexMap<String, OptionNode>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberNode {
    pub value: Vec<TextContent>,
    pub meta: NodeMeta,
}

/// Properties are Option or ContentOption nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectNode {
    pub properties: IndexMap<String, Ast>,
    pub meta: NodeMeta,
}

impl ObjectNode {
    pub fn new(meta: NodeMeta) -> Self {
        ObjectNode {
            properties: IndexMap::new(),
            meta,
        }
    }

    pub fn set_property(&mut self, node: Ast) -> Result<()> {
        let name = match &node {
            Ast::Option(option) => option.name.clone(),
            Ast::ContentOption(option) => option.name.clone(),
            other => {
                return Err(CompilerError::UnexpectedOptionNode {
                    kind: other.kind_name(),
                })
            }
        };
        if self.properties.contains_key(&name) {
            return Err(CompilerError::DuplicateOption { name });
        }
        self.properties.insert(name, node);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringNode {
    pub value: Vec<TextContent>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNode {
    pub value: Vec<TextContent>,
    pub meta: NodeMeta,
}

// ---------------------------------------------------------------------------
// Structural

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeNode {
    pub name: String,
    pub value: Vec<TextContent>,
    pub meta: NodeMeta,
}

/// Named option whose value is a data literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionNode {
    pub name: String,
    pub value: Box<Ast>,
    pub meta: NodeMeta,
}

/// Named option whose value is markup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentOptionNode {
    pub name: String,
    pub content: Vec<Ast>,
    pub meta: NodeMeta,
}

/// `bind:property="expression"`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindNode {
    pub property: String,
    pub value: ProgramNode,
    pub meta: NodeMeta,
}

/// `on:event="handler(args)"`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventNode {
    pub event: String,
    pub handler: ProgramNode,
    pub meta: NodeMeta,
}
