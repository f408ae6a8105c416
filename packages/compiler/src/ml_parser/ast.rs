//! ML Parser AST
//!
//! Generic tag tree produced from markup source. The traverse engine reads it and never
//! mutates it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::parse_util::SourcePosition;

pub type Attributes = IndexMap<String, Attribute>;

/// Node type union
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Tag(Tag),
    Text(Text),
    Comment(Comment),
    CData(CData),
    Doctype(Doctype),
    Instruction(Instruction),
}

impl Node {
    pub fn position(&self) -> SourcePosition {
        match self {
            Node::Tag(n) => n.position,
            Node::Text(n) => n.position,
            Node::Comment(n) => n.position,
            Node::CData(n) => n.position,
            Node::Doctype(n) => n.position,
            Node::Instruction(n) => n.position,
        }
    }

    /// Dispatch to the matching visitor method
    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V, context: &V::Context) -> V::Output {
        match self {
            Node::Tag(n) => visitor.visit_tag(n, context),
            Node::Text(n) => visitor.visit_text(n, context),
            Node::Comment(n) => visitor.visit_comment(n, context),
            Node::CData(n) => visitor.visit_cdata(n, context),
            Node::Doctype(n) => visitor.visit_doctype(n, context),
            Node::Instruction(n) => visitor.visit_instruction(n, context),
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Node::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Node::Tag(_))
    }
}

/// Attribute node; `value` is `None` for valueless attributes like `<input disabled>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
    pub position: SourcePosition,
}

impl Attribute {
    pub fn new(name: &str, value: Option<&str>, position: SourcePosition) -> Self {
        Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
            position,
        }
    }
}

/// Element node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub position: SourcePosition,
}

impl Tag {
    pub fn new(name: &str, position: SourcePosition) -> Self {
        Tag {
            name: name.to_string(),
            attributes: IndexMap::new(),
            children: vec![],
            is_self_closing: false,
            position,
        }
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|a| a.value.as_deref())
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub data: String,
    pub position: SourcePosition,
}

impl Text {
    pub fn new(data: &str, position: SourcePosition) -> Self {
        Text {
            data: data.to_string(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub data: String,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CData {
    pub data: String,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctype {
    pub data: String,
    pub position: SourcePosition,
}

/// Processing instruction (`<? … ?>`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub data: String,
    pub position: SourcePosition,
}

/// Visitor trait for traversing the tag tree
pub trait NodeVisitor {
    type Context;
    type Output;

    fn visit_tag(&mut self, tag: &Tag, context: &Self::Context) -> Self::Output;
    fn visit_text(&mut self, text: &Text, context: &Self::Context) -> Self::Output;
    fn visit_comment(&mut self, comment: &Comment, context: &Self::Context) -> Self::Output;
    fn visit_cdata(&mut self, cdata: &CData, context: &Self::Context) -> Self::Output;
    fn visit_doctype(&mut self, doctype: &Doctype, context: &Self::Context) -> Self::Output;
    fn visit_instruction(&mut self, instruction: &Instruction, context: &Self::Context) -> Self::Output;
}
