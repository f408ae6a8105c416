//! ML Parser
//!
//! Builds the tag tree from the token stream. Recoverable problems (mismatched or
//! unclosed tags, duplicate attributes) are collected as errors next to a best-effort tree.

use super::ast::*;
use super::html_tags::is_void_element;
use super::lexer::tokenize;
use super::tokens::Token;
use crate::chars;
use crate::parse_util::{ParseError, SourcePosition};

/// Parse tree result
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }

    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.level == crate::parse_util::ParseErrorLevel::Error)
    }
}

/// Parser options
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub preserve_whitespaces: bool,
}

pub fn parse(source: &str, options: &ParseOptions) -> ParseTreeResult {
    let tokenize_result = tokenize(source);
    let mut builder = TreeBuilder::new(tokenize_result.tokens, options.preserve_whitespaces);
    builder.build();

    let mut errors = tokenize_result.errors;
    errors.extend(builder.errors);
    ParseTreeResult::new(builder.root_nodes, errors)
}

/// Internal tree builder
struct TreeBuilder {
    tokens: std::vec::IntoIter<Token>,
    preserve_whitespaces: bool,
    root_nodes: Vec<Node>,
    /// Open elements, innermost last
    stack: Vec<Tag>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn new(tokens: Vec<Token>, preserve_whitespaces: bool) -> Self {
        TreeBuilder {
            tokens: tokens.into_iter(),
            preserve_whitespaces,
            root_nodes: vec![],
            stack: vec![],
            errors: vec![],
        }
    }

    fn build(&mut self) {
        while let Some(token) = self.tokens.next() {
            match token {
                Token::TagOpenStart { name, position } => self.consume_start_tag(name, position),
                Token::TagClose { name, position } => self.consume_end_tag(&name, position),
                Token::Text { data, position } => self.consume_text(data, position),
                Token::Comment { data, position } => {
                    self.add_to_parent(Node::Comment(Comment { data, position }))
                }
                Token::CData { data, position } => {
                    self.add_to_parent(Node::CData(CData { data, position }))
                }
                Token::DocType { data, position } => {
                    self.add_to_parent(Node::Doctype(Doctype { data, position }))
                }
                Token::Instruction { data, position } => {
                    self.add_to_parent(Node::Instruction(Instruction { data, position }))
                }
                Token::Eof => break,
                // attribute tokens are consumed together with their start tag
                Token::Attribute { .. } | Token::TagOpenEnd | Token::TagOpenEndVoid => {}
            }
        }

        while let Some(tag) = self.stack.pop() {
            self.errors.push(ParseError::new(
                tag.position,
                format!("Unclosed element \"{}\"", tag.name),
            ));
            self.add_to_parent(Node::Tag(tag));
        }
    }

    fn consume_start_tag(&mut self, name: String, position: SourcePosition) {
        let mut tag = Tag::new(&name, position);
        let mut self_closing = false;
        let mut terminated = false;

        for token in self.tokens.by_ref() {
            match token {
                Token::Attribute {
                    name: attr_name,
                    value,
                    position: attr_position,
                } => {
                    if tag.attributes.contains_key(&attr_name) {
                        self.errors.push(ParseError::warning(
                            attr_position,
                            format!(
                                "Duplicate attribute \"{}\" on element \"{}\" is ignored",
                                attr_name, name
                            ),
                        ));
                        continue;
                    }
                    tag.attributes.insert(
                        attr_name.clone(),
                        Attribute {
                            name: attr_name,
                            value,
                            position: attr_position,
                        },
                    );
                }
                Token::TagOpenEnd => {
                    terminated = true;
                    break;
                }
                Token::TagOpenEndVoid => {
                    terminated = true;
                    self_closing = true;
                    break;
                }
                _ => break,
            }
        }

        if !terminated {
            // the lexer already reported the truncated tag
            tag.is_self_closing = true;
            self.add_to_parent(Node::Tag(tag));
            return;
        }

        if self_closing || is_void_element(&name) {
            tag.is_self_closing = self_closing;
            self.add_to_parent(Node::Tag(tag));
        } else {
            self.stack.push(tag);
        }
    }

    fn consume_end_tag(&mut self, name: &str, position: SourcePosition) {
        if is_void_element(name) {
            self.errors.push(ParseError::new(
                position,
                format!("Void element \"{}\" does not have an end tag", name),
            ));
            return;
        }

        let Some(index) = self.stack.iter().rposition(|tag| tag.name == name) else {
            self.errors.push(ParseError::new(
                position,
                format!("Unexpected closing tag \"{}\"", name),
            ));
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(unclosed) = self.stack.pop() {
                self.errors.push(ParseError::new(
                    unclosed.position,
                    format!(
                        "Unclosed element \"{}\" before closing tag \"{}\"",
                        unclosed.name, name
                    ),
                ));
                self.add_to_parent(Node::Tag(unclosed));
            }
        }
        if let Some(tag) = self.stack.pop() {
            self.add_to_parent(Node::Tag(tag));
        }
    }

    fn consume_text(&mut self, data: String, position: SourcePosition) {
        let whitespace_only = data.chars().all(chars::is_whitespace);
        if whitespace_only && !self.preserve_whitespaces {
            return;
        }
        self.add_to_parent(Node::Text(Text { data, position }));
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }
}
