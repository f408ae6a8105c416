//! Text Processor
//!
//! Splits raw text into plain text, `{{ expression }}` and `{[ context@@translation ]}` parts.

use bitflags::bitflags;

use super::expression_validator::check_text_expression;
use super::scope::Scope;
use crate::diagnostics::{DiagnosticMeta, ErrorHandler};
use crate::error::{CompilerError, Result};
use crate::expression_parser::Parser;
use crate::parse_util::SourcePosition;
use crate::wasaby::ast::{
    rekey_text_content, ExpressionNode, NodeMeta, TextContent, TextDataNode, TranslationNode,
};

const EXPRESSION_START: &str = "{{";
const EXPRESSION_END: &str = "}}";
const TRANSLATION_START: &str = "{[";
const TRANSLATION_END: &str = "]}";
const CONTEXT_SEPARATOR: &str = "@@";

bitflags! {
    /// Kinds of text content a caller accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextContentFlags: u8 {
        const TEXT = 1 << 0;
        const EXPRESSION = 1 << 1;
        const TRANSLATION = 1 << 2;
        const TEXT_AND_EXPRESSION = Self::TEXT.bits() | Self::EXPRESSION.bits();
        const FULL_TEXT = Self::TEXT.bits() | Self::EXPRESSION.bits() | Self::TRANSLATION.bits();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextProcessorOptions<'a> {
    pub file_name: &'a str,
    pub allowed_content: TextContentFlags,
    /// Turn plain text into translation units
    pub translate_text: bool,
    pub position: SourcePosition,
}

pub struct TextProcessor<'a> {
    parser: Parser,
    handler: &'a dyn ErrorHandler,
    scope: &'a Scope,
}

impl<'a> TextProcessor<'a> {
    pub fn new(handler: &'a dyn ErrorHandler, scope: &'a Scope) -> Self {
        TextProcessor {
            parser: Parser::new(),
            handler,
            scope,
        }
    }

    pub fn process(&self, text: &str, options: &TextProcessorOptions) -> Result<Vec<TextContent>> {
        let meta = DiagnosticMeta::new(options.file_name, options.position);
        let mut content = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let next = match (rest.find(EXPRESSION_START), rest.find(TRANSLATION_START)) {
                (Some(e), Some(t)) if t < e => Some((t, false)),
                (Some(e), _) => Some((e, true)),
                (None, Some(t)) => Some((t, false)),
                (None, None) => None,
            };
            let Some((start, is_expression)) = next else {
                self.push_text(&mut content, rest, options);
                break;
            };
            self.push_text(&mut content, &rest[..start], options);

            let body_start = start + 2;
            if is_expression {
                let end = find_expression_end(rest, body_start).ok_or_else(|| {
                    CompilerError::parse(format!("Unterminated expression in text \"{}\"", text))
                })?;
                let source = rest[body_start..end].trim();
                let program = self.parser.parse(source)?;
                check_text_expression(&program, self.handler, &meta)?;
                content.push(TextContent::Expression(ExpressionNode {
                    program,
                    meta: NodeMeta::at(options.position),
                }));
                rest = &rest[end + EXPRESSION_END.len()..];
            } else {
                let end = rest[body_start..]
                    .find(TRANSLATION_END)
                    .map(|offset| body_start + offset)
                    .ok_or_else(|| {
                        CompilerError::parse(format!("Unterminated translation in text \"{}\"", text))
                    })?;
                let (context, text) = split_translation(&rest[body_start..end]);
                content.push(self.translation(text, context, options));
                rest = &rest[end + TRANSLATION_END.len()..];
            }
        }

        if let Some(disallowed) = content.iter().find(|item| !is_allowed(item, options.allowed_content)) {
            return Err(CompilerError::parse(format!(
                "{} is not allowed in \"{}\"",
                content_kind(disallowed),
                text
            )));
        }
        rekey_text_content(&mut content);
        Ok(content)
    }

    fn push_text(&self, content: &mut Vec<TextContent>, text: &str, options: &TextProcessorOptions) {
        if text.is_empty() {
            return;
        }
        let trimmed = text.trim();
        if !options.translate_text || trimmed.is_empty() {
            content.push(text_data(text, options.position));
            return;
        }
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];
        if !leading.is_empty() {
            content.push(text_data(leading, options.position));
        }
        content.push(self.translation(trimmed, "", options));
        if !trailing.is_empty() {
            content.push(text_data(trailing, options.position));
        }
    }

    fn translation(&self, text: &str, context: &str, options: &TextProcessorOptions) -> TextContent {
        self.scope.register_translation(text, context);
        TextContent::Translation(TranslationNode {
            text: text.to_string(),
            context: context.to_string(),
            meta: NodeMeta::at(options.position),
        })
    }
}

fn text_data(text: &str, position: SourcePosition) -> TextContent {
    TextContent::TextData(TextDataNode {
        content: text.to_string(),
        meta: NodeMeta::at(position),
    })
}

/// `context@@text` or plain `text`
fn split_translation(body: &str) -> (&str, &str) {
    match body.split_once(CONTEXT_SEPARATOR) {
        Some((context, text)) => (context.trim(), text.trim()),
        None => ("", body.trim()),
    }
}

/// Offset of the closing `}}`, ignoring braces inside string literals
fn find_expression_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut index = from;
    while index < bytes.len() {
        let byte = bytes[index];
        match quote {
            Some(_) if byte == b'\\' => index += 1,
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'\'' || byte == b'"' || byte == b'`' => quote = Some(byte),
            None if bytes[index..].starts_with(EXPRESSION_END.as_bytes()) => return Some(index),
            None => {}
        }
        index += 1;
    }
    None
}

fn is_allowed(item: &TextContent, allowed: TextContentFlags) -> bool {
    let flag = match item {
        TextContent::TextData(_) => TextContentFlags::TEXT,
        TextContent::Expression(_) => TextContentFlags::EXPRESSION,
        TextContent::Translation(_) => TextContentFlags::TRANSLATION,
    };
    allowed.contains(flag)
}

fn content_kind(item: &TextContent) -> &'static str {
    match item {
        TextContent::TextData(_) => "Plain text",
        TextContent::Expression(_) => "Mustache expression",
        TextContent::Translation(_) => "Translation",
    }
}
