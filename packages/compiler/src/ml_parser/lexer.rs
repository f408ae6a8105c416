//! ML Lexer
//!
//! Turns markup source into a flat token stream. Mustache regions (`{{ … }}`) and
//! translation regions (`{[ … ]}`) inside text are kept opaque so that a `<` written in an
//! expression never opens a tag.

use super::html_tags::is_raw_text_element;
use super::tokens::Token;
use crate::chars;
use crate::parse_util::{ParseError, SourceCursor};

/// Result of tokenization
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

pub fn tokenize(source: &str) -> TokenizeResult {
    let mut tokenizer = Tokenizer::new(source);
    tokenizer.tokenize();
    TokenizeResult {
        tokens: tokenizer.tokens,
        errors: tokenizer.errors,
    }
}

struct Tokenizer<'a> {
    cursor: SourceCursor<'a>,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Tokenizer {
            cursor: SourceCursor::new(source),
            tokens: vec![],
            errors: vec![],
        }
    }

    fn tokenize(&mut self) {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with("<!--") {
                self.consume_comment();
            } else if self.cursor.starts_with("<![CDATA[") {
                self.consume_cdata();
            } else if self.cursor.starts_with_ignore_case("<!doctype") {
                self.consume_doc_type();
            } else if self.cursor.starts_with("<?") {
                self.consume_instruction();
            } else if self.cursor.starts_with("</") && self.is_tag_name_start(2) {
                self.consume_tag_close();
            } else if self.cursor.starts_with("<") && self.is_tag_name_start(1) {
                self.consume_tag_open();
            } else {
                self.consume_text();
            }
        }
        self.tokens.push(Token::Eof);
    }

    fn is_tag_name_start(&self, offset: usize) -> bool {
        self.cursor
            .rest()
            .get(offset..)
            .and_then(|s| s.chars().next())
            .map_or(false, |ch| chars::is_ascii_letter(ch) || ch == chars::UNDERSCORE)
    }

    fn consume_until(&mut self, terminator: &str) -> Option<String> {
        let start = self.cursor.offset();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(terminator) {
                let data = self.cursor.slice_from(start).to_string();
                self.cursor.advance_by(terminator.chars().count());
                return Some(data);
            }
            self.cursor.advance();
        }
        None
    }

    fn consume_comment(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance_by(4);
        match self.consume_until("-->") {
            Some(data) => self.tokens.push(Token::Comment { data, position }),
            None => self
                .errors
                .push(ParseError::new(position, "Unterminated comment".to_string())),
        }
    }

    fn consume_cdata(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance_by(9);
        match self.consume_until("]]>") {
            Some(data) => self.tokens.push(Token::CData { data, position }),
            None => self
                .errors
                .push(ParseError::new(position, "Unterminated CDATA section".to_string())),
        }
    }

    fn consume_doc_type(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance_by(2);
        match self.consume_until(">") {
            Some(data) => self.tokens.push(Token::DocType { data, position }),
            None => self
                .errors
                .push(ParseError::new(position, "Unterminated doctype".to_string())),
        }
    }

    fn consume_instruction(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance_by(2);
        match self.consume_until("?>") {
            Some(data) => self.tokens.push(Token::Instruction { data, position }),
            None => self.errors.push(ParseError::new(
                position,
                "Unterminated processing instruction".to_string(),
            )),
        }
    }

    fn consume_name(&mut self) -> String {
        let start = self.cursor.offset();
        while !self.cursor.is_eof() && !chars::is_name_end(self.cursor.peek()) {
            self.cursor.advance();
        }
        self.cursor.slice_from(start).to_string()
    }

    fn skip_whitespace(&mut self) {
        while !self.cursor.is_eof() && chars::is_whitespace(self.cursor.peek()) {
            self.cursor.advance();
        }
    }

    fn consume_tag_open(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance();
        let name = self.consume_name();
        self.tokens.push(Token::TagOpenStart {
            name: name.clone(),
            position,
        });

        loop {
            self.skip_whitespace();
            if self.cursor.is_eof() {
                self.errors.push(ParseError::new(
                    position,
                    format!("Unexpected end of input inside tag <{}>", name),
                ));
                return;
            }
            if self.cursor.starts_with("/>") {
                self.cursor.advance_by(2);
                self.tokens.push(Token::TagOpenEndVoid);
                return;
            }
            if self.cursor.peek() == chars::GT {
                self.cursor.advance();
                self.tokens.push(Token::TagOpenEnd);
                if is_raw_text_element(&name) {
                    self.consume_raw_text(&name);
                }
                return;
            }
            if self.cursor.peek() == chars::SLASH {
                // stray slash, e.g. `<a / href="…">`
                self.cursor.advance();
                continue;
            }
            self.consume_attribute();
        }
    }

    fn consume_attribute(&mut self) {
        let position = self.cursor.position();
        let name = self.consume_name();
        if name.is_empty() {
            let ch = self.cursor.peek();
            self.errors.push(ParseError::new(
                position,
                format!("Unexpected character \"{}\" in tag", ch),
            ));
            self.cursor.advance();
            return;
        }
        self.skip_whitespace();
        if self.cursor.peek() != chars::EQ {
            self.tokens.push(Token::Attribute {
                name,
                value: None,
                position,
            });
            return;
        }
        self.cursor.advance();
        self.skip_whitespace();
        let quote = self.cursor.peek();
        let value = if quote == chars::DQ || quote == chars::SQ {
            self.cursor.advance();
            let start = self.cursor.offset();
            while !self.cursor.is_eof() && self.cursor.peek() != quote {
                self.cursor.advance();
            }
            let value = self.cursor.slice_from(start).to_string();
            if self.cursor.is_eof() {
                self.errors.push(ParseError::new(
                    position,
                    format!("Unterminated value of attribute \"{}\"", name),
                ));
            } else {
                self.cursor.advance();
            }
            value
        } else {
            let start = self.cursor.offset();
            while !self.cursor.is_eof()
                && !chars::is_whitespace(self.cursor.peek())
                && self.cursor.peek() != chars::GT
                && !self.cursor.starts_with("/>")
            {
                self.cursor.advance();
            }
            self.cursor.slice_from(start).to_string()
        };
        self.tokens.push(Token::Attribute {
            name,
            value: Some(value),
            position,
        });
    }

    fn consume_tag_close(&mut self) {
        let position = self.cursor.position();
        self.cursor.advance_by(2);
        let name = self.consume_name();
        self.skip_whitespace();
        if self.cursor.peek() == chars::GT {
            self.cursor.advance();
        } else {
            self.errors.push(ParseError::new(
                position,
                format!("Expected \">\" to close </{}", name),
            ));
        }
        self.tokens.push(Token::TagClose { name, position });
    }

    fn consume_raw_text(&mut self, tag_name: &str) {
        let position = self.cursor.position();
        let close = format!("</{}", tag_name);
        let start = self.cursor.offset();
        while !self.cursor.is_eof() && !self.cursor.starts_with_ignore_case(&close) {
            self.cursor.advance();
        }
        let data = self.cursor.slice_from(start);
        if !data.is_empty() {
            self.tokens.push(Token::Text {
                data: data.to_string(),
                position,
            });
        }
    }

    fn consume_text(&mut self) {
        let position = self.cursor.position();
        let start = self.cursor.offset();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with("{{") {
                self.skip_region("{{", "}}");
                continue;
            }
            if self.cursor.starts_with("{[") {
                self.skip_region("{[", "]}");
                continue;
            }
            if self.cursor.peek() == chars::LT && self.starts_markup() {
                break;
            }
            self.cursor.advance();
        }
        let data = self.cursor.slice_from(start);
        if !data.is_empty() {
            self.tokens.push(Token::Text {
                data: data.to_string(),
                position,
            });
        }
    }

    fn starts_markup(&self) -> bool {
        self.cursor.starts_with("<!--")
            || self.cursor.starts_with("<![CDATA[")
            || self.cursor.starts_with_ignore_case("<!doctype")
            || self.cursor.starts_with("<?")
            || (self.cursor.starts_with("</") && self.is_tag_name_start(2))
            || self.is_tag_name_start(1)
    }

    /// Skip a mustache-like region verbatim; an unterminated region runs to the end of input
    /// and is left for the text processor to report.
    fn skip_region(&mut self, open: &str, close: &str) {
        self.cursor.advance_by(open.len());
        let mut quote: Option<char> = None;
        while !self.cursor.is_eof() {
            let ch = self.cursor.peek();
            match quote {
                Some(q) => {
                    if ch == chars::BACKSLASH {
                        self.cursor.advance();
                    } else if ch == q {
                        quote = None;
                    }
                }
                None => {
                    if self.cursor.starts_with(close) {
                        self.cursor.advance_by(close.len());
                        return;
                    }
                    if chars::is_quote(ch) {
                        quote = Some(ch);
                    }
                }
            }
            self.cursor.advance();
        }
    }
}
