/**
 * Mustache Expression Lexer
 *
 * Tokenizes the source of a `{{ … }}` expression for the parser
 */

use serde::Serialize;
use crate::chars;

/// Token types in template expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenType {
    Character,
    Identifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
}

/// Token representation
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    pub fn new(
        index: usize,
        end: usize,
        token_type: TokenType,
        num_value: f64,
        str_value: String,
    ) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
        }
    }

    pub fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, str_value.to_string())
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.chars().next() == Some(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

const KEYWORDS: &[&str] = &["null", "undefined", "true", "false", "this", "typeof", "in"];

/// Expression lexer
#[derive(Debug, Default)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

struct Scanner<'a> {
    input: &'a str,
    index: usize,
    peek: char,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            index: 0,
            peek: input.chars().next().unwrap_or(chars::EOF),
        }
    }

    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token() {
            let is_error = token.is_error();
            tokens.push(token);
            if is_error {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.input[self.index..].chars().next().unwrap_or(chars::EOF);
    }

    fn is_at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    fn scan_token(&mut self) -> Option<Token> {
        while !self.is_at_end() && chars::is_whitespace(self.peek) {
            self.advance();
        }
        if self.is_at_end() {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            chars::PERIOD => {
                self.advance();
                if chars::is_digit(self.peek) {
                    return Some(self.scan_number(start));
                }
                Token::new(start, self.index, TokenType::Character, 0.0, ch.to_string())
            }
            chars::LPAREN | chars::RPAREN | chars::LBRACKET | chars::RBRACKET | chars::LBRACE
            | chars::RBRACE | chars::COMMA | chars::COLON | chars::SEMICOLON => {
                self.advance();
                Token::new(start, self.index, TokenType::Character, 0.0, ch.to_string())
            }
            chars::SQ | chars::DQ => self.scan_string(ch),
            chars::PLUS | chars::MINUS | chars::STAR | chars::SLASH | chars::PERCENT => {
                self.scan_operator(start, ch)
            }
            chars::QUESTION => {
                self.advance();
                if self.peek == chars::QUESTION {
                    self.advance();
                    Token::operator(start, self.index, "??")
                } else {
                    Token::operator(start, self.index, "?")
                }
            }
            chars::LT | chars::GT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    Token::operator(start, self.index, &format!("{}=", ch))
                } else {
                    Token::operator(start, self.index, &ch.to_string())
                }
            }
            chars::BANG | chars::EQ => {
                self.advance();
                let mut op = ch.to_string();
                if self.peek == chars::EQ {
                    op.push(chars::EQ);
                    self.advance();
                    if self.peek == chars::EQ {
                        op.push(chars::EQ);
                        self.advance();
                    }
                }
                Token::operator(start, self.index, &op)
            }
            chars::AMPERSAND => self.scan_doubled(start, ch),
            chars::BAR => {
                self.advance();
                if self.peek == chars::BAR {
                    self.advance();
                    Token::operator(start, self.index, "||")
                } else {
                    Token::operator(start, self.index, "|")
                }
            }
            _ => {
                self.advance();
                self.error(start, format!("Unexpected character [{}]", ch))
            }
        };
        Some(token)
    }

    fn error(&self, start: usize, message: String) -> Token {
        Token::new(
            start,
            self.index,
            TokenType::Error,
            0.0,
            format!(
                "Lexer Error: {} at column {} in expression [{}]",
                message, start, self.input
            ),
        )
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        while chars::is_identifier_part(self.peek) {
            self.advance();
        }
        let value = &self.input[start..self.index];
        let token_type = if KEYWORDS.contains(&value) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, 0.0, value.to_string())
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut seen_exponent = false;
        loop {
            if chars::is_digit(self.peek) || self.peek == chars::PERIOD {
                self.advance();
            } else if !seen_exponent && (self.peek == chars::e || self.peek == chars::E) {
                seen_exponent = true;
                self.advance();
                if self.peek == chars::PLUS || self.peek == chars::MINUS {
                    self.advance();
                }
                if !chars::is_digit(self.peek) {
                    return self.error(start, "Invalid exponent".to_string());
                }
            } else {
                break;
            }
        }
        let text = &self.input[start..self.index];
        match text.parse::<f64>() {
            Ok(value) => Token::new(start, self.index, TokenType::Number, value, text.to_string()),
            Err(_) => self.error(start, format!("Invalid number [{}]", text)),
        }
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();

        let mut buffer = String::new();
        let mut escaped = false;
        while !self.is_at_end() {
            let ch = self.peek;
            if escaped {
                buffer.push(match ch {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    _ => ch,
                });
                escaped = false;
            } else if ch == chars::BACKSLASH {
                escaped = true;
            } else if ch == quote {
                self.advance();
                return Token::new(start, self.index, TokenType::String, 0.0, buffer);
            } else {
                buffer.push(ch);
            }
            self.advance();
        }
        self.error(start, "Unterminated quote".to_string())
    }

    fn scan_operator(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::operator(start, self.index, &ch.to_string())
    }

    /// `&&`; a single `&` is not an operator of the expression language
    fn scan_doubled(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        if self.peek == ch {
            self.advance();
            Token::operator(start, self.index, &format!("{}{}", ch, ch))
        } else {
            self.error(start, format!("Unexpected character [{}]", ch))
        }
    }
}
