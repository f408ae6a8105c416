/**
 * Mustache Expression Parser
 *
 * Recursive descent parser for the expression language of `{{ … }}` regions and
 * attribute bindings
 */
use super::ast::*;
use super::lexer::{Lexer, Token, TokenType};
use crate::error::{CompilerError, Result};

/// Parser for template expressions
#[derive(Debug, Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser { lexer: Lexer::new() }
    }

    /// Parse a program: one or more statements separated by `;`
    pub fn parse(&self, input: &str) -> Result<ProgramNode> {
        let tokens = self.lexer.tokenize(input);
        if let Some(error) = tokens.iter().find(|t| t.is_error()) {
            return Err(CompilerError::parse(error.str_value.clone()));
        }
        let mut parse_ast = ParseAST::new(input, tokens);
        parse_ast.parse_program()
    }

    /// Parse a program that must consist of exactly one statement
    pub fn parse_expression(&self, input: &str) -> Result<Expression> {
        let mut program = self.parse(input)?;
        if program.body.len() != 1 {
            return Err(CompilerError::parse(format!(
                "Expected a single expression in [{}]",
                input
            )));
        }
        program
            .body
            .pop()
            .ok_or_else(|| CompilerError::parse(format!("Empty expression [{}]", input)))
    }
}

struct ParseAST<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> ParseAST<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        ParseAST {
            input,
            tokens,
            index: 0,
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn input_index(&self) -> usize {
        self.current().map_or(self.input.len(), |t| t.index)
    }

    /// Span from `start` up to the end of the last consumed token
    fn span(&self, start: usize) -> ParseSpan {
        let end = if self.index == 0 {
            start
        } else {
            self.tokens
                .get(self.index - 1)
                .map_or(self.input.len(), |t| t.end)
        };
        ParseSpan::new(start, end.max(start))
    }

    fn error(&self, message: &str) -> CompilerError {
        let location = match self.current() {
            Some(token) => format!("at column {}", token.index),
            None => "at the end of the expression".to_string(),
        };
        CompilerError::parse(format!(
            "Parser Error: {} {} in [{}]",
            message, location, self.input
        ))
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.current().map_or(false, |t| t.is_character(code)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.current().map_or(false, |t| t.is_operator(op)) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_character(&mut self, code: char) -> Result<()> {
        if self.consume_optional_character(code) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected character '{}'", code)))
        }
    }

    fn current_operator(&self, candidates: &[&str]) -> Option<String> {
        self.current()
            .filter(|t| t.token_type == TokenType::Operator)
            .filter(|t| candidates.contains(&t.str_value.as_str()))
            .map(|t| t.str_value.clone())
    }

    fn parse_program(&mut self) -> Result<ProgramNode> {
        if self.tokens.is_empty() {
            return Err(CompilerError::parse(format!(
                "Parser Error: Empty expression [{}]",
                self.input
            )));
        }
        let mut body = vec![self.parse_sequence()?];
        while self.consume_optional_character(';') {
            if self.current().is_none() {
                break;
            }
            body.push(self.parse_sequence()?);
        }
        if self.current().is_some() {
            return Err(self.error("Unexpected token"));
        }
        Ok(ProgramNode {
            body,
            source: self.input.to_string(),
            span: ParseSpan::new(0, self.input.len()),
        })
    }

    /// `a, b, c`
    fn parse_sequence(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let first = self.parse_assignment()?;
        if !self.current().map_or(false, |t| t.is_character(',')) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.consume_optional_character(',') {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span(start),
        }))
    }

    /// `target = value`, right associative
    fn parse_assignment(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let target = self.parse_decorator()?;
        if !self.current().map_or(false, |t| t.is_operator("=")) {
            return Ok(target);
        }
        if !matches!(target, Expression::Identifier(_) | Expression::Member(_)) {
            return Err(self.error("Invalid assignment target"));
        }
        self.advance();
        let value = self.parse_assignment()?;
        Ok(Expression::Assignment(AssignmentExpression {
            target: Box::new(target),
            value: Box::new(value),
            span: self.span(start),
        }))
    }

    /// `value|name:arg|other`
    fn parse_decorator(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let mut result = self.parse_conditional()?;

        while self.consume_optional_operator("|") {
            let name = match self.current() {
                Some(token) if token.is_identifier() => token.str_value.clone(),
                _ => return Err(self.error("Expected decorator name")),
            };
            self.advance();
            let mut arguments = Vec::new();
            while self.consume_optional_character(':') {
                arguments.push(self.parse_conditional()?);
            }
            result = Expression::Decorator(DecoratorExpression {
                value: Box::new(result),
                name,
                arguments,
                span: self.span(start),
            });
        }
        Ok(result)
    }

    /// `test ? consequent : alternate`, alternate optional
    fn parse_conditional(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let test = self.parse_logical_or()?;
        if !self.consume_optional_operator("?") {
            return Ok(test);
        }
        let consequent = self.parse_conditional()?;
        let alternate = if self.consume_optional_character(':') {
            Some(Box::new(self.parse_conditional()?))
        } else {
            None
        };
        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
            span: self.span(start),
        }))
    }

    fn parse_logical_or(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let mut result = self.parse_logical_and()?;
        while let Some(operator) = self.current_operator(&["||", "??"]) {
            self.advance();
            let right = self.parse_logical_and()?;
            result = Expression::Logical(LogicalExpression {
                operator,
                left: Box::new(result),
                right: Box::new(right),
                span: self.span(start),
            });
        }
        Ok(result)
    }

    fn parse_logical_and(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let mut result = self.parse_equality()?;
        while self.consume_optional_operator("&&") {
            let right = self.parse_equality()?;
            result = Expression::Logical(LogicalExpression {
                operator: "&&".to_string(),
                left: Box::new(result),
                right: Box::new(right),
                span: self.span(start),
            });
        }
        Ok(result)
    }

    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let start = self.input_index();
        let mut result = next(self)?;
        while let Some(operator) = self.current_operator(operators) {
            self.advance();
            let right = next(self)?;
            result = Expression::Binary(BinaryExpression {
                operator,
                left: Box::new(result),
                right: Box::new(right),
                span: self.span(start),
            });
        }
        Ok(result)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        self.parse_binary_level(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression> {
        self.parse_binary_level(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_prefix)
    }

    /// `!a`, `-a`, `+a`, `typeof a`
    fn parse_prefix(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let operator = match self.current() {
            Some(t) if t.is_operator("!") || t.is_operator("-") || t.is_operator("+") => {
                Some(t.str_value.clone())
            }
            Some(t) if t.is_keyword_named("typeof") => Some("typeof".to_string()),
            _ => None,
        };
        match operator {
            Some(operator) => {
                self.advance();
                let argument = self.parse_prefix()?;
                Ok(Expression::Unary(UnaryExpression {
                    operator,
                    argument: Box::new(argument),
                    span: self.span(start),
                }))
            }
            None => self.parse_call_chain(),
        }
    }

    fn parse_call_chain(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;

        loop {
            if self.consume_optional_character('.') {
                let property = match self.current() {
                    Some(t) if t.is_identifier() || t.is_keyword() => Identifier {
                        name: t.str_value.clone(),
                        span: ParseSpan::new(t.index, t.end),
                    },
                    _ => return Err(self.error("Expected property name after '.'")),
                };
                self.advance();
                result = Expression::Member(MemberExpression {
                    object: Box::new(result),
                    property: Box::new(Expression::Identifier(property)),
                    computed: false,
                    span: self.span(start),
                });
            } else if self.consume_optional_character('[') {
                let property = self.parse_sequence()?;
                self.expect_character(']')?;
                result = Expression::Member(MemberExpression {
                    object: Box::new(result),
                    property: Box::new(property),
                    computed: true,
                    span: self.span(start),
                });
            } else if self.consume_optional_character('(') {
                let arguments = self.parse_call_arguments()?;
                result = Expression::Call(CallExpression {
                    callee: Box::new(result),
                    arguments,
                    span: self.span(start),
                });
            } else {
                return Ok(result);
            }
        }
    }

    /// Arguments after the opening paren, consuming the closing one
    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut arguments = Vec::new();
        if self.consume_optional_character(')') {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_decorator()?);
            if !self.consume_optional_character(',') {
                break;
            }
        }
        self.expect_character(')')?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let start = self.input_index();
        let Some(token) = self.current().cloned() else {
            return Err(self.error("Unexpected end of expression"));
        };

        if token.is_character('(') {
            self.advance();
            let result = self.parse_sequence()?;
            self.expect_character(')')?;
            return Ok(result);
        }
        if token.is_character('[') {
            self.advance();
            return self.parse_literal_array(start);
        }
        if token.is_character('{') {
            self.advance();
            return self.parse_literal_map(start);
        }

        self.advance();
        let span = ParseSpan::new(token.index, token.end);
        let literal =
            |value: LiteralValue| -> Result<Expression> { Ok(Expression::Literal(Literal { value, span })) };
        match token.token_type {
            TokenType::Identifier => Ok(Expression::Identifier(Identifier {
                name: token.str_value,
                span,
            })),
            TokenType::Number => literal(LiteralValue::Number(token.num_value)),
            TokenType::String => literal(LiteralValue::String(token.str_value)),
            TokenType::Keyword => match token.str_value.as_str() {
                "this" => Ok(Expression::This(ThisExpression { span })),
                "true" => literal(LiteralValue::Boolean(true)),
                "false" => literal(LiteralValue::Boolean(false)),
                "null" => literal(LiteralValue::Null),
                "undefined" => literal(LiteralValue::Undefined),
                other => {
                    self.index -= 1;
                    Err(self.error(&format!("Unexpected keyword '{}'", other)))
                }
            },
            _ => {
                self.index -= 1;
                Err(self.error(&format!("Unexpected token '{}'", token.str_value)))
            }
        }
    }

    fn parse_literal_array(&mut self, start: usize) -> Result<Expression> {
        let mut elements = Vec::new();
        if !self.consume_optional_character(']') {
            loop {
                elements.push(self.parse_decorator()?);
                if !self.consume_optional_character(',') {
                    break;
                }
                // trailing comma
                if self.current().map_or(false, |t| t.is_character(']')) {
                    break;
                }
            }
            self.expect_character(']')?;
        }
        Ok(Expression::Array(ArrayExpression {
            elements,
            span: self.span(start),
        }))
    }

    fn parse_literal_map(&mut self, start: usize) -> Result<Expression> {
        let mut properties = Vec::new();
        if !self.consume_optional_character('}') {
            loop {
                let key = match self.current() {
                    Some(t)
                        if t.is_identifier() || t.is_keyword() || t.is_string() || t.is_number() =>
                    {
                        t.str_value.clone()
                    }
                    _ => return Err(self.error("Expected object key")),
                };
                self.advance();
                self.expect_character(':')?;
                let value = self.parse_decorator()?;
                properties.push(ObjectProperty { key, value });
                if !self.consume_optional_character(',') {
                    break;
                }
                if self.current().map_or(false, |t| t.is_character('}')) {
                    break;
                }
            }
            self.expect_character('}')?;
        }
        Ok(Expression::Object(ObjectExpression {
            properties,
            span: self.span(start),
        }))
    }
}
