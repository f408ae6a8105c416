//! Expression Validator
//!
//! Polices what is legal inside two-way bindings, event handlers and text mustaches.
//! The parser accepts the whole expression language; these checks restrict it per context.

use crate::diagnostics::{DiagnosticMeta, ErrorHandler};
use crate::error::{CompilerError, Result};
use crate::expression_parser::ast::*;

const OPTIONS_IDENTIFIER: &str = "_options";
const DEBUG_IDENTIFIER: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationState {
    Bind,
    Event,
    Text,
}

impl ValidationState {
    fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Bind => "bind",
            ValidationState::Event => "event handler",
            ValidationState::Text => "text",
        }
    }
}

/// Position of the visited node relative to the expression root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    Root,
    /// Object part of a root-level member chain
    Chain,
    /// Callee of a root-level event handler call
    HandlerName,
    /// Anywhere below an operator or inside call arguments
    Nested,
}

#[derive(Debug, Clone, Copy)]
struct ValidatorContext {
    state: ValidationState,
    context_state: ContextState,
    program_body_length: usize,
    forbid_computed_members: bool,
}

impl ValidatorContext {
    fn new(state: ValidationState, program_body_length: usize) -> Self {
        ValidatorContext {
            state,
            context_state: ContextState::Root,
            program_body_length,
            forbid_computed_members: state != ValidationState::Text,
        }
    }

    fn with_state(self, context_state: ContextState) -> Self {
        ValidatorContext {
            context_state,
            ..self
        }
    }

    fn nested(self) -> Self {
        ValidatorContext {
            context_state: ContextState::Nested,
            forbid_computed_members: false,
            ..self
        }
    }

    /// Positions where only identifiers and property chains are legal
    fn is_restricted(&self) -> bool {
        match self.state {
            ValidationState::Text => false,
            ValidationState::Bind => true,
            ValidationState::Event => self.context_state != ContextState::Nested,
        }
    }
}

/// Validate the value of a `bind:` attribute
pub fn check_bind_expression(
    program: &ProgramNode,
    handler: &dyn ErrorHandler,
    meta: &DiagnosticMeta,
) -> Result<()> {
    check_program(program, ValidationState::Bind, handler, meta)
}

/// Validate the value of an `on:` attribute
pub fn check_event_expression(
    program: &ProgramNode,
    handler: &dyn ErrorHandler,
    meta: &DiagnosticMeta,
) -> Result<()> {
    check_program(program, ValidationState::Event, handler, meta)
}

/// Validate a `{{ … }}` region of text or of an attribute value
pub fn check_text_expression(
    program: &ProgramNode,
    handler: &dyn ErrorHandler,
    meta: &DiagnosticMeta,
) -> Result<()> {
    check_program(program, ValidationState::Text, handler, meta)
}

fn check_program(
    program: &ProgramNode,
    state: ValidationState,
    handler: &dyn ErrorHandler,
    meta: &DiagnosticMeta,
) -> Result<()> {
    let context = ValidatorContext::new(state, program.body.len());
    if context.program_body_length > 1 {
        handler.warn(
            format!(
                "Expression \"{}\" contains {} statements; only the last value is used",
                program.source, context.program_body_length
            ),
            meta,
        );
    }
    let mut validator = ExpressionValidator {
        handler,
        meta,
        source: &program.source,
    };
    for statement in &program.body {
        statement.accept(&mut validator, &context)?;
    }
    Ok(())
}

struct ExpressionValidator<'a> {
    handler: &'a dyn ErrorHandler,
    meta: &'a DiagnosticMeta,
    source: &'a str,
}

impl<'a> ExpressionValidator<'a> {
    fn forbidden(&self, what: &str, context: &ValidatorContext) -> CompilerError {
        CompilerError::expression(format!(
            "Using {} is forbidden in {} expression \"{}\"",
            what,
            context.state.as_str(),
            self.source
        ))
    }

    /// Operators, literals and compound values are only legal in relaxed positions
    fn check_compound(&self, kind: &str, context: &ValidatorContext) -> Result<()> {
        if context.is_restricted() {
            return Err(self.forbidden(kind, context));
        }
        Ok(())
    }

    fn visit_nested(&mut self, expressions: &[Expression], context: &ValidatorContext) -> Result<()> {
        let nested = context.nested();
        for expression in expressions {
            expression.accept(self, &nested)?;
        }
        Ok(())
    }
}

impl<'a> ExpressionVisitor for ExpressionValidator<'a> {
    type Context = ValidatorContext;
    type Output = Result<()>;

    fn visit_array(&mut self, node: &ArrayExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound("array", context)?;
        self.visit_nested(&node.elements, context)
    }

    fn visit_assignment(&mut self, node: &AssignmentExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound("assignment", context)?;
        node.target.accept(self, &context.nested())?;
        node.value.accept(self, &context.nested())
    }

    fn visit_binary(&mut self, node: &BinaryExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound(&format!("binary operator \"{}\"", node.operator), context)?;
        node.left.accept(self, &context.nested())?;
        node.right.accept(self, &context.nested())
    }

    fn visit_call(&mut self, node: &CallExpression, context: &ValidatorContext) -> Result<()> {
        match (context.state, context.context_state) {
            (ValidationState::Event, ContextState::Root) => {
                node.callee
                    .accept(self, &context.with_state(ContextState::HandlerName))?;
                self.visit_nested(&node.arguments, context)
            }
            (ValidationState::Text, _) => {
                if matches!(*node.callee, Expression::Identifier(ref id) if id.name == DEBUG_IDENTIFIER) {
                    self.handler.warn(
                        format!("Call of \"{}\" found in expression \"{}\"", DEBUG_IDENTIFIER, self.source),
                        self.meta,
                    );
                }
                node.callee.accept(self, &context.nested())?;
                self.visit_nested(&node.arguments, context)
            }
            _ => {
                self.check_compound("function call", context)?;
                node.callee.accept(self, &context.nested())?;
                self.visit_nested(&node.arguments, context)
            }
        }
    }

    fn visit_conditional(&mut self, node: &ConditionalExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound("conditional operator", context)?;
        let nested = context.nested();
        node.test.accept(self, &nested)?;
        node.consequent.accept(self, &nested)?;
        match &node.alternate {
            Some(alternate) => alternate.accept(self, &nested),
            None => Ok(()),
        }
    }

    fn visit_decorator(&mut self, node: &DecoratorExpression, context: &ValidatorContext) -> Result<()> {
        if context.state != ValidationState::Text {
            return Err(self.forbidden(&format!("decorator \"{}\"", node.name), context));
        }
        node.value.accept(self, &context.nested())?;
        self.visit_nested(&node.arguments, context)
    }

    fn visit_logical(&mut self, node: &LogicalExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound(&format!("logical operator \"{}\"", node.operator), context)?;
        node.left.accept(self, &context.nested())?;
        node.right.accept(self, &context.nested())
    }

    fn visit_member(&mut self, node: &MemberExpression, context: &ValidatorContext) -> Result<()> {
        if node.computed && context.forbid_computed_members {
            return Err(self.forbidden("computed member access", context));
        }
        if context.state == ValidationState::Bind
            && context.context_state == ContextState::Root
            && !node.computed
            && matches!(*node.object, Expression::Identifier(ref id) if id.name == OPTIONS_IDENTIFIER)
        {
            return Err(CompilerError::expression(format!(
                "Binding to \"{}\" is forbidden; bind to a state field instead of an option",
                self.source
            )));
        }

        let object_context = if context.is_restricted() {
            match context.context_state {
                ContextState::Root => context.with_state(ContextState::Chain),
                _ => *context,
            }
        } else {
            context.nested()
        };
        node.object.accept(self, &object_context)?;
        if node.computed {
            node.property.accept(self, &context.nested())?;
        }
        Ok(())
    }

    fn visit_object(&mut self, node: &ObjectExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound("object", context)?;
        let nested = context.nested();
        for property in &node.properties {
            property.value.accept(self, &nested)?;
        }
        Ok(())
    }

    fn visit_sequence(&mut self, node: &SequenceExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound("sequence", context)?;
        self.visit_nested(&node.expressions, context)
    }

    fn visit_unary(&mut self, node: &UnaryExpression, context: &ValidatorContext) -> Result<()> {
        self.check_compound(&format!("unary operator \"{}\"", node.operator), context)?;
        node.argument.accept(self, &context.nested())
    }

    fn visit_this(&mut self, _node: &ThisExpression, _context: &ValidatorContext) -> Result<()> {
        Ok(())
    }

    fn visit_literal(&mut self, _node: &Literal, context: &ValidatorContext) -> Result<()> {
        self.check_compound("literal", context)
    }

    fn visit_identifier(&mut self, _node: &Identifier, _context: &ValidatorContext) -> Result<()> {
        Ok(())
    }
}
