/**
 * Mustache Expression AST
 *
 * Node types produced by the expression parser and walked by the expression validator
 */

use serde::Serialize;

/// Byte range of a node in the expression source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }
}

/// Root of a parsed expression: one or more `;`-separated statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramNode {
    pub body: Vec<Expression>,
    pub source: String,
    pub span: ParseSpan,
}

impl ProgramNode {
    /// The single statement of a program, if it has exactly one
    pub fn single(&self) -> Option<&Expression> {
        match self.body.as_slice() {
            [expression] => Some(expression),
            _ => None,
        }
    }
}

/// Visitor over expression nodes
pub trait ExpressionVisitor {
    type Context;
    type Output;

    fn visit_array(&mut self, node: &ArrayExpression, context: &Self::Context) -> Self::Output;
    fn visit_assignment(&mut self, node: &AssignmentExpression, context: &Self::Context) -> Self::Output;
    fn visit_binary(&mut self, node: &BinaryExpression, context: &Self::Context) -> Self::Output;
    fn visit_call(&mut self, node: &CallExpression, context: &Self::Context) -> Self::Output;
    fn visit_conditional(&mut self, node: &ConditionalExpression, context: &Self::Context) -> Self::Output;
    fn visit_decorator(&mut self, node: &DecoratorExpression, context: &Self::Context) -> Self::Output;
    fn visit_logical(&mut self, node: &LogicalExpression, context: &Self::Context) -> Self::Output;
    fn visit_member(&mut self, node: &MemberExpression, context: &Self::Context) -> Self::Output;
    fn visit_object(&mut self, node: &ObjectExpression, context: &Self::Context) -> Self::Output;
    fn visit_sequence(&mut self, node: &SequenceExpression, context: &Self::Context) -> Self::Output;
    fn visit_unary(&mut self, node: &UnaryExpression, context: &Self::Context) -> Self::Output;
    fn visit_this(&mut self, node: &ThisExpression, context: &Self::Context) -> Self::Output;
    fn visit_literal(&mut self, node: &Literal, context: &Self::Context) -> Self::Output;
    fn visit_identifier(&mut self, node: &Identifier, context: &Self::Context) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Array(ArrayExpression),
    Assignment(AssignmentExpression),
    Binary(BinaryExpression),
    Call(CallExpression),
    Conditional(ConditionalExpression),
    Decorator(DecoratorExpression),
    Logical(LogicalExpression),
    Member(MemberExpression),
    Object(ObjectExpression),
    Sequence(SequenceExpression),
    Unary(UnaryExpression),
    This(ThisExpression),
    Literal(Literal),
    Identifier(Identifier),
}

impl Expression {
    pub fn accept<V: ExpressionVisitor + ?Sized>(&self, visitor: &mut V, context: &V::Context) -> V::Output {
        match self {
            Expression::Array(n) => visitor.visit_array(n, context),
            Expression::Assignment(n) => visitor.visit_assignment(n, context),
            Expression::Binary(n) => visitor.visit_binary(n, context),
            Expression::Call(n) => visitor.visit_call(n, context),
            Expression::Conditional(n) => visitor.visit_conditional(n, context),
            Expression::Decorator(n) => visitor.visit_decorator(n, context),
            Expression::Logical(n) => visitor.visit_logical(n, context),
            Expression::Member(n) => visitor.visit_member(n, context),
            Expression::Object(n) => visitor.visit_object(n, context),
            Expression::Sequence(n) => visitor.visit_sequence(n, context),
            Expression::Unary(n) => visitor.visit_unary(n, context),
            Expression::This(n) => visitor.visit_this(n, context),
            Expression::Literal(n) => visitor.visit_literal(n, context),
            Expression::Identifier(n) => visitor.visit_identifier(n, context),
        }
    }

    pub fn span(&self) -> ParseSpan {
        match self {
            Expression::Array(n) => n.span,
            Expression::Assignment(n) => n.span,
            Expression::Binary(n) => n.span,
            Expression::Call(n) => n.span,
            Expression::Conditional(n) => n.span,
            Expression::Decorator(n) => n.span,
            Expression::Logical(n) => n.span,
            Expression::Member(n) => n.span,
            Expression::Object(n) => n.span,
            Expression::Sequence(n) => n.span,
            Expression::Unary(n) => n.span,
            Expression::This(n) => n.span,
            Expression::Literal(n) => n.span,
            Expression::Identifier(n) => n.span,
        }
    }

    /// Human readable kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Array(_) => "array",
            Expression::Assignment(_) => "assignment",
            Expression::Binary(_) => "binary operator",
            Expression::Call(_) => "function call",
            Expression::Conditional(_) => "conditional operator",
            Expression::Decorator(_) => "decorator",
            Expression::Logical(_) => "logical operator",
            Expression::Member(_) => "member access",
            Expression::Object(_) => "object",
            Expression::Sequence(_) => "sequence",
            Expression::Unary(_) => "unary operator",
            Expression::This(_) => "this",
            Expression::Literal(_) => "literal",
            Expression::Identifier(_) => "identifier",
        }
    }
}

/// `[a, b]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub span: ParseSpan,
}

/// `target = value`, only meaningful in cycle headers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentExpression {
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: ParseSpan,
}

/// Arithmetic, equality and relational operators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: ParseSpan,
}

/// `test ? consequent : alternate`; the alternate branch may be omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Option<Box<Expression>>,
    pub span: ParseSpan,
}

/// `value|name:arg1:arg2`; a chain of decorators nests left to right
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratorExpression {
    pub value: Box<Expression>,
    pub name: String,
    pub arguments: Vec<Expression>,
    pub span: ParseSpan,
}

/// `&&`, `||` and `??`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalExpression {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: ParseSpan,
}

/// `object.property` or, when `computed`, `object[property]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
    pub span: ParseSpan,
}

/// `a, b, c`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    pub span: ParseSpan,
}

/// `!a`, `-a`, `+a`, `typeof a`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpression {
    pub operator: String,
    pub argument: Box<Expression>,
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThisExpression {
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: ParseSpan,
}
