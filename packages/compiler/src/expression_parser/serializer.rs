/**
 * Mustache Expression Serializer
 *
 * Serializes an expression AST back to canonical source text. Operands of operators are
 * parenthesized whenever they are compound, so the output never depends on precedence.
 */
use super::ast::*;

/// Serialize a program to string
pub fn serialize(program: &ProgramNode) -> String {
    program
        .body
        .iter()
        .map(serialize_expression)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn serialize_expression(expression: &Expression) -> String {
    expression.accept(&mut SerializeExpressionVisitor, &())
}

struct SerializeExpressionVisitor;

impl SerializeExpressionVisitor {
    fn operand(&mut self, expression: &Expression) -> String {
        let text = expression.accept(self, &());
        match expression {
            Expression::Assignment(_)
            | Expression::Binary(_)
            | Expression::Logical(_)
            | Expression::Conditional(_)
            | Expression::Sequence(_)
            | Expression::Decorator(_) => format!("({})", text),
            _ => text,
        }
    }

    fn list(&mut self, expressions: &[Expression]) -> String {
        expressions
            .iter()
            .map(|e| e.accept(self, &()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ExpressionVisitor for SerializeExpressionVisitor {
    type Context = ();
    type Output = String;

    fn visit_array(&mut self, node: &ArrayExpression, _: &()) -> String {
        format!("[{}]", self.list(&node.elements))
    }

    fn visit_assignment(&mut self, node: &AssignmentExpression, _: &()) -> String {
        format!("{} = {}", node.target.accept(self, &()), node.value.accept(self, &()))
    }

    fn visit_binary(&mut self, node: &BinaryExpression, _: &()) -> String {
        format!(
            "{} {} {}",
            self.operand(&node.left),
            node.operator,
            self.operand(&node.right)
        )
    }

    fn visit_call(&mut self, node: &CallExpression, _: &()) -> String {
        format!("{}({})", self.operand(&node.callee), self.list(&node.arguments))
    }

    fn visit_conditional(&mut self, node: &ConditionalExpression, _: &()) -> String {
        let mut text = format!("{} ? {}", self.operand(&node.test), self.operand(&node.consequent));
        if let Some(alternate) = &node.alternate {
            text.push_str(" : ");
            text.push_str(&self.operand(alternate));
        }
        text
    }

    fn visit_decorator(&mut self, node: &DecoratorExpression, _: &()) -> String {
        let mut text = format!("{}|{}", node.value.accept(self, &()), node.name);
        for argument in &node.arguments {
            text.push(':');
            text.push_str(&self.operand(argument));
        }
        text
    }

    fn visit_logical(&mut self, node: &LogicalExpression, _: &()) -> String {
        format!(
            "{} {} {}",
            self.operand(&node.left),
            node.operator,
            self.operand(&node.right)
        )
    }

    fn visit_member(&mut self, node: &MemberExpression, _: &()) -> String {
        let object = self.operand(&node.object);
        if node.computed {
            format!("{}[{}]", object, node.property.accept(self, &()))
        } else {
            format!("{}.{}", object, node.property.accept(self, &()))
        }
    }

    fn visit_object(&mut self, node: &ObjectExpression, _: &()) -> String {
        let properties = node
            .properties
            .iter()
            .map(|p| format!("{}: {}", p.key, p.value.accept(self, &())))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", properties)
    }

    fn visit_sequence(&mut self, node: &SequenceExpression, _: &()) -> String {
        self.list(&node.expressions)
    }

    fn visit_unary(&mut self, node: &UnaryExpression, _: &()) -> String {
        let argument = self.operand(&node.argument);
        if node.operator == "typeof" {
            format!("typeof {}", argument)
        } else {
            format!("{}{}", node.operator, argument)
        }
    }

    fn visit_this(&mut self, _: &ThisExpression, _: &()) -> String {
        "this".to_string()
    }

    fn visit_literal(&mut self, node: &Literal, _: &()) -> String {
        match &node.value {
            LiteralValue::String(value) => format!("'{}'", value.replace('\'', "\\'")),
            LiteralValue::Number(value) => value.to_string(),
            LiteralValue::Boolean(value) => value.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
        }
    }

    fn visit_identifier(&mut self, node: &Identifier, _: &()) -> String {
        node.name.clone()
    }
}
