//! Expression Parser Tests
//!
//! Mustache expression grammar: precedence, member chains, decorators and errors

use pretty_assertions::assert_eq;

use wasaby_compiler::expression_parser::ast::*;
use wasaby_compiler::expression_parser::{serialize, Parser};

fn parse(source: &str) -> ProgramNode {
    match Parser::new().parse(source) {
        Ok(program) => program,
        Err(err) => panic!("Failed to parse {:?}: {}", source, err),
    }
}

fn unparse(source: &str) -> String {
    serialize(&parse(source))
}

fn parse_error(source: &str) -> String {
    match Parser::new().parse(source) {
        Ok(program) => panic!("Expected error for {:?}, got {:?}", source, program),
        Err(err) => err.to_string(),
    }
}

mod precedence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_bind_multiplicative_tighter_than_additive() {
        assert_eq!(unparse("a + b * c - d"), "(a + (b * c)) - d");
        assert_eq!(unparse("(a + b) * c"), "(a + b) * c");
    }

    #[test]
    fn should_order_comparison_and_logical_operators() {
        assert_eq!(unparse("a < b && c === d || e"), "((a < b) && (c === d)) || e");
        assert_eq!(unparse("a ?? b || c"), "(a ?? b) || c");
    }

    #[test]
    fn should_parse_prefix_operators() {
        assert_eq!(unparse("!a.b"), "!a.b");
        assert_eq!(unparse("-x + 1"), "-x + 1");
        assert_eq!(unparse("typeof value === 'string'"), "typeof value === 'string'");
    }

    #[test]
    fn should_parse_conditionals() {
        assert_eq!(unparse("a ? b : c ? d : e"), "a ? b : (c ? d : e)");
        assert_eq!(unparse("visible ? 'on'"), "visible ? 'on'");
    }

    #[test]
    fn should_put_sequence_lowest() {
        match parse("a, b = 1").single() {
            Some(Expression::Sequence(sequence)) => {
                assert_eq!(sequence.expressions.len(), 2);
                assert!(matches!(sequence.expressions[1], Expression::Assignment(_)));
            }
            other => panic!("Expected sequence, got {:?}", other),
        }
    }
}

mod primaries {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_literals() {
        let program = parse("'str'; 1.5; true; null; undefined; this");
        let kinds: Vec<&str> = program.body.iter().map(Expression::kind).collect();
        assert_eq!(kinds, vec!["literal", "literal", "literal", "literal", "literal", "this"]);
        assert!(matches!(
            program.body[1],
            Expression::Literal(Literal { value: LiteralValue::Number(n), .. }) if n == 1.5
        ));
    }

    #[test]
    fn should_parse_arrays_and_objects() {
        assert_eq!(unparse("[1, 'a', [b]]"), "[1, 'a', [b]]");
        assert_eq!(unparse("{ key: value, 'quoted': 2 }"), "{key: value, quoted: 2}");
    }

    #[test]
    fn should_parse_member_and_call_chains() {
        assert_eq!(unparse("a.b['c'](d)(e).f"), "a.b['c'](d)(e).f");
        match parse("list[index]").single() {
            Some(Expression::Member(member)) => assert!(member.computed),
            other => panic!("Expected member, got {:?}", other),
        }
    }

    #[test]
    fn should_escape_quotes_when_serializing() {
        assert_eq!(unparse(r#""it's""#), r"'it\'s'");
    }
}

mod decorators {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_chain_decorators_left_to_right() {
        match parse("price|round:2|currency").single() {
            Some(Expression::Decorator(outer)) => {
                assert_eq!(outer.name, "currency");
                assert!(outer.arguments.is_empty());
                match outer.value.as_ref() {
                    Expression::Decorator(inner) => {
                        assert_eq!(inner.name, "round");
                        assert_eq!(inner.arguments.len(), 1);
                    }
                    other => panic!("Expected inner decorator, got {:?}", other),
                }
            }
            other => panic!("Expected decorator, got {:?}", other),
        }
    }

    #[test]
    fn should_bind_decorators_looser_than_conditionals() {
        assert_eq!(unparse("a ? b : c|format"), "a ? b : c|format");
        match parse("a ? b : c|format").single() {
            Some(Expression::Decorator(decorator)) => {
                assert!(matches!(*decorator.value, Expression::Conditional(_)));
            }
            other => panic!("Expected decorator, got {:?}", other),
        }
    }
}

mod statements {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_split_statements() {
        let program = parse("first(); second()");
        assert_eq!(program.body.len(), 2);
        assert_eq!(program.source, "first(); second()");
    }

    #[test]
    fn should_parse_assignments_right_associative() {
        assert_eq!(unparse("a = b = c"), "a = b = c");
        match parse("a.b = 1").single() {
            Some(Expression::Assignment(assignment)) => {
                assert!(matches!(*assignment.target, Expression::Member(_)));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_reject_incomplete_expressions() {
        parse_error("a +");
        parse_error("(a");
        parse_error("[1, 2");
        parse_error("a ? ");
        parse_error("value|");
    }

    #[test]
    fn should_reject_adjacent_operands() {
        parse_error("a b");
        parse_error("1 2");
    }

    #[test]
    fn should_reject_invalid_assignment_targets() {
        assert!(parse_error("a + b = 1").contains("Invalid assignment target"));
        assert!(parse_error("f() = 1").contains("Invalid assignment target"));
    }

    #[test]
    fn should_reject_unterminated_strings() {
        parse_error("'abc");
    }
}
