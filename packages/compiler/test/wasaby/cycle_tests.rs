//! Cycle Tests
//!
//! `ws:for` parameters in both cycle forms

use pretty_assertions::assert_eq;

use wasaby_compiler::expression_parser::{serialize, Parser, ProgramNode};
use wasaby_compiler::wasaby::traverse::cycle::{parse_cycle, CycleParameters};

#[path = "util.rs"]
mod util;
use util::*;

fn humanize_cycle(data: &str) -> Vec<String> {
    let parser = Parser::new();
    let optional = |program: Option<ProgramNode>| program.as_ref().map(serialize).unwrap_or_default();
    match parse_cycle(&parser, data).unwrap() {
        CycleParameters::For { init, test, update } => {
            vec!["For".to_string(), optional(init), serialize(&test), optional(update)]
        }
        CycleParameters::Foreach {
            index,
            iterator,
            collection,
        } => vec![
            "Foreach".to_string(),
            optional(index),
            serialize(&iterator),
            serialize(&collection),
        ],
    }
}

fn cycle_error(data: &str) -> String {
    parse_cycle(&Parser::new(), data).unwrap_err().to_string()
}

#[test]
fn should_parse_for_cycle() {
    assert_eq!(
        humanize_cycle("{{ i = 0; i < items.length; i = i + 1 }}"),
        vec!["For", "i = 0", "i < items.length", "i = i + 1"]
    );
}

#[test]
fn should_allow_empty_init_and_update() {
    assert_eq!(humanize_cycle("; flag;"), vec!["For", "", "flag", ""]);
    assert_eq!(humanize_cycle("; flag; ;"), vec!["For", "", "flag", ""]);
}

#[test]
fn should_require_for_test() {
    assert!(cycle_error("i = 0; ; i = i + 1").contains("test"));
}

#[test]
fn should_reject_wrong_number_of_for_parameters() {
    assert!(cycle_error("a; b").contains("Wrong number"));
    assert!(cycle_error("a; b; c; d").contains("Wrong number"));
}

#[test]
fn should_parse_foreach_cycle() {
    assert_eq!(humanize_cycle("item in items"), vec!["Foreach", "", "item", "items"]);
    assert_eq!(
        humanize_cycle("{{ key, value in getItems(filter) }}"),
        vec!["Foreach", "key", "value", "getItems(filter)"]
    );
}

#[test]
fn should_accept_alias_syntax() {
    assert_eq!(
        humanize_cycle("index as item in items"),
        vec!["Foreach", "index", "item", "items"]
    );
}

#[test]
fn should_name_failing_part() {
    assert!(cycle_error("item in items +").contains("collection"));
    assert!(cycle_error("item.value in items").contains("iterator"));
    assert!(cycle_error("a.b, item in items").contains("index"));
}

#[test]
fn should_reject_malformed_foreach() {
    assert!(cycle_error("items").contains("foreach"));
    assert!(cycle_error("a, b, c in items").contains("identifiers"));
}

#[test]
fn should_report_invalid_cycle_in_template() {
    let result = parse_wml(r#"<ws:for data="item in">{{ item }}</ws:for>"#);
    assert!(result.failed);
    assert!(result.nodes.is_empty());

    let result = parse_wml(r#"<div for="a; b">x</div>"#);
    assert!(result.failed);
    assert!(result.nodes.is_empty());
}
