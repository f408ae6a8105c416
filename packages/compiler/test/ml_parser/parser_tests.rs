//! ML Parser Tests
//!
//! Tag tree building, error recovery and source positions

use pretty_assertions::assert_eq;

use wasaby_compiler::ml_parser::ast::*;
use wasaby_compiler::ml_parser::{parse, ParseOptions, ParseTreeResult};
use wasaby_compiler::parse_util::{ParseErrorLevel, SourcePosition};

/// Flattens the tag tree into `[kind, data, depth]` rows
struct DomHumanizer {
    result: Vec<Vec<String>>,
}

impl NodeVisitor for DomHumanizer {
    type Context = usize;
    type Output = ();

    fn visit_tag(&mut self, tag: &Tag, depth: &usize) {
        self.result
            .push(vec!["Tag".to_string(), tag.name.clone(), depth.to_string()]);
        for attribute in tag.attributes.values() {
            self.result.push(vec![
                "Attribute".to_string(),
                format!("{}={}", attribute.name, attribute.value.as_deref().unwrap_or("<none>")),
                depth.to_string(),
            ]);
        }
        for child in &tag.children {
            child.accept(self, &(depth + 1));
        }
    }

    fn visit_text(&mut self, text: &Text, depth: &usize) {
        self.push("Text", &text.data, *depth);
    }

    fn visit_comment(&mut self, comment: &Comment, depth: &usize) {
        self.push("Comment", &comment.data, *depth);
    }

    fn visit_cdata(&mut self, cdata: &CData, depth: &usize) {
        self.push("CData", &cdata.data, *depth);
    }

    fn visit_doctype(&mut self, doctype: &Doctype, depth: &usize) {
        self.push("Doctype", &doctype.data, *depth);
    }

    fn visit_instruction(&mut self, instruction: &Instruction, depth: &usize) {
        self.push("Instruction", &instruction.data, *depth);
    }
}

impl DomHumanizer {
    fn push(&mut self, kind: &str, data: &str, depth: usize) {
        self.result
            .push(vec![kind.to_string(), data.to_string(), depth.to_string()]);
    }
}

fn parse_default(source: &str) -> ParseTreeResult {
    parse(source, &ParseOptions::default())
}

fn humanize_dom(result: &ParseTreeResult) -> Vec<Vec<String>> {
    assert!(
        result.errors.is_empty(),
        "Unexpected parse errors: {:?}",
        result.errors
    );
    let mut humanizer = DomHumanizer { result: vec![] };
    for node in &result.root_nodes {
        node.accept(&mut humanizer, &0);
    }
    humanizer.result
}

fn humanize_errors(result: &ParseTreeResult) -> Vec<(String, String)> {
    result
        .errors
        .iter()
        .map(|error| (error.msg.clone(), error.position.to_string()))
        .collect()
}

fn row(kind: &str, data: &str, depth: usize) -> Vec<String> {
    vec![kind.to_string(), data.to_string(), depth.to_string()]
}

mod tree {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_nested_directives_and_components() {
        let result = parse_default(
            r#"<ws:if data="{{ visible }}"><Controls.buttons:Button caption="Ok"/>text</ws:if>"#,
        );
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Tag", "ws:if", 0),
                row("Attribute", "data={{ visible }}", 0),
                row("Tag", "Controls.buttons:Button", 1),
                row("Attribute", "caption=Ok", 1),
                row("Text", "text", 1),
            ]
        );
    }

    #[test]
    fn should_keep_attribute_order_and_valueless_attributes() {
        let result = parse_default("<input type=checkbox checked data-id='7'>");
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Tag", "input", 0),
                row("Attribute", "type=checkbox", 0),
                row("Attribute", "checked=<none>", 0),
                row("Attribute", "data-id=7", 0),
            ]
        );
    }

    #[test]
    fn should_parse_special_nodes() {
        let result = parse_default(
            "<!DOCTYPE html><?xml version=\"1.0\"?><!-- note --><div><![CDATA[a < b]]></div>",
        );
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Doctype", "DOCTYPE html", 0),
                row("Instruction", "xml version=\"1.0\"", 0),
                row("Comment", " note ", 0),
                row("Tag", "div", 0),
                row("CData", "a < b", 1),
            ]
        );
    }

    #[test]
    fn should_not_open_tags_inside_mustache() {
        let result = parse_default("<span>{{ a < b ? '<i>' : '' }}</span>");
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Tag", "span", 0),
                row("Text", "{{ a < b ? '<i>' : '' }}", 1),
            ]
        );
    }

    #[test]
    fn should_keep_raw_text_of_script_and_style() {
        let result = parse_default("<style>a > b { color: red }</style>");
        assert_eq!(
            humanize_dom(&result),
            vec![row("Tag", "style", 0), row("Text", "a > b { color: red }", 1)]
        );
    }

    #[test]
    fn should_treat_lone_less_than_as_text() {
        let result = parse_default("<p>1 < 2</p>");
        assert_eq!(
            humanize_dom(&result),
            vec![row("Tag", "p", 0), row("Text", "1 < 2", 1)]
        );
    }

    #[test]
    fn should_mark_self_closing_tags_only() {
        let result = parse_default("<ws:partial template='a'/><br>");
        assert!(result.root_nodes[0].as_tag().map_or(false, |tag| tag.is_self_closing));
        assert!(result.root_nodes[1].as_tag().map_or(false, |tag| !tag.is_self_closing));
    }
}

mod whitespace {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_drop_whitespace_only_text_by_default() {
        let result = parse_default("<ul>\n  <li>a</li>\n  <li> b </li>\n</ul>");
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Tag", "ul", 0),
                row("Tag", "li", 1),
                row("Text", "a", 2),
                row("Tag", "li", 1),
                row("Text", " b ", 2),
            ]
        );
    }

    #[test]
    fn should_preserve_whitespace_when_asked() {
        let result = parse(
            "<ul> <li>a</li> </ul>",
            &ParseOptions {
                preserve_whitespaces: true,
            },
        );
        assert_eq!(
            humanize_dom(&result),
            vec![
                row("Tag", "ul", 0),
                row("Text", " ", 1),
                row("Tag", "li", 1),
                row("Text", "a", 2),
                row("Text", " ", 1),
            ]
        );
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_report_unclosed_elements_at_end_of_input() {
        let result = parse_default("<div>\n  <span>text");
        assert_eq!(
            humanize_errors(&result),
            vec![
                ("Unclosed element \"span\"".to_string(), "2:3".to_string()),
                ("Unclosed element \"div\"".to_string(), "1:1".to_string()),
            ]
        );
        assert!(result.has_errors());
    }

    #[test]
    fn should_recover_from_unexpected_closing_tag() {
        let result = parse_default("<div></span></div>");
        assert_eq!(result.root_nodes.len(), 1);
        assert_eq!(
            humanize_errors(&result),
            vec![("Unexpected closing tag \"span\"".to_string(), "1:6".to_string())]
        );
    }

    #[test]
    fn should_reject_end_tag_of_void_element() {
        let result = parse_default("<br></br>");
        assert!(result.errors[0].msg.contains("Void element \"br\""));
    }

    #[test]
    fn should_report_unterminated_constructs() {
        assert!(parse_default("<!-- open").errors[0].msg.contains("Unterminated comment"));
        assert!(parse_default("<div title=\"x>").errors[0]
            .msg
            .contains("Unterminated value of attribute \"title\""));
        assert!(parse_default("<div").errors[0].msg.contains("Unexpected end of input"));
    }

    #[test]
    fn should_downgrade_duplicate_attributes_to_warnings() {
        let result = parse_default(r#"<div class="a" class="b"></div>"#);
        assert!(!result.has_errors());
        assert_eq!(result.errors[0].level, ParseErrorLevel::Warning);
        assert_eq!(
            result.root_nodes[0].as_tag().and_then(|tag| tag.attribute_value("class")),
            Some("a")
        );
    }
}

mod positions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_track_zero_based_positions() {
        let result = parse_default("<div>\n  <b id=\"x\">t</b>\n</div>");
        let div = result.root_nodes[0].as_tag().unwrap();
        assert_eq!(div.position, SourcePosition::new(0, 0));
        let bold = div.children[0].as_tag().unwrap();
        assert_eq!(bold.position, SourcePosition::new(1, 2));
        assert_eq!(bold.attributes["id"].position, SourcePosition::new(1, 5));
        assert_eq!(bold.children[0].position(), SourcePosition::new(1, 12));
    }

    #[test]
    fn should_display_one_based_positions() {
        assert_eq!(SourcePosition::new(2, 4).to_string(), "3:5");
    }
}
