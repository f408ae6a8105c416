//! Traverse Tests
//!
//! Markup, components, directives and partials through the whole pipeline

use pretty_assertions::assert_eq;

use wasaby_compiler::config::CompilerConfig;
use wasaby_compiler::diagnostics::DiagnosticLevel;
use wasaby_compiler::wasaby::ast::{Ast, Flags};

#[path = "util.rs"]
mod util;
use util::*;

mod markup {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_elements_with_attributes_and_events() {
        assert_eq!(
            expect_ast(r#"<div class="a   b" on:click="handler(1)">Hello {{ name }}</div>"#),
            rows(&[
                &["Element", "div"],
                &["Attribute", "class", "a b"],
                &["Event", "click", "handler(1)"],
                &["Text", "Hello {{ name }}"],
            ])
        );
    }

    #[test]
    fn should_keep_nested_elements_in_order() {
        assert_eq!(
            expect_ast("<ul><li>one</li><li>two</li></ul>"),
            rows(&[
                &["Element", "ul"],
                &["Element", "li"],
                &["Text", "one"],
                &["Element", "li"],
                &["Text", "two"],
            ])
        );
    }

    #[test]
    fn should_assign_sibling_keys() {
        let result = parse_wml("<a/><b/><i/>");
        let keys: Vec<usize> = result.nodes.iter().map(|node| node.meta().key).collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn should_default_boolean_attributes() {
        assert_eq!(
            expect_ast("<input disabled/>"),
            rows(&[&["Element", "input"], &["Attribute", "disabled", "true"]])
        );
    }

    #[test]
    fn should_warn_about_useless_attr_prefix() {
        let result = parse_wml(r#"<div attr:title="x"/>"#);
        assert!(!result.failed);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[&["Element", "div"], &["Attribute", "title", "x"]])
        );
        assert!(warnings(&result)[0].contains("useless"));
    }

    #[test]
    fn should_produce_leaf_markup_nodes() {
        assert_eq!(
            expect_ast("<!DOCTYPE html><?xml version=\"1.0\"?><![CDATA[raw]]>"),
            rows(&[
                &["Doctype", "DOCTYPE html"],
                &["Instruction", "xml version=\"1.0\""],
                &["CData", "raw"],
            ])
        );
    }

    #[test]
    fn should_drop_comments_unless_preserved() {
        assert_eq!(expect_ast("<div><!-- note --></div>"), rows(&[&["Element", "div"]]));

        let mut config = CompilerConfig::new("comments.wml");
        config.preserve_comments = true;
        let result = parse_wml_with_config("<div><!-- note --></div>", &config);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[&["Element", "div"], &["Comment", " note "]])
        );
    }

    #[test]
    fn should_merge_text_around_dropped_comment() {
        let result = parse_wml("<div>a {{ b }}<!-- note --> c</div>");
        assert!(!result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["Element", "div"], &["Text", "a {{ b }} c"]]));
        match &result.nodes[0] {
            Ast::Element(div) => match &div.content[..] {
                [Ast::Text(text)] => {
                    let keys: Vec<usize> = text.content.iter().map(|item| item.meta().key).collect();
                    assert_eq!(keys, vec![0, 1, 2]);
                }
                other => panic!("Expected one text node, got {:?}", other),
            },
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn should_translate_text_when_configured() {
        let mut config = CompilerConfig::new("i18n.wml");
        config.generate_translations = true;
        let result = parse_wml_with_config(r#"<span title="Hint">Save {[ menu@@Open ]}</span>"#, &config);
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[
                &["Element", "span"],
                &["Attribute", "title", "{[ Hint ]}"],
                &["Text", "{[ Save ]} {[ menu@@Open ]}"],
            ])
        );
        let texts: Vec<&str> = result.translations.iter().map(|unit| unit.text.as_str()).collect();
        assert!(texts.contains(&"Save"));
        assert!(texts.contains(&"Open"));
        assert!(texts.contains(&"Hint"));
    }

    #[test]
    fn should_report_markup_errors_as_failures() {
        let result = parse_wml("<div><span></div>");
        assert!(result.failed);
        assert!(messages_at_least(&result, DiagnosticLevel::Critical)[0].contains("Unclosed element"));
    }

    #[test]
    fn should_reject_unknown_directives_in_markup() {
        let result = parse_wml("<div><ws:title>x</ws:title></div>");
        assert!(result.failed);
        assert!(messages_at_least(&result, DiagnosticLevel::Critical)[0].contains("Unknown directive"));
    }

    #[test]
    fn should_reject_invalid_text_expressions() {
        let result = parse_wml("<div>{{ a + }}</div>");
        assert!(result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["Element", "div"]]));
    }
}

mod components {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_pack_content_into_content_option() {
        let result = parse_wml(
            r#"<Controls.buttons:Button caption="Ok" bind:value="_value"><span>x</span></Controls.buttons:Button>"#,
        );
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize_with_flags(&result.nodes),
            rows(&[
                &["Component", "Controls.buttons:Button"],
                &["Bind", "value", "_value"],
                &["Option", "caption", "#unpacked"],
                &["Value", "Ok"],
                &["ContentOption", "content", "#nestCasted"],
                &["Element", "span"],
                &["Text", "x"],
            ])
        );
        assert_eq!(result.dependencies, vec!["Controls.buttons:Button".to_string()]);
    }

    #[test]
    fn should_collect_option_tags() {
        assert_eq!(
            expect_ast(
                "<UI.Base:Control>\
                   <ws:title>Header</ws:title>\
                   <ws:items><ws:Array><ws:Number>1</ws:Number><ws:Number>2</ws:Number></ws:Array></ws:items>\
                 </UI.Base:Control>"
            ),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["Option", "items"],
                &["Array"],
                &["Number", "1"],
                &["Number", "2"],
                &["ContentOption", "title"],
                &["Text", "Header"],
            ])
        );
    }

    #[test]
    fn should_forbid_mixing_options_and_content() {
        let result = parse_wml("<UI.Base:Control><ws:title>x</ws:title><div/></UI.Base:Control>");
        assert!(result.failed);
        let fatal = messages_at_least(&result, DiagnosticLevel::Fatal);
        assert_eq!(fatal, vec!["Forbidden to mix options with content".to_string()]);
        // the offending child is dropped, the established option is kept
        assert_eq!(
            humanize(&result.nodes),
            rows(&[&["Component", "UI.Base:Control"], &["ContentOption", "title"], &["Text", "x"]])
        );
    }

    #[test]
    fn should_report_duplicate_options() {
        let result = parse_wml(r#"<UI.Base:Control title="a"><ws:title>b</ws:title></UI.Base:Control>"#);
        assert!(!result.failed);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.message.contains("title")));
    }

    #[test]
    fn should_flag_broken_components() {
        let result = parse_wml(r#"<UI.Base:Control on:click="a || b"/>"#);
        assert!(result.failed);
        assert!(result.nodes[0].has_flag(Flags::BROKEN));
    }

    #[test]
    fn should_accept_legacy_component_tag() {
        let result = parse_wml(r#"<component data="Controls/Button" caption="Ok"/>"#);
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[&["Component", "Controls/Button"], &["Option", "caption"], &["Value", "Ok"]])
        );
        assert!(warnings(&result)[0].contains("deprecated"));
    }

    #[test]
    fn should_warn_about_empty_content() {
        let result = parse_wml("<UI.Base:Control></UI.Base:Control>");
        assert!(!result.failed);
        assert_eq!(warnings(&result).len(), 1);
    }
}

mod directives {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_link_else_chain() {
        let result = parse_wml(
            r#"<ws:if data="{{ a }}"><div/></ws:if><ws:else data="{{ b }}"><span/></ws:else><ws:else>text</ws:else>"#,
        );
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[
                &["If", "a"],
                &["Element", "div"],
                &["ElseIf", "b"],
                &["Element", "span"],
                &["Else"],
                &["Text", "text"],
            ])
        );
    }

    #[test]
    fn should_reject_else_without_if() {
        let result = parse_wml("<div/><ws:else>x</ws:else>");
        assert!(result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["Element", "div"]]));
    }

    #[test]
    fn should_reject_else_after_final_else() {
        let result = parse_wml(
            r#"<ws:if data="{{ a }}">1</ws:if><ws:else>2</ws:else><ws:else>3</ws:else>"#,
        );
        assert!(result.failed);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[&["If", "a"], &["Text", "1"], &["Else"], &["Text", "2"]])
        );
    }

    #[test]
    fn should_require_if_data() {
        let result = parse_wml("<ws:if>x</ws:if>");
        assert!(result.failed);
        assert!(result.nodes.is_empty());
    }

    #[test]
    fn should_parse_cycles() {
        assert_eq!(
            expect_ast(r#"<ws:for data="i = 0; i < 3; i = i + 1">{{ i }}</ws:for>"#),
            rows(&[&["For", "i = 0", "i < 3", "i = i + 1"], &["Text", "{{ i }}"]])
        );
        assert_eq!(
            expect_ast(r#"<ws:for data="index, item in items"><b>{{ item }}</b></ws:for>"#),
            rows(&[
                &["Foreach", "index", "item", "items"],
                &["Element", "b"],
                &["Text", "{{ item }}"],
            ])
        );
    }

    #[test]
    fn should_unpack_if_and_for_attributes() {
        let result = parse_wml(r#"<li for="item in items" if="{{ item.visible }}" class="row">{{ item.title }}</li>"#);
        assert_eq!(
            humanize_with_flags(&result.nodes),
            rows(&[
                &["Foreach", "", "item", "items", "#unpacked"],
                &["If", "item.visible", "#unpacked"],
                &["Element", "li"],
                &["Attribute", "class", "row"],
                &["Text", "{{ item.title }}"],
            ])
        );
        // both attributes on one tag are reported
        assert_eq!(warnings(&result).len(), 1);
    }

    #[test]
    fn should_keep_for_attribute_of_label() {
        assert_eq!(
            expect_ast(r#"<label for="name" if="{{ shown }}">x</label>"#),
            rows(&[
                &["If", "shown"],
                &["Element", "label"],
                &["Attribute", "for", "name"],
                &["Text", "x"],
            ])
        );
    }

    #[test]
    fn should_unpack_if_on_components() {
        assert_eq!(
            expect_ast(r#"<UI.Base:Control if="{{ shown }}"/>"#),
            rows(&[&["If", "shown"], &["Component", "UI.Base:Control"]])
        );
    }
}

mod templates_and_partials {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_resolve_inline_templates() {
        assert_eq!(
            expect_ast(
                r#"<ws:template name="row"><div>{{ value }}</div></ws:template><ws:partial template="row" value="{{ 1 }}"/>"#
            ),
            rows(&[
                &["Template", "row"],
                &["Element", "div"],
                &["Text", "{{ value }}"],
                &["InlineTemplate", "row"],
                &["Option", "value"],
                &["Value", "{{ 1 }}"],
            ])
        );
    }

    #[test]
    fn should_resolve_static_partials() {
        let result = parse_wml(r#"<ws:partial template="wml!Controls/list/row" item="{{ item }}"/>"#);
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[
                &["StaticPartial", "wml!Controls/list/row"],
                &["Option", "item"],
                &["Value", "{{ item }}"],
            ])
        );
        assert_eq!(result.dependencies, vec!["wml!Controls/list/row".to_string()]);
    }

    #[test]
    fn should_resolve_dynamic_partials() {
        assert_eq!(
            expect_ast(r#"<ws:partial template="{{ content }}"/>"#),
            rows(&[&["DynamicPartial", "content"]])
        );
    }

    #[test]
    fn should_reject_unknown_inline_templates() {
        let result = parse_wml(r#"<ws:partial template="missing"/>"#);
        assert!(result.failed);
        assert!(result.nodes.is_empty());

        let mut config = CompilerConfig::new("external.wml");
        config.allow_external_inline_templates = true;
        let result = parse_wml_with_config(r#"<ws:partial template="missing"/>"#, &config);
        assert!(!result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["InlineTemplate", "missing"]]));
    }

    #[test]
    fn should_require_template_option() {
        let result = parse_wml(r#"<ws:partial value="1"/>"#);
        assert!(result.failed);
        assert!(messages_at_least(&result, DiagnosticLevel::Critical)[0].contains("template"));
    }

    #[test]
    fn should_reject_compound_template_values() {
        let result = parse_wml(r#"<ws:partial template="row{{ suffix }}"/>"#);
        assert!(result.failed);
        assert!(!messages_at_least(&result, DiagnosticLevel::Fatal).is_empty());
    }

    #[test]
    fn should_report_duplicate_templates() {
        let result = parse_wml(r#"<ws:template name="a"/><ws:template name="a"/>"#);
        assert!(!result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["Template", "a"]]));
        assert_eq!(messages_at_least(&result, DiagnosticLevel::Error).len(), 1);
    }
}
