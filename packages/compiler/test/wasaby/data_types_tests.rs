//! Data Type Tests
//!
//! Options, type casts and `ws:` data literals

use pretty_assertions::assert_eq;

use wasaby_compiler::diagnostics::DiagnosticLevel;

#[path = "util.rs"]
mod util;
use util::*;

/// Humanized options of a single component wrapping `options`
fn component_options(options: &str) -> Vec<Vec<String>> {
    let source = format!("<UI.Base:Control>{}</UI.Base:Control>", options);
    let mut rows = expect_ast(&source);
    assert_eq!(rows.remove(0), vec!["Component".to_string(), "UI.Base:Control".to_string()]);
    rows
}

fn failed_options(options: &str) -> CompileFailure {
    let source = format!("<UI.Base:Control>{}</UI.Base:Control>", options);
    let result = parse_wml(&source);
    assert!(result.failed, "expected failure for {:?}", options);
    CompileFailure {
        critical: messages_at_least(&result, DiagnosticLevel::Critical),
    }
}

struct CompileFailure {
    critical: Vec<String>,
}

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_scalar_literals() {
        assert_eq!(
            component_options(
                "<ws:flag><ws:Boolean>true</ws:Boolean></ws:flag>\
                 <ws:count><ws:Number>{{ total }}</ws:Number></ws:count>\
                 <ws:label><ws:String>Name: {{ name }}</ws:String></ws:label>\
                 <ws:raw><ws:Value>1</ws:Value></ws:raw>"
            ),
            rows(&[
                &["Option", "flag"],
                &["Boolean", "true"],
                &["Option", "count"],
                &["Number", "{{ total }}"],
                &["Option", "label"],
                &["String", "Name: {{ name }}"],
                &["Option", "raw"],
                &["Value", "1"],
            ])
        );
    }

    #[test]
    fn should_cast_several_literals_to_array() {
        assert_eq!(
            component_options("<ws:items><ws:String>a</ws:String><ws:String>b</ws:String></ws:items>"),
            rows(&[&["Option", "items"], &["Array"], &["String", "a"], &["String", "b"]])
        );
    }

    #[test]
    fn should_parse_objects() {
        assert_eq!(
            component_options(
                "<ws:config><ws:Object><ws:a>1</ws:a><ws:b><ws:Boolean>false</ws:Boolean></ws:b></ws:Object></ws:config>"
            ),
            rows(&[
                &["Option", "config"],
                &["Object"],
                &["ContentOption", "a"],
                &["Text", "1"],
                &["Option", "b"],
                &["Boolean", "false"],
            ])
        );
    }

    #[test]
    fn should_read_text_object_as_value() {
        assert_eq!(
            component_options("<ws:x><ws:Object>text</ws:Object></ws:x>"),
            rows(&[&["Option", "x"], &["Value", "text"]])
        );
    }

    #[test]
    fn should_unwrap_object_around_single_literal() {
        assert_eq!(
            component_options("<ws:x><ws:Object><ws:Array><ws:Number>1</ws:Number></ws:Array></ws:Object></ws:x>"),
            rows(&[&["Option", "x"], &["Array"], &["Number", "1"]])
        );
    }

    #[test]
    fn should_parse_functions_with_options() {
        assert_eq!(
            component_options(r#"<ws:handler><ws:Function arg="{{ 1 }}">Module/lib:handler</ws:Function></ws:handler>"#),
            rows(&[
                &["Option", "handler"],
                &["Function", "Module/lib:handler"],
                &["Option", "arg"],
                &["Value", "{{ 1 }}"],
            ])
        );
    }

    #[test]
    fn should_reject_invalid_scalars() {
        failed_options("<ws:flag><ws:Boolean>maybe</ws:Boolean></ws:flag>");
        failed_options("<ws:size><ws:Number>12px</ws:Number></ws:size>");
        failed_options("<ws:handler><ws:Function>{{ handler }}</ws:Function></ws:handler>");
        failed_options("<ws:handler><ws:Function>Module/row.wml</ws:Function></ws:handler>");
    }

    #[test]
    fn should_reject_tags_inside_scalars() {
        let failure = failed_options("<ws:label><ws:String><b>bold</b></ws:String></ws:label>");
        assert!(failure.critical[0].contains("<b>"));
    }

    #[test]
    fn should_reject_text_inside_arrays() {
        failed_options("<ws:items><ws:Array>text</ws:Array></ws:items>");
    }

    #[test]
    fn should_reject_data_types_in_markup() {
        let result = parse_wml("<div><ws:Number>1</ws:Number></div>");
        assert!(result.failed);
        assert_eq!(humanize(&result.nodes), rows(&[&["Element", "div"]]));
    }
}

mod options {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_unpack_option_attributes_into_object() {
        let result = parse_wml(r#"<UI.Base:Control><ws:config caption="Ok" icon="add"/></UI.Base:Control>"#);
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize_with_flags(&result.nodes),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["Option", "config"],
                &["Object", "#unpacked"],
                &["Option", "caption", "#unpacked"],
                &["Value", "Ok"],
                &["Option", "icon", "#unpacked"],
                &["Value", "add"],
            ])
        );
    }

    #[test]
    fn should_merge_attributes_with_nested_options() {
        assert_eq!(
            component_options(r#"<ws:config caption="Ok"><ws:icon>add</ws:icon></ws:config>"#),
            rows(&[
                &["Option", "config"],
                &["Object"],
                &["Option", "caption"],
                &["Value", "Ok"],
                &["ContentOption", "icon"],
                &["Text", "add"],
            ])
        );
    }

    #[test]
    fn should_ignore_attributes_combined_with_content() {
        let result = parse_wml(r#"<UI.Base:Control><ws:title size="l">Header</ws:title></UI.Base:Control>"#);
        assert!(!result.failed);
        assert_eq!(
            humanize(&result.nodes),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["ContentOption", "title"],
                &["Text", "Header"],
            ])
        );
        assert_eq!(warnings(&result).len(), 1);
    }

    #[test]
    fn should_produce_empty_value_for_empty_option() {
        assert_eq!(
            component_options("<ws:empty/>"),
            rows(&[&["Option", "empty"], &["Value", ""]])
        );
    }

    #[test]
    fn should_cast_option_with_type_attribute() {
        let result = parse_wml(
            r#"<UI.Base:Control><ws:count type="number">5</ws:count><ws:list type="array"><ws:Number>1</ws:Number></ws:list></UI.Base:Control>"#,
        );
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize_with_flags(&result.nodes),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["Option", "count"],
                &["Number", "5", "#typeCasted"],
                &["Option", "list"],
                &["Array", "#typeCasted"],
                &["Number", "1"],
            ])
        );
    }

    #[test]
    fn should_accept_binary_and_octal_numbers() {
        assert_eq!(
            component_options(
                r#"<ws:mask type="number">0b101</ws:mask><ws:mode><ws:Number>0o17</ws:Number></ws:mode>"#
            ),
            rows(&[
                &["Option", "mask"],
                &["Number", "0b101"],
                &["Option", "mode"],
                &["Number", "0o17"],
            ])
        );
        failed_options(r#"<ws:mask type="number">1_0</ws:mask>"#);
    }

    #[test]
    fn should_validate_boolean_type_cast() {
        let result = parse_wml(r#"<UI.Base:Control><ws:flag type="boolean">true</ws:flag></UI.Base:Control>"#);
        assert!(!result.failed, "{:?}", result.diagnostics);
        assert_eq!(
            humanize_with_flags(&result.nodes),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["Option", "flag"],
                &["Boolean", "true", "#typeCasted"],
            ])
        );
        failed_options(r#"<ws:flag type="boolean">maybe</ws:flag>"#);
    }

    #[test]
    fn should_keep_legacy_string_type() {
        assert_eq!(
            component_options(r#"<ws:label type="string"><ws:String>a</ws:String></ws:label>"#),
            rows(&[&["Option", "label"], &["String", "a"]])
        );
    }

    #[test]
    fn should_reject_double_type_definition() {
        let failure = failed_options(r#"<ws:count type="number"><ws:Number>1</ws:Number></ws:count>"#);
        assert!(failure.critical[0].contains("Double type definition"));
    }

    #[test]
    fn should_warn_about_unknown_type() {
        let result = parse_wml(r#"<UI.Base:Control><ws:when type="date">today</ws:when></UI.Base:Control>"#);
        assert!(!result.failed);
        assert!(warnings(&result)[0].contains("date"));
        assert_eq!(
            humanize(&result.nodes),
            rows(&[
                &["Component", "UI.Base:Control"],
                &["ContentOption", "when"],
                &["Text", "today"],
            ])
        );
    }

    #[test]
    fn should_forbid_mixing_data_types_with_content() {
        let source = "<UI.Base:Control><ws:x><ws:Number>1</ws:Number><div/></ws:x></UI.Base:Control>";
        let result = parse_wml(source);
        assert!(result.failed);
        assert_eq!(
            messages_at_least(&result, DiagnosticLevel::Fatal),
            vec!["Forbidden to mix data types with content".to_string()]
        );
    }
}
