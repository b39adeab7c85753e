//! Entity-level overrides read from the viewed entity's analytics field.

use analytics_snippet::formatter::VariableFormatter;
use analytics_snippet::host::Entity;
use analytics_snippet::variables::Variables;
use serde_json::{Value, json};

use crate::common::{EXAMPLE_OUTPUT, TestSite, example_set};

fn render_node_page(field: Value) -> String {
    let mut site = TestSite::new().with_node_analytics_field();
    site.storage.insert(Entity::new("node", "3").with_field("title", "Launch").with_field("field_analytics", field));
    let request = site.request("/node/3");
    let formatter = VariableFormatter::new(Variables::Configured(example_set()), site.host(&request));
    formatter.render_markup().expect("tracking should render").formatted_vars
}

#[test]
fn test_main_snippet_suppressed() {
    let output = render_node_page(json!([{"include_main_codesnippet": false, "include_custom_variables": true, "codesnippet": ""}]));
    assert!(!output.contains("foo=\"bar\";"));
    assert_eq!(output, "boom=\"pow\";\nslap=\"twist\";\nsmash=\"crash\";\n");
}

#[test]
fn test_section_variables_suppressed_custom_snippet_kept() {
    let output = render_node_page(json!([{
        "include_main_codesnippet": "1",
        "include_custom_variables": "0",
        "codesnippet": "s.pageName=\"[node:title]\";"
    }]));
    assert_eq!(output, "foo=\"bar\";\ns.pageName=\"Launch\";\n");
}

#[test]
fn test_custom_snippet_appended_last() {
    let output = render_node_page(json!([{"include_main_codesnippet": 1, "include_custom_variables": 1, "codesnippet": "s.t();"}]));
    assert_eq!(output, format!("{EXAMPLE_OUTPUT}s.t();\n"));
}

#[test]
fn test_empty_field_keeps_defaults() {
    assert_eq!(render_node_page(json!([])), EXAMPLE_OUTPUT);
    assert_eq!(render_node_page(Value::Null), EXAMPLE_OUTPUT);
}

#[test]
fn test_pages_without_analytics_entity_use_defaults() {
    let site = TestSite::new().with_node_analytics_field();
    let request = site.request("/user/2");
    let formatter = VariableFormatter::new(Variables::Configured(example_set()), site.host(&request));
    assert_eq!(formatter.render_markup().unwrap().formatted_vars, EXAMPLE_OUTPUT);
}

#[test]
fn test_field_item_without_flags_keeps_only_custom_snippet() {
    assert_eq!(render_node_page(json!([{"codesnippet": "s.t();"}])), "s.t();\n");
}

#[test]
fn test_string_flags_follow_stored_text() {
    let output = render_node_page(json!([{"include_main_codesnippet": "false", "include_custom_variables": " 0"}]));
    assert_eq!(output, EXAMPLE_OUTPUT);
}
