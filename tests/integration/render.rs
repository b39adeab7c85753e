//! Rendering and composition through `VariableFormatter`.

use analytics_snippet::access::AccessVote;
use analytics_snippet::formatter::VariableFormatter;
use analytics_snippet::variables::{Section, VariableSet, VariableValue, Variables};

use crate::common::{EXAMPLE_OUTPUT, TestSite, example_set};

#[test]
fn test_example_markup() {
    let site = TestSite::new();
    let request = site.request("/");
    let mut formatter = VariableFormatter::new(Variables::Configured(example_set()), site.host(&request));
    formatter.add_tracking_matcher(AccessVote::Allowed);

    let markup = formatter.render_markup().expect("tracking should render");
    assert_eq!(markup.formatted_vars, EXAMPLE_OUTPUT);
    assert_eq!(markup.js_file_location, "http://x/js");
    assert_eq!(markup.version, "H.20");

    let json = serde_json::to_value(&markup).unwrap();
    assert_eq!(json["theme"], "analytics_code");
    assert_eq!(json["formatted_vars"], EXAMPLE_OUTPUT);
}

#[test]
fn test_section_order_independent_of_insertion_order() {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.set_code_snippet("main();");
    set.set_variable("footer", "f1", "1").unwrap();
    set.set_variable("footer", "f2", "2").unwrap();
    set.set_variable("variables", "v1", "3").unwrap();
    set.set_variable("header", "h1", "4").unwrap();

    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    assert_eq!(
        formatter.render_markup().unwrap().formatted_vars,
        "h1=\"4\";\nmain();\nv1=\"3\";\nf1=\"1\";\nf2=\"2\";\n"
    );
}

#[test]
fn test_trim_based_filtering() {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.insert(Section::Variables, "zero", "0");
    set.insert(Section::Variables, "spaced_zero", "  0  ");
    set.insert(Section::Variables, "empty", "");
    set.insert(Section::Variables, "whitespace", " \n\t ");
    set.insert(Section::Variables, "cleared", "[user:name]");

    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    let rendered = formatter.render().unwrap();
    let names: Vec<&str> = rendered.section(Section::Variables).unwrap().iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zero", "spaced_zero"]);
}

#[test]
fn test_multi_value_uses_last_candidate() {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.insert(Section::Header, "s_prop1", VariableValue::from(vec!["a", "b", "c"]));

    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    let output = formatter.render_markup().unwrap().formatted_vars;
    assert_eq!(output, "s_prop1=\"c\";\n\n");
    assert!(!output.contains("\"a\"") && !output.contains("\"b\""));
}

#[test]
fn test_render_does_not_mutate_source() {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.insert(Section::Variables, "title", "[node:title]");
    set.insert(Section::Variables, "blank", "");
    let original = set.clone();

    let site = TestSite::new();
    let request = site.request("/node/1");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    let rendered = formatter.render().unwrap();
    assert_eq!(formatter.variables(), &Variables::Configured(original));
    assert_eq!(
        rendered.section(Section::Variables).unwrap().get("title"),
        Some(&VariableValue::from("Fish &amp; Chips"))
    );
}

#[test]
fn test_variable_names_are_escaped() {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.insert(Section::Footer, "s.list<1>", "a&b");

    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    assert_eq!(formatter.render_markup().unwrap().formatted_vars, "\ns.list&lt;1&gt;=\"a&b\";\n");
}
