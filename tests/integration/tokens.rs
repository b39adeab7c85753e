//! Token context from the current path and from explicit overrides.

use analytics_snippet::formatter::VariableFormatter;
use analytics_snippet::host::{Entity, TokenData};
use analytics_snippet::tokens::TokenResolver;
use analytics_snippet::variables::{Section, VariableSet, Variables};

use crate::common::TestSite;

fn set_with(name: &str, value: &str) -> VariableSet {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.insert(Section::Variables, name, value);
    set
}

#[test]
fn test_context_loaded_from_path_and_sanitized() {
    let site = TestSite::new();
    let request = site.request("/node/1");
    let formatter = VariableFormatter::new(Variables::Configured(set_with("s.pageName", "[node:title]")), site.host(&request));

    assert_eq!(formatter.render_markup().unwrap().formatted_vars, "\ns.pageName=\"Fish &amp; Chips\";\n");
}

#[test]
fn test_term_tokens_use_taxonomy_term_route() {
    let site = TestSite::new();
    let request = site.request("/taxonomy/term/5");
    let formatter =
        VariableFormatter::new(Variables::Configured(set_with("s.channel", "[term:name]")), site.host(&request));

    assert_eq!(formatter.render_markup().unwrap().formatted_vars, "\ns.channel=\"Recipes\";\n");
}

#[test]
fn test_override_context_wins_over_path() {
    let site = TestSite::new();
    let request = site.request("/node/1");
    let mut formatter =
        VariableFormatter::new(Variables::Configured(set_with("s.pageName", "[node:title]")), site.host(&request));
    formatter.add_token_context(Entity::new("node", "77").with_field("title", "Preview"), "node");

    assert_eq!(formatter.render_markup().unwrap().formatted_vars, "\ns.pageName=\"Preview\";\n");
}

#[test]
fn test_missing_entities_clear_tokens() {
    let site = TestSite::new();
    let request = site.request("/node/404");
    let mut set = set_with("s.pageName", "[node:title]");
    set.set_code_snippet("s.prop2=\"[node:title]\";");
    let formatter = VariableFormatter::new(Variables::Configured(set), site.host(&request));

    assert_eq!(formatter.render_markup().unwrap().formatted_vars, "s.prop2=\"\";\n");
}

#[test]
fn test_resolver_leaves_caller_overrides_untouched() {
    let site = TestSite::new();
    let request = site.request("/user/2");
    let resolver = TokenResolver::new(&site.replacer, &site.storage, &request);

    let overrides = TokenData::new();
    assert_eq!(resolver.resolve("by [user:name]", &overrides), "by alice");
    assert!(overrides.is_empty());
}
