//! Loading variables from settings, providers and settings files.

use analytics_snippet::access::AccessVote;
use analytics_snippet::config::{AnalyticsSettings, ExtraVariable, parse_config};
use analytics_snippet::core::SnippetError;
use analytics_snippet::formatter::VariableFormatter;
use analytics_snippet::test_utils::capture_logs;
use analytics_snippet::variables::{Section, SectionContributions, VariableMap, Variables, VariablesFactory};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::Level;

use crate::common::{TestSite, configured_settings};

const MISSING_CONFIG_WARNING: &str = "missing required configuration settings (js_file_location, version)";

#[test]
fn test_unconfigured_warns_once_across_renders() {
    let settings = AnalyticsSettings {
        version: "H.20".to_string(),
        codesnippet: "s.t();".to_string(),
        ..Default::default()
    };

    let (payloads, logs) = capture_logs(Level::WARN, || {
        let variables = VariablesFactory::new(settings).load().unwrap();
        let site = TestSite::new();
        let request = site.request("/");
        let mut formatter = VariableFormatter::new(variables, site.host(&request));
        formatter.add_tracking_matcher(AccessVote::Allowed);
        (0..5).map(|_| formatter.render_markup()).collect::<Vec<_>>()
    });

    assert!(payloads.iter().all(Option::is_none));
    assert_eq!(logs.count(MISSING_CONFIG_WARNING), 1);
}

#[test]
fn test_configured_load_is_silent() {
    let (variables, logs) = capture_logs(Level::WARN, || VariablesFactory::new(configured_settings()).load());
    assert!(variables.unwrap().is_configured());
    assert_eq!(logs.count(MISSING_CONFIG_WARNING), 0);
}

#[test]
fn test_render_of_unconfigured_is_an_error() {
    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(Variables::Unconfigured, site.host(&request));
    assert_eq!(formatter.render(), Err(SnippetError::NotConfigured));
}

#[test]
fn test_providers_and_extra_variables() {
    let mut settings = configured_settings();
    settings.codesnippet = "main();".to_string();
    settings.extra_variables = vec![
        ExtraVariable {
            name: "s.channel".to_string(),
            value: "configured".to_string(),
        },
        ExtraVariable {
            name: "s.server".to_string(),
            value: "web1".to_string(),
        },
    ];

    let factory = VariablesFactory::new(settings)
        .with_provider(|| {
            let mut sections = SectionContributions::new();
            sections.insert("header".to_string(), [("s.account", "first")].into_iter().collect::<VariableMap>());
            sections.insert("variables".to_string(), [("s.channel", "module")].into_iter().collect::<VariableMap>());
            sections
        })
        .with_provider(|| {
            let mut sections = SectionContributions::new();
            sections.insert("header".to_string(), [("s.account", "second")].into_iter().collect::<VariableMap>());
            sections
        });

    let variables = factory.load().unwrap();
    let set = variables.as_set().unwrap();
    assert_eq!(set.section(Section::Header).unwrap().get("s.account").unwrap().collapse(), "second");

    let site = TestSite::new();
    let request = site.request("/");
    let formatter = VariableFormatter::new(variables.clone(), site.host(&request));
    assert_eq!(
        formatter.render_markup().unwrap().formatted_vars,
        "s.account=\"second\";\nmain();\ns.channel=\"configured\";\ns.server=\"web1\";\n"
    );
}

#[test]
fn test_provider_with_unknown_section_fails() {
    let factory = VariablesFactory::new(configured_settings()).with_provider(|| {
        let mut sections = SectionContributions::new();
        sections.insert("sidebar".to_string(), VariableMap::new());
        sections
    });

    assert!(matches!(factory.load(), Err(SnippetError::InvalidSection { section }) if section == "sidebar"));
}

#[test]
fn test_settings_file_round_trip_into_markup() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
js_file_location = "http://x/js"
version = "H.20"
image_file_location = "http://x/img"
codesnippet = 's.prop1="[node:title]";'

[[extra_variables]]
name = "s.pageName"
value = "[node:title]"
"#
    )
    .unwrap();

    let settings: AnalyticsSettings = parse_config(file.path()).unwrap();
    let variables = VariablesFactory::new(settings).load().unwrap();

    let site = TestSite::new();
    let request = site.request("/node/1");
    let formatter = VariableFormatter::new(variables, site.host(&request));
    let markup = formatter.render_markup().unwrap();

    assert_eq!(markup.image_location, "http://x/img");
    assert_eq!(markup.formatted_vars, "s.prop1=\"Fish &amp; Chips\";\ns.pageName=\"Fish &amp; Chips\";\n");
}
