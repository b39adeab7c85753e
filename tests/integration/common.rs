//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use analytics_snippet::config::AnalyticsSettings;
use analytics_snippet::formatter::{ANALYTICS_FIELD_TYPE, Host};
use analytics_snippet::host::{Entity, InMemoryEntityStorage, PathRouter, RouteRequest, StaticFieldMap, StaticUser};
use analytics_snippet::test_utils::init_test_logging;
use analytics_snippet::tokens::EntityTokenReplacer;
use analytics_snippet::variables::{Section, VariableSet};

/// The host services of a small site.
pub struct TestSite {
    pub storage: InMemoryEntityStorage,
    pub router: PathRouter,
    pub field_map: StaticFieldMap,
    pub replacer: EntityTokenReplacer,
}

impl TestSite {
    /// Node 1, taxonomy term 5 and user 2 on the standard routes.
    pub fn new() -> Self {
        init_test_logging(None);
        let storage = InMemoryEntityStorage::new()
            .with_entity(Entity::new("node", "1").with_field("title", "Fish & Chips"))
            .with_entity(Entity::new("taxonomy_term", "5").with_field("name", "Recipes"))
            .with_entity(Entity::new("user", "2").with_field("name", "alice"));

        Self {
            storage,
            router: PathRouter::standard(),
            field_map: StaticFieldMap::new(),
            replacer: EntityTokenReplacer::new(),
        }
    }

    /// Give nodes an analytics field called `field_analytics`.
    pub fn with_node_analytics_field(mut self) -> Self {
        self.field_map.add_field(ANALYTICS_FIELD_TYPE, "node", "field_analytics");
        self
    }

    pub fn request(&self, path: &str) -> RouteRequest<'_> {
        RouteRequest::new(path, &self.router, &self.storage)
    }

    pub fn host<'a>(&'a self, request: &'a RouteRequest<'a>) -> Host<'a> {
        Host::new(&self.replacer, &self.storage, request, &self.field_map)
    }
}

/// The variable set used throughout the examples.
pub fn example_set() -> VariableSet {
    let mut set = VariableSet::new("http://x/js", "H.20");
    set.set_code_snippet("foo=\"bar\";");
    set.insert(Section::Header, "boom", "pow");
    set.insert(Section::Variables, "slap", "twist");
    set.insert(Section::Footer, "smash", "crash");
    set
}

pub const EXAMPLE_OUTPUT: &str = "boom=\"pow\";\nfoo=\"bar\";\nslap=\"twist\";\nsmash=\"crash\";\n";

pub fn configured_settings() -> AnalyticsSettings {
    AnalyticsSettings {
        js_file_location: "http://x/js".to_string(),
        version: "H.20".to_string(),
        ..Default::default()
    }
}

pub fn user(roles: &[&str]) -> StaticUser {
    StaticUser::new(roles.iter().copied())
}
