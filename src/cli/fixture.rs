//! JSON fixtures describing the request being rendered.
//!
//! ```json
//! {
//!   "entities": [
//!     { "entity_type": "node", "id": "1", "fields": { "title": "Hello" } }
//!   ],
//!   "routes": ["/blog/{node}"],
//!   "admin_prefixes": ["/manage"],
//!   "field_map": [
//!     { "entity_type": "node", "fields": ["field_analytics"] }
//!   ],
//!   "token_context": { "node": "1" }
//! }
//! ```
//!
//! Routes and admin prefixes are added to the standard node, taxonomy term and
//! user routes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::SnippetError;
use crate::formatter::ANALYTICS_FIELD_TYPE;
use crate::host::{Entity, EntityStorage, InMemoryEntityStorage, PathRouter, StaticFieldMap};

/// Entity types carrying an analytics field, in lookup order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapEntry {
    pub entity_type: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub entities: Vec<Entity>,
    pub routes: Vec<String>,
    pub admin_prefixes: Vec<String>,
    pub field_map: Vec<FieldMapEntry>,
    /// Token type to entity id, resolved against `entities`.
    pub token_context: BTreeMap<String, String>,
}

impl Fixture {
    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse fixture file: {}", path.display()))
    }

    /// Parse fixture JSON.
    pub fn parse(content: &str) -> Result<Self, SnippetError> {
        serde_json::from_str(content).map_err(|e| SnippetError::InvalidFixture {
            reason: e.to_string(),
        })
    }

    #[must_use]
    pub fn storage(&self) -> InMemoryEntityStorage {
        let mut storage = InMemoryEntityStorage::new();
        for entity in &self.entities {
            storage.insert(entity.clone());
        }
        storage
    }

    /// The standard router extended with this fixture's routes and admin prefixes.
    pub fn router(&self) -> Result<PathRouter, SnippetError> {
        let mut router = PathRouter::standard();
        for route in &self.routes {
            router.add_route(route)?;
        }
        for prefix in &self.admin_prefixes {
            router.add_admin_prefix(prefix.clone());
        }
        Ok(router)
    }

    #[must_use]
    pub fn field_map(&self) -> StaticFieldMap {
        let mut map = StaticFieldMap::new();
        for entry in &self.field_map {
            for field in &entry.fields {
                map.add_field(ANALYTICS_FIELD_TYPE, &entry.entity_type, field);
            }
        }
        map
    }

    /// Look up every `token_context` entity in `storage`.
    pub fn token_context(&self, storage: &dyn EntityStorage) -> Result<Vec<(String, Entity)>, SnippetError> {
        self.token_context
            .iter()
            .map(|(token_type, id)| {
                let entity_type = crate::tokens::normalize_token_type(token_type);
                match storage.load(entity_type, id)? {
                    Some(entity) => Ok((token_type.clone(), entity)),
                    None => Err(SnippetError::InvalidFixture {
                        reason: format!("token context {token_type} refers to missing {entity_type} {id}"),
                    }),
                }
            })
            .collect()
    }
}
