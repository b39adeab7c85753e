//! Services supplied by the host application.
//!
//! The pipeline never talks to storage, routing or the token engine directly.
//! It goes through the traits in this module, which keeps every render a pure
//! function of its inputs:
//!
//! - [`TokenReplacer`] - substitutes `[type:field]` placeholders
//! - [`EntityStorage`] - loads an [`Entity`] by type and identifier
//! - [`RequestContext`] - the current path, its route parameters and the
//!   entities the route resolved
//! - [`FieldMapProvider`] - which entity types carry a given field type
//! - [`AdminContext`] and [`CurrentUser`] - request facts read by matchers
//!
//! [`memory`] provides simple in-process implementations used by the CLI and
//! the tests.

pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::SnippetError;

pub use memory::{InMemoryEntityStorage, PathRouter, RouteRequest, StaticFieldMap, StaticUser};

/// A content entity as seen by the token engine and override extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The items of a field: an array yields its elements, `null` or a missing
    /// field yields nothing, any other value is a single item.
    #[must_use]
    pub fn field_items(&self, name: &str) -> Vec<&Value> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(value) => vec![value],
        }
    }
}

/// Entities available to token substitution, keyed by token type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenData {
    entities: BTreeMap<String, Entity>,
}

impl TokenData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token_type: impl Into<String>, entity: Entity) {
        self.entities.insert(token_type.into(), entity);
    }

    #[must_use]
    pub fn get(&self, token_type: &str) -> Option<&Entity> {
        self.entities.get(token_type)
    }

    #[must_use]
    pub fn contains(&self, token_type: &str) -> bool {
        self.entities.contains_key(token_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(token_type, entity)| (token_type.as_str(), entity))
    }
}

/// Options passed to the token engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOptions {
    /// Remove placeholders that could not be resolved.
    pub clear: bool,
    /// Escape substituted values for markup.
    pub sanitize: bool,
}

impl TokenOptions {
    /// The options every snippet render uses.
    pub const RENDER: TokenOptions = TokenOptions {
        clear: true,
        sanitize: true,
    };
}

/// Substitutes bracketed placeholders against contextual entities.
pub trait TokenReplacer {
    fn replace(&self, text: &str, data: &TokenData, options: TokenOptions) -> String;
}

/// Loads entities by type and identifier.
pub trait EntityStorage {
    /// Whether this storage can load entities of `entity_type` at all.
    fn has_storage(&self, entity_type: &str) -> bool;

    /// Load an entity; `Ok(None)` when it does not exist.
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<Entity>, SnippetError>;
}

/// The request being rendered.
pub trait RequestContext {
    /// The current request path, e.g. `/node/1`.
    fn current_path(&self) -> String;

    /// Route parameters for `path`, e.g. `{"node": "1"}` for `/node/1`.
    fn route_parameters(&self, path: &str) -> BTreeMap<String, String>;

    /// The entity of type `entity_type` resolved by the current route, if any.
    fn route_entity(&self, entity_type: &str) -> Option<Entity>;
}

/// Entity types carrying a field type, in discovery order, each with the
/// names of its fields of that type.
pub type FieldMap = Vec<(String, Vec<String>)>;

/// Field introspection.
pub trait FieldMapProvider {
    fn field_map_for_field_type(&self, field_type: &str) -> FieldMap;
}

/// Whether the current route is administrative.
pub trait AdminContext {
    fn is_admin_route(&self) -> bool;
}

/// The roles of the user making the request.
pub trait CurrentUser {
    fn roles(&self) -> Vec<String>;
}
