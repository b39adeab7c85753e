//! In-process implementations of the host services.

use std::collections::BTreeMap;

use crate::core::SnippetError;

use super::{AdminContext, CurrentUser, Entity, EntityStorage, FieldMap, FieldMapProvider, RequestContext};

/// Entities held in memory, keyed by type then identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStorage {
    entities: BTreeMap<String, BTreeMap<String, Entity>>,
}

impl InMemoryEntityStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.insert(entity);
        self
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.entry(entity.entity_type.clone()).or_default().insert(entity.id.clone(), entity);
    }
}

impl EntityStorage for InMemoryEntityStorage {
    fn has_storage(&self, entity_type: &str) -> bool {
        self.entities.contains_key(entity_type)
    }

    fn load(&self, entity_type: &str, id: &str) -> Result<Option<Entity>, SnippetError> {
        Ok(self.entities.get(entity_type).and_then(|by_id| by_id.get(id)).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

/// Maps request paths to route parameters using `/literal/{parameter}` patterns.
///
/// ```rust
/// use analytics_snippet::host::PathRouter;
///
/// let router = PathRouter::standard();
/// let params = router.route_parameters("/taxonomy/term/5?page=2");
/// assert_eq!(params.get("taxonomy_term").map(String::as_str), Some("5"));
/// assert!(router.is_admin_path("/admin/config"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathRouter {
    routes: Vec<Vec<Segment>>,
    admin_prefixes: Vec<String>,
}

impl PathRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node, taxonomy term and user routes with `/admin` as the admin prefix.
    #[must_use]
    pub fn standard() -> Self {
        let mut router = Self::new();
        for pattern in ["/node/{node}", "/taxonomy/term/{taxonomy_term}", "/user/{user}"] {
            router.routes.push(parse_pattern(pattern));
        }
        router.admin_prefixes.push("/admin".to_string());
        router
    }

    /// Add a route pattern such as `/node/{node}`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::InvalidFixture`] for a pattern that does not start
    /// with `/` or has an unnamed `{}` parameter.
    pub fn add_route(&mut self, pattern: &str) -> Result<(), SnippetError> {
        if !pattern.starts_with('/') {
            return Err(SnippetError::InvalidFixture {
                reason: format!("route pattern '{pattern}' must start with '/'"),
            });
        }
        let segments = parse_pattern(pattern);
        if segments.iter().any(|segment| matches!(segment, Segment::Parameter(name) if name.is_empty())) {
            return Err(SnippetError::InvalidFixture {
                reason: format!("route pattern '{pattern}' has an unnamed parameter"),
            });
        }
        self.routes.push(segments);
        Ok(())
    }

    pub fn add_admin_prefix(&mut self, prefix: impl Into<String>) {
        self.admin_prefixes.push(prefix.into());
    }

    /// Parameters of the first route matching `path`; empty when none match.
    #[must_use]
    pub fn route_parameters(&self, path: &str) -> BTreeMap<String, String> {
        let parts = path_segments(path);
        self.routes.iter().find_map(|route| match_route(route, &parts)).unwrap_or_default()
    }

    #[must_use]
    pub fn is_admin_path(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.admin_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    path_segments(pattern)
        .into_iter()
        .map(|part| match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            Some(name) => Segment::Parameter(name.to_string()),
            None => Segment::Literal(part.to_string()),
        })
        .collect()
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn path_segments(path: &str) -> Vec<&str> {
    strip_query(path).split('/').filter(|part| !part.is_empty()).collect()
}

fn match_route(route: &[Segment], parts: &[&str]) -> Option<BTreeMap<String, String>> {
    if route.len() != parts.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (segment, part) in route.iter().zip(parts) {
        match segment {
            Segment::Literal(literal) if literal == part => {}
            Segment::Literal(_) => return None,
            Segment::Parameter(name) => {
                params.insert(name.clone(), (*part).to_string());
            }
        }
    }
    Some(params)
}

/// The current request: a path resolved through a [`PathRouter`] against an
/// [`EntityStorage`].
pub struct RouteRequest<'a> {
    path: String,
    router: &'a PathRouter,
    storage: &'a dyn EntityStorage,
}

impl<'a> RouteRequest<'a> {
    pub fn new(path: impl Into<String>, router: &'a PathRouter, storage: &'a dyn EntityStorage) -> Self {
        Self {
            path: path.into(),
            router,
            storage,
        }
    }
}

impl RequestContext for RouteRequest<'_> {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn route_parameters(&self, path: &str) -> BTreeMap<String, String> {
        self.router.route_parameters(path)
    }

    fn route_entity(&self, entity_type: &str) -> Option<Entity> {
        let params = self.router.route_parameters(&self.path);
        let id = params.get(entity_type)?;
        match self.storage.load(entity_type, id) {
            Ok(entity) => entity,
            Err(e) => {
                tracing::debug!(entity_type, id = id.as_str(), error = %e, "Route entity could not be loaded");
                None
            }
        }
    }
}

impl AdminContext for RouteRequest<'_> {
    fn is_admin_route(&self) -> bool {
        self.router.is_admin_path(&self.path)
    }
}

/// A fixed field map keyed by field type.
#[derive(Debug, Clone, Default)]
pub struct StaticFieldMap {
    by_field_type: BTreeMap<String, FieldMap>,
}

impl StaticFieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `entity_type` has a field `field_name` of `field_type`.
    #[must_use]
    pub fn with_field(mut self, field_type: &str, entity_type: &str, field_name: &str) -> Self {
        self.add_field(field_type, entity_type, field_name);
        self
    }

    pub fn add_field(&mut self, field_type: &str, entity_type: &str, field_name: &str) {
        let map = self.by_field_type.entry(field_type.to_string()).or_default();
        match map.iter_mut().find(|(existing, _)| existing == entity_type) {
            Some((_, fields)) => fields.push(field_name.to_string()),
            None => map.push((entity_type.to_string(), vec![field_name.to_string()])),
        }
    }
}

impl FieldMapProvider for StaticFieldMap {
    fn field_map_for_field_type(&self, field_type: &str) -> FieldMap {
        self.by_field_type.get(field_type).cloned().unwrap_or_default()
    }
}

/// A user with a fixed set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticUser {
    roles: Vec<String>,
}

impl StaticUser {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl CurrentUser for StaticUser {
    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}
