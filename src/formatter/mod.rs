//! The rendering pipeline.
//!
//! [`VariableFormatter`] ties the pieces together for one request:
//!
//! 1. Skip when the variables are [`Variables::Unconfigured`].
//! 2. Ask the [`AccessAggregator`]; a forbidden vote skips rendering.
//! 3. Extract the [`EntityOverride`] of the entity being viewed.
//! 4. Render every section through the [`VariableRenderer`].
//! 5. Join everything with the [`SnippetComposer`].
//!
//! ```rust
//! use analytics_snippet::access::AccessVote;
//! use analytics_snippet::formatter::{Host, VariableFormatter};
//! use analytics_snippet::host::{InMemoryEntityStorage, PathRouter, RouteRequest, StaticFieldMap};
//! use analytics_snippet::tokens::EntityTokenReplacer;
//! use analytics_snippet::variables::{Section, VariableSet, Variables};
//!
//! let storage = InMemoryEntityStorage::new();
//! let router = PathRouter::standard();
//! let request = RouteRequest::new("/", &router, &storage);
//! let field_map = StaticFieldMap::new();
//! let replacer = EntityTokenReplacer::new();
//! let host = Host::new(&replacer, &storage, &request, &field_map);
//!
//! let mut set = VariableSet::new("http://x/js", "H.20");
//! set.insert(Section::Header, "boom", "pow");
//!
//! let mut formatter = VariableFormatter::new(Variables::Configured(set), host);
//! formatter.add_tracking_matcher(AccessVote::Allowed);
//! let markup = formatter.render_markup().unwrap();
//! assert_eq!(markup.formatted_vars, "boom=\"pow\";\n\n");
//! ```

mod composer;
mod overrides;
mod renderer;

pub use composer::SnippetComposer;
pub use overrides::{ANALYTICS_FIELD_TYPE, EntityOverride, extract_entity_overrides};
pub use renderer::VariableRenderer;

use serde::Serialize;

use crate::access::{AccessAggregator, AccessVote, TrackingMatcher};
use crate::core::SnippetError;
use crate::host::{Entity, EntityStorage, FieldMapProvider, RequestContext, TokenData, TokenReplacer};
use crate::tokens::TokenResolver;
use crate::variables::{VariableSet, Variables};

/// Theme hook name of the rendered payload.
pub const TRACKING_THEME: &str = "analytics_code";

/// The host services a render reads from.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub token: &'a dyn TokenReplacer,
    pub storage: &'a dyn EntityStorage,
    pub request: &'a dyn RequestContext,
    pub field_map: &'a dyn FieldMapProvider,
}

impl<'a> Host<'a> {
    pub fn new(
        token: &'a dyn TokenReplacer,
        storage: &'a dyn EntityStorage,
        request: &'a dyn RequestContext,
        field_map: &'a dyn FieldMapProvider,
    ) -> Self {
        Self {
            token,
            storage,
            request,
            field_map,
        }
    }

    fn resolver(&self) -> TokenResolver<'a> {
        TokenResolver::new(self.token, self.storage, self.request)
    }
}

/// What the page layer receives when tracking is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingMarkup {
    pub theme: &'static str,
    pub js_file_location: String,
    pub version: String,
    pub image_location: String,
    pub formatted_vars: String,
}

/// Formats the variables of a single request.
///
/// Construct one per request; token context added with
/// [`add_token_context`](Self::add_token_context) lives as long as the
/// formatter.
pub struct VariableFormatter<'a> {
    variables: Variables,
    host: Host<'a>,
    access: AccessAggregator<'a>,
    token_overrides: TokenData,
}

impl<'a> VariableFormatter<'a> {
    pub fn new(variables: Variables, host: Host<'a>) -> Self {
        Self {
            variables,
            host,
            access: AccessAggregator::new(),
            token_overrides: TokenData::new(),
        }
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Resolve `token_type` placeholders against `entity` instead of the route.
    pub fn add_token_context(&mut self, entity: Entity, token_type: impl Into<String>) {
        self.token_overrides.insert(token_type, entity);
    }

    pub fn add_tracking_matcher(&mut self, matcher: impl TrackingMatcher + 'a) {
        self.access.add_matcher(matcher);
    }

    /// The combined vote of every registered matcher.
    #[must_use]
    pub fn access(&self) -> AccessVote {
        self.access.evaluate()
    }

    /// A copy of the variables with tokens replaced and names escaped.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::NotConfigured`] for unconfigured variables.
    pub fn render(&self) -> Result<VariableSet, SnippetError> {
        let set = self.configured_set()?;
        Ok(self.renderer().render(set))
    }

    /// The tracking payload, or `None` when tracking is unconfigured or forbidden.
    #[must_use]
    pub fn render_markup(&self) -> Option<TrackingMarkup> {
        let set = self.variables.as_set()?;

        let vote = self.access();
        if vote.is_forbidden() {
            tracing::debug!("Tracking skipped for this request");
            return None;
        }

        let entity_override = extract_entity_overrides(self.host.field_map, self.host.request);
        let rendered = self.renderer().render(set);
        let formatted_vars = self.composer().compose(&rendered, &entity_override);

        Some(TrackingMarkup {
            theme: TRACKING_THEME,
            js_file_location: set.js_file_location().to_string(),
            version: set.version().to_string(),
            image_location: set.image_file_location().to_string(),
            formatted_vars,
        })
    }

    fn configured_set(&self) -> Result<&VariableSet, SnippetError> {
        self.variables.as_set().ok_or(SnippetError::NotConfigured)
    }

    fn renderer(&self) -> VariableRenderer<'_> {
        VariableRenderer::new(self.host.resolver(), &self.token_overrides)
    }

    fn composer(&self) -> SnippetComposer<'_> {
        SnippetComposer::new(self.host.resolver(), &self.token_overrides)
    }
}
