//! Token context resolution.
//!
//! Variable values and snippets may contain placeholders such as
//! `[node:title]`. Before handing the text to the host's [`TokenReplacer`], the
//! [`TokenResolver`] works out which entity the first placeholder refers to and,
//! when the caller has not supplied one, loads it from the current route:
//!
//! 1. Extract the entity type from the first `[type:field]` placeholder.
//! 2. Rewrite the `term` alias to `taxonomy_term`.
//! 3. If no override exists for that type, parse the current path into route
//!    parameters and load the matching entity.
//! 4. Substitute with `clear` and `sanitize` enabled.
//!
//! A failed load is never an error; the text is substituted with whatever
//! context exists and unresolved placeholders are cleared.

mod replacer;

pub use replacer::EntityTokenReplacer;

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::host::{Entity, EntityStorage, RequestContext, TokenData, TokenOptions, TokenReplacer};

/// Matches `[type:field]`; only the first match decides the context type.
static TOKEN_TYPE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\s\[\]:]*):([^\s\[\]]*)\]").ok());

/// Token vocabulary name for taxonomy terms, which are stored as `taxonomy_term`.
const TERM_ALIAS: &str = "term";
const TERM_ENTITY_TYPE: &str = "taxonomy_term";

/// Map a placeholder type name to the entity type it refers to.
#[must_use]
pub fn normalize_token_type(token_type: &str) -> &str {
    if token_type == TERM_ALIAS {
        TERM_ENTITY_TYPE
    } else {
        token_type
    }
}

/// The entity type referenced by the first placeholder in `text`, if any.
///
/// ```rust
/// use analytics_snippet::tokens::token_entity_type;
///
/// assert_eq!(token_entity_type("[node:title] by [user:name]").as_deref(), Some("node"));
/// assert_eq!(token_entity_type("[term:name]").as_deref(), Some("taxonomy_term"));
/// assert_eq!(token_entity_type("no tokens"), None);
/// ```
#[must_use]
pub fn token_entity_type(text: &str) -> Option<String> {
    let pattern = TOKEN_TYPE_PATTERN.as_ref()?;
    let captures = pattern.captures(text)?;
    let token_type = captures.get(1)?.as_str();
    if token_type.is_empty() {
        return None;
    }
    Some(normalize_token_type(token_type).to_string())
}

/// Escape `&`, `<` and `>`, leaving quote characters untouched.
#[must_use]
pub fn escape_html_no_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for inclusion in markup, quotes included.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolves token context and delegates substitution to the host.
#[derive(Clone, Copy)]
pub struct TokenResolver<'a> {
    replacer: &'a dyn TokenReplacer,
    storage: &'a dyn EntityStorage,
    request: &'a dyn RequestContext,
}

impl<'a> TokenResolver<'a> {
    pub fn new(
        replacer: &'a dyn TokenReplacer,
        storage: &'a dyn EntityStorage,
        request: &'a dyn RequestContext,
    ) -> Self {
        Self {
            replacer,
            storage,
            request,
        }
    }

    /// Substitute the placeholders in `text`.
    ///
    /// `overrides` takes precedence over entities derived from the path and is
    /// never modified; a path entity is added to a local copy only.
    #[must_use]
    pub fn resolve(&self, text: &str, overrides: &TokenData) -> String {
        let mut data = Cow::Borrowed(overrides);

        if let Some(entity_type) = token_entity_type(text) {
            if !overrides.contains(&entity_type) {
                if let Some(entity) = self.entity_from_path(&entity_type) {
                    data.to_mut().insert(entity_type, entity);
                }
            }
        }

        self.replacer.replace(text, &data, TokenOptions::RENDER)
    }

    fn entity_from_path(&self, entity_type: &str) -> Option<Entity> {
        let path = self.request.current_path();
        let params = self.request.route_parameters(&path);

        let id = params.get(entity_type).filter(|id| !id.is_empty())?;
        if !self.storage.has_storage(entity_type) {
            tracing::debug!(entity_type, "No storage for token entity type");
            return None;
        }

        match self.storage.load(entity_type, id) {
            Ok(Some(entity)) => {
                tracing::debug!(entity_type, id = id.as_str(), path = path.as_str(), "Token context loaded from path");
                Some(entity)
            }
            Ok(None) => {
                tracing::debug!(entity_type, id = id.as_str(), "Token context entity not found");
                None
            }
            Err(e) => {
                tracing::debug!(entity_type, id = id.as_str(), error = %e, "Token context entity failed to load");
                None
            }
        }
    }
}
