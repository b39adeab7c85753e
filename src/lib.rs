//! analytics-snippet - per-page analytics tracking snippets
//!
//! Renders the tracking code a page emits by merging configured variables,
//! provider contributions and entity-level overrides, substituting `[type:field]`
//! placeholders against contextual entities, and gating the whole render behind
//! a vote-based access decision.
//!
//! # Architecture Overview
//!
//! One request flows through the crate like this:
//!
//! 1. [`variables::VariablesFactory`] turns [`config::AnalyticsSettings`] and any
//!    registered providers into [`variables::Variables`]. Missing required
//!    settings yield `Variables::Unconfigured` and a single warning.
//! 2. [`access::AccessAggregator`] folds the votes of every registered
//!    [`access::TrackingMatcher`]; a forbidden vote suppresses tracking.
//! 3. [`formatter::VariableFormatter`] renders each section through the
//!    [`tokens::TokenResolver`], applies the viewed entity's
//!    [`formatter::EntityOverride`] and composes the final text.
//!
//! Storage, routing, field introspection and token substitution are host
//! services behind the traits in [`host`], with in-memory implementations for
//! the CLI and tests.
//!
//! # Core Modules
//!
//! - [`access`] - Access votes, matchers and their aggregation
//! - [`cli`] - Command-line front-end
//! - [`config`] - Settings file parsing
//! - [`core`] - Error types and user-facing error formatting
//! - [`formatter`] - Rendering, composition and the top-level payload
//! - [`host`] - Host service traits and in-memory implementations
//! - [`tokens`] - Token context resolution and escaping
//! - [`variables`] - Variable sets, sections and the variables factory
//!
//! # Example
//!
//! ```rust
//! use analytics_snippet::access::AccessVote;
//! use analytics_snippet::config::AnalyticsSettings;
//! use analytics_snippet::formatter::{Host, VariableFormatter};
//! use analytics_snippet::host::{InMemoryEntityStorage, PathRouter, RouteRequest, StaticFieldMap};
//! use analytics_snippet::tokens::EntityTokenReplacer;
//! use analytics_snippet::variables::VariablesFactory;
//!
//! let settings = AnalyticsSettings {
//!     js_file_location: "http://x/js".to_string(),
//!     version: "H.20".to_string(),
//!     codesnippet: "s.t();".to_string(),
//!     ..Default::default()
//! };
//! let variables = VariablesFactory::new(settings).load().unwrap();
//!
//! let storage = InMemoryEntityStorage::new();
//! let router = PathRouter::standard();
//! let request = RouteRequest::new("/", &router, &storage);
//! let field_map = StaticFieldMap::new();
//! let replacer = EntityTokenReplacer::new();
//!
//! let mut formatter =
//!     VariableFormatter::new(variables, Host::new(&replacer, &storage, &request, &field_map));
//! formatter.add_tracking_matcher(AccessVote::Allowed);
//!
//! let markup = formatter.render_markup().unwrap();
//! assert_eq!(markup.formatted_vars, "s.t();\n");
//! ```

pub mod access;
pub mod cli;
pub mod config;
pub mod core;
pub mod formatter;
pub mod host;
pub mod tokens;
pub mod variables;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
