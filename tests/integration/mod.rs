//! Integration test suite for analytics-snippet
//!
//! End-to-end checks of the rendering pipeline through the public API and the
//! binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **access**: matcher votes gating the payload
//! - **cli**: the `analytics-snippet` binary
//! - **factory**: settings loading and the missing-configuration warning
//! - **overrides**: entity-level inclusion flags and custom snippets
//! - **render**: section order, filtering and multi-value collapse
//! - **tokens**: token context from the path and from overrides

mod common;

mod cli;
mod factory;
mod overrides;
mod render;
mod tokens;
