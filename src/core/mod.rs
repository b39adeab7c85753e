//! Core types shared across the snippet pipeline
//!
//! ## `error` - Error Handling
//!
//! - [`SnippetError`] - Enumerated error types for the pipeline's failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format

pub mod error;

pub use error::{ErrorContext, SnippetError, user_friendly_error};
