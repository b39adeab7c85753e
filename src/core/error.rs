//! Error handling for the snippet pipeline
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`SnippetError`]) for the few conditions the
//!    pipeline treats as failures
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for the CLI
//!
//! Most problems in the pipeline are not errors. Missing configuration
//! degrades to [`Variables::Unconfigured`], an entity that cannot be
//! loaded simply contributes no token context, and unresolved placeholders are
//! cleared. What remains here are caller bugs and malformed input files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use analytics_snippet::core::{SnippetError, user_friendly_error};
//!
//! let error = SnippetError::InvalidSection {
//!     section: "sidebar".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```
//!
//! [`Variables::Unconfigured`]: crate::variables::Variables::Unconfigured

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for snippet operations
///
/// # Error Categories
///
/// ## Usage errors (caller bugs)
/// - [`InvalidSection`] - A variable was written to an undeclared section
/// - [`NotConfigured`] - Rendering was requested without required configuration
///
/// ## Input errors
/// - [`InvalidFixture`] - A host fixture file could not be understood
///
/// ## Collaborator errors
/// - [`EntityLoadFailed`] - An entity storage backend failed; the token resolver
///   never propagates this
///
/// [`InvalidSection`]: SnippetError::InvalidSection
/// [`NotConfigured`]: SnippetError::NotConfigured
/// [`InvalidFixture`]: SnippetError::InvalidFixture
/// [`EntityLoadFailed`]: SnippetError::EntityLoadFailed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnippetError {
    /// A variable section name outside of `header`, `variables` and `footer`
    #[error("{section} is not a valid section, expected one of: header, variables, footer")]
    InvalidSection {
        /// The rejected section name
        section: String,
    },

    /// Rendering requested on unconfigured variables
    ///
    /// The top-level render guards against this, so reaching it means a caller
    /// bypassed [`VariableFormatter::render_markup`].
    ///
    /// [`VariableFormatter::render_markup`]: crate::formatter::VariableFormatter::render_markup
    #[error("Analytics is not configured so variables can not be rendered")]
    NotConfigured,

    /// An entity could not be loaded from storage
    #[error("Failed to load {entity_type} '{id}': {reason}")]
    EntityLoadFailed {
        /// Entity type that was requested
        entity_type: String,
        /// Identifier that was requested
        id: String,
        /// Backend-specific failure description
        reason: String,
    },

    /// Host fixture could not be used
    #[error("Invalid fixture: {reason}")]
    InvalidFixture {
        /// Why the fixture was rejected
        reason: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion
///
/// # Examples
///
/// ```rust,no_run
/// use analytics_snippet::core::{ErrorContext, SnippetError};
///
/// let context = ErrorContext::new(SnippetError::NotConfigured)
///     .with_suggestion("Set js_file_location and version in the settings file")
///     .with_details("Both settings are required before any tracking code is emitted");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, or `None` for a bare message
    pub error: Option<SnippetError>,
    /// Primary message when no typed error is available
    pub message: Option<String>,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`SnippetError`]
    #[must_use]
    pub const fn new(error: SnippetError) -> Self {
        Self {
            error: Some(error),
            message: None,
            suggestion: None,
            details: None,
        }
    }

    /// Create an error context from a plain message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: Some(message.into()),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.headline());

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }

    fn headline(&self) -> String {
        match (&self.error, &self.message) {
            (Some(error), _) => error.to_string(),
            (None, Some(message)) => message.clone(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline())?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`SnippetError`], [`std::io::Error`], [`toml::de::Error`] and
/// [`serde_json::Error`] anywhere in the error chain; everything else keeps its
/// message and the chain of causes as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(snippet_error) = error.downcast_ref::<SnippetError>() {
        return create_error_context(snippet_error.clone());
    }

    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            let context = ErrorContext::message(error.to_string());
            return match io_error.kind() {
                std::io::ErrorKind::NotFound => context
                    .with_details(io_error.to_string())
                    .with_suggestion("Check that the file exists and the path is correct"),
                std::io::ErrorKind::PermissionDenied => context
                    .with_details(io_error.to_string())
                    .with_suggestion("Check the file permissions"),
                _ => context.with_details(io_error.to_string()),
            };
        }

        if let Some(toml_error) = cause.downcast_ref::<toml::de::Error>() {
            return ErrorContext::message(error.to_string())
                .with_details(toml_error.to_string())
                .with_suggestion(
                    "Check the TOML syntax of the settings file. Verify quotes, brackets, and key names",
                );
        }

        if let Some(json_error) = cause.downcast_ref::<serde_json::Error>() {
            return ErrorContext::message(error.to_string())
                .with_details(json_error.to_string())
                .with_suggestion("Check that the fixture is valid JSON");
        }
    }

    let details = error
        .chain()
        .skip(1)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let context = ErrorContext::message(error.to_string());
    if details.is_empty() {
        context
    } else {
        context.with_details(details)
    }
}

fn create_error_context(error: SnippetError) -> ErrorContext {
    match &error {
        SnippetError::InvalidSection {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use one of the sections: header, variables, footer"),
        SnippetError::NotConfigured => ErrorContext::new(error)
            .with_suggestion("Set both js_file_location and version in the settings file")
            .with_details("Tracking code is only emitted once both required settings are present"),
        SnippetError::InvalidFixture {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(
                "Check the fixture keys, that route patterns start with '/' and that token_context ids exist",
            ),
        SnippetError::EntityLoadFailed {
            ..
        } => ErrorContext::new(error),
    }
}
