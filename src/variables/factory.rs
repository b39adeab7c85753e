//! Loading variables from settings and registered providers.
//!
//! The factory runs once per configuration load. It is the only place the
//! missing-configuration warning is emitted, so rendering the result any number
//! of times never logs it again.

use std::collections::BTreeMap;

use crate::config::AnalyticsSettings;
use crate::core::SnippetError;

use super::{Section, VariableMap, VariableSet, Variables};

/// Variables contributed by one provider, keyed by section name.
///
/// Section names are validated when the contributions are applied.
pub type SectionContributions = BTreeMap<String, VariableMap>;

/// A source of extra variables, such as an integration with another subsystem.
///
/// Closures returning [`SectionContributions`] implement this trait.
pub trait VariableProvider {
    fn variables(&self) -> SectionContributions;
}

impl<F> VariableProvider for F
where
    F: Fn() -> SectionContributions,
{
    fn variables(&self) -> SectionContributions {
        self()
    }
}

/// Builds [`Variables`] from [`AnalyticsSettings`] and registered providers.
///
/// # Examples
///
/// ```rust
/// use analytics_snippet::config::AnalyticsSettings;
/// use analytics_snippet::variables::{SectionContributions, VariableMap, VariablesFactory};
///
/// let settings = AnalyticsSettings {
///     js_file_location: "https://www.example.com/js".to_string(),
///     version: "H.20".to_string(),
///     ..Default::default()
/// };
///
/// let factory = VariablesFactory::new(settings).with_provider(|| {
///     let mut sections = SectionContributions::new();
///     sections.insert("header".to_string(), [("s_account", "acct")].into_iter().collect::<VariableMap>());
///     sections
/// });
///
/// let variables = factory.load().unwrap();
/// assert!(variables.is_configured());
/// ```
pub struct VariablesFactory {
    settings: AnalyticsSettings,
    providers: Vec<Box<dyn VariableProvider>>,
}

impl VariablesFactory {
    #[must_use]
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self {
            settings,
            providers: Vec::new(),
        }
    }

    /// Register a provider; providers are invoked in registration order.
    #[must_use]
    pub fn with_provider(mut self, provider: impl VariableProvider + 'static) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn add_provider(&mut self, provider: impl VariableProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    #[must_use]
    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Load the variables for the current configuration.
    ///
    /// Returns [`Variables::Unconfigured`] (after a single warning) when the
    /// script location or version is missing.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::InvalidSection`] when a provider contributes to
    /// a section other than `header`, `variables` or `footer`.
    pub fn load(&self) -> Result<Variables, SnippetError> {
        if !self.settings.is_configured() {
            tracing::warn!(
                target: "analytics_snippet::variables",
                "Analytics tracking is enabled but missing required configuration settings (js_file_location, version)."
            );
            return Ok(Variables::Unconfigured);
        }

        let mut variables =
            VariableSet::new(self.settings.js_file_location.as_str(), self.settings.version.as_str());

        if !self.settings.image_file_location.is_empty() {
            variables.set_no_js(self.settings.image_file_location.as_str());
        }

        if !self.settings.codesnippet.is_empty() {
            variables.set_code_snippet(self.settings.codesnippet.as_str());
        }

        variables.set_all_sections(self.collect_contributions())?;

        for extra in &self.settings.extra_variables {
            variables.insert(Section::Variables, extra.name.as_str(), extra.value.as_str());
        }

        tracing::debug!(
            providers = self.providers.len(),
            extra_variables = self.settings.extra_variables.len(),
            "Loaded analytics variables"
        );

        Ok(Variables::Configured(variables))
    }

    fn collect_contributions(&self) -> SectionContributions {
        let mut merged = SectionContributions::new();
        for provider in &self.providers {
            for (section, contributed) in provider.variables() {
                merged.entry(section).or_default().merge_recursive(contributed);
            }
        }
        merged
    }
}
