//! Tracking variables and their configuration.
//!
//! A [`VariableSet`] holds the static facts of a tracking snippet (script URL,
//! script version, optional code snippet and no-script image URL) together with
//! three fixed sections of variables. Sections are emitted in declaration order:
//! [`Section::Header`], [`Section::Variables`], [`Section::Footer`].
//!
//! [`Variables`] wraps a set in a tagged variant so that missing configuration is
//! a match arm rather than a sentinel object:
//!
//! ```rust
//! use analytics_snippet::variables::{Section, VariableSet, Variables};
//!
//! let mut set = VariableSet::new("https://www.example.com/js", "H.20");
//! set.insert(Section::Header, "s_account", "account");
//!
//! let variables = Variables::Configured(set);
//! assert_eq!(variables.js_file_location(), "https://www.example.com/js");
//! assert_eq!(Variables::Unconfigured.js_file_location(), "");
//! ```

mod factory;

pub use factory::{SectionContributions, VariableProvider, VariablesFactory};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::SnippetError;

/// One of the three fixed variable sections, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Header,
    Variables,
    Footer,
}

impl Section {
    /// All valid sections in emission order.
    pub const ALL: [Section; 3] = [Section::Header, Section::Variables, Section::Footer];

    /// The section's configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Variables => "variables",
            Section::Footer => "footer",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = SnippetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL.into_iter().find(|section| section.as_str() == s).ok_or_else(|| {
            SnippetError::InvalidSection {
                section: s.to_string(),
            }
        })
    }
}

/// The value of a single variable.
///
/// Multi-valued entries appear when more than one contributor sets the same
/// variable; rendering keeps only the last candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    Multiple(Vec<String>),
}

impl VariableValue {
    /// The value used for rendering: the string itself, or the last candidate.
    #[must_use]
    pub fn collapse(&self) -> &str {
        match self {
            VariableValue::Single(value) => value,
            VariableValue::Multiple(values) => values.last().map_or("", String::as_str),
        }
    }

    /// Combine two contributions to the same variable, keeping both in order.
    #[must_use]
    pub fn merge(self, other: VariableValue) -> VariableValue {
        let mut values = self.into_candidates();
        values.extend(other.into_candidates());
        VariableValue::Multiple(values)
    }

    fn into_candidates(self) -> Vec<String> {
        match self {
            VariableValue::Single(value) => vec![value],
            VariableValue::Multiple(values) => values,
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Single(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        VariableValue::Multiple(values)
    }
}

impl From<Vec<&str>> for VariableValue {
    fn from(values: Vec<&str>) -> Self {
        VariableValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Insertion-ordered variables of one section.
///
/// Overwriting a name keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
    entries: Vec<(String, VariableValue)>,
}

impl VariableMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.entries.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the variables for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &VariableValue) -> bool) {
        self.entries.retain(|(name, value)| keep(name, value));
    }

    /// Merge another contribution into this one.
    ///
    /// New names are appended; a name present in both becomes a multi-valued
    /// entry holding this map's value(s) followed by the other's.
    pub fn merge_recursive(&mut self, other: VariableMap) {
        for (name, value) in other.entries {
            match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, slot)) => {
                    let current = std::mem::replace(slot, VariableValue::Multiple(Vec::new()));
                    *slot = current.merge(value);
                }
                None => self.entries.push((name, value)),
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for VariableMap
where
    K: Into<String>,
    V: Into<VariableValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = VariableMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl IntoIterator for VariableMap {
    type Item = (String, VariableValue);
    type IntoIter = std::vec::IntoIter<(String, VariableValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A configured set of tracking variables.
///
/// Built once per request; rendering produces a new set and never mutates the
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSet {
    js_file_location: String,
    version: String,
    code_snippet: String,
    image_file_location: String,
    sections: BTreeMap<Section, VariableMap>,
}

impl VariableSet {
    /// Create a set with the two required settings.
    pub fn new(js_file_location: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            js_file_location: js_file_location.into(),
            version: version.into(),
            code_snippet: String::new(),
            image_file_location: String::new(),
            sections: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn js_file_location(&self) -> &str {
        &self.js_file_location
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn code_snippet(&self) -> &str {
        &self.code_snippet
    }

    pub fn set_code_snippet(&mut self, code_snippet: impl Into<String>) {
        self.code_snippet = code_snippet.into();
    }

    #[must_use]
    pub fn image_file_location(&self) -> &str {
        &self.image_file_location
    }

    /// Set the URL of the no-JavaScript image tracker.
    pub fn set_no_js(&mut self, image_file_location: impl Into<String>) {
        self.image_file_location = image_file_location.into();
    }

    /// Set a single variable in a typed section.
    pub fn insert(&mut self, section: Section, name: impl Into<String>, value: impl Into<VariableValue>) {
        self.sections.entry(section).or_default().insert(name, value);
    }

    /// Set a single variable by section name.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::InvalidSection`] when `section` is not one of
    /// `header`, `variables` or `footer`.
    pub fn set_variable(
        &mut self,
        section: &str,
        name: impl Into<String>,
        value: impl Into<VariableValue>,
    ) -> Result<(), SnippetError> {
        let section = section.parse::<Section>()?;
        self.insert(section, name, value);
        Ok(())
    }

    /// Replace a whole section by name.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::InvalidSection`] for an undeclared section name.
    pub fn set_section(&mut self, section: &str, variables: VariableMap) -> Result<(), SnippetError> {
        let section = section.parse::<Section>()?;
        self.sections.insert(section, VariableMap::new());
        for (name, value) in variables {
            self.insert(section, name, value);
        }
        Ok(())
    }

    /// Replace every section named in `sections`.
    ///
    /// Sections are validated one at a time; sections written before an
    /// invalid name keep their new values.
    pub fn set_all_sections<I, S>(&mut self, sections: I) -> Result<(), SnippetError>
    where
        I: IntoIterator<Item = (S, VariableMap)>,
        S: AsRef<str>,
    {
        for (section, variables) in sections {
            self.set_section(section.as_ref(), variables)?;
        }
        Ok(())
    }

    /// Variables of one section, if the section has been set.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&VariableMap> {
        self.sections.get(&section)
    }

    /// All sections that have been set, in emission order.
    #[must_use]
    pub fn sections(&self) -> &BTreeMap<Section, VariableMap> {
        &self.sections
    }

    /// A copy of this set's settings with `sections` written over its sections.
    #[must_use]
    pub fn with_sections(&self, sections: BTreeMap<Section, VariableMap>) -> VariableSet {
        let mut new = self.clone();
        new.sections.extend(sections);
        new
    }
}

/// Variables as loaded for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variables {
    /// Required settings are present.
    Configured(VariableSet),
    /// The script location or version is missing; nothing is rendered.
    Unconfigured,
}

impl Variables {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, Variables::Configured(_))
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&VariableSet> {
        match self {
            Variables::Configured(set) => Some(set),
            Variables::Unconfigured => None,
        }
    }

    #[must_use]
    pub fn js_file_location(&self) -> &str {
        self.as_set().map_or("", VariableSet::js_file_location)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        self.as_set().map_or("", VariableSet::version)
    }

    #[must_use]
    pub fn code_snippet(&self) -> &str {
        self.as_set().map_or("", VariableSet::code_snippet)
    }

    #[must_use]
    pub fn image_file_location(&self) -> &str {
        self.as_set().map_or("", VariableSet::image_file_location)
    }
}
