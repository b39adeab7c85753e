//! Persisted analytics settings.
//!
//! The settings file is the only configuration the pipeline reads directly.
//! Every key is optional at the serde level so a partially filled file still
//! loads; the [`VariablesFactory`] decides whether the result is usable.
//!
//! ```toml
//! js_file_location = "https://www.example.com/js/s_code_remote_h.js"
//! version = "H.20.3."
//! image_file_location = "https://examplecom.112.2O7.net/b/ss/examplecom/1/H.20.3--NS/0"
//! codesnippet = 's.prop1="[node:title]";'
//! role_tracking_type = "exclusive"
//! track_roles = ["administrator"]
//!
//! [[extra_variables]]
//! name = "s.channel"
//! value = "news"
//! ```
//!
//! [`VariablesFactory`]: crate::variables::VariablesFactory

use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings for the analytics snippet, as stored by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// URL of the tracking JavaScript. Required for tracking.
    pub js_file_location: String,

    /// Version of the tracking JavaScript. Required for tracking.
    pub version: String,

    /// URL of the no-JavaScript tracking image.
    pub image_file_location: String,

    /// Raw code emitted between the header and main variable sections.
    pub codesnippet: String,

    /// Variables appended to the `variables` section after module contributions.
    pub extra_variables: Vec<ExtraVariable>,

    /// `inclusive`; any other value means `exclusive`.
    pub role_tracking_type: String,

    /// Role names compared with the current user's roles.
    ///
    /// Empty strings and `"0"` are unchecked entries and are ignored.
    pub track_roles: Vec<String>,
}

/// A `{name, value}` pair from the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraVariable {
    pub name: String,
    pub value: String,
}

impl AnalyticsSettings {
    /// Whether both required settings are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.js_file_location.is_empty() && !self.version.is_empty()
    }

    /// The configured role tracking policy.
    ///
    /// Only `inclusive` selects the inclusive policy. Unrecognised values are
    /// logged and treated as `exclusive`.
    #[must_use]
    pub fn role_tracking_type(&self) -> RoleTrackingType {
        match self.role_tracking_type.as_str() {
            "inclusive" => RoleTrackingType::Inclusive,
            "" | "exclusive" => RoleTrackingType::Exclusive,
            other => {
                tracing::warn!(
                    role_tracking_type = other,
                    "Unrecognised role_tracking_type, falling back to exclusive"
                );
                RoleTrackingType::Exclusive
            }
        }
    }

    /// Tracked roles with unchecked entries removed.
    #[must_use]
    pub fn tracked_roles(&self) -> Vec<String> {
        self.track_roles.iter().filter(|role| !role.is_empty() && role.as_str() != "0").cloned().collect()
    }
}

/// How the tracked role list is interpreted by the role matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleTrackingType {
    /// Only users holding a tracked role are meant to be tracked.
    Inclusive,
    /// Users holding a tracked role are excluded from tracking.
    #[default]
    Exclusive,
}

impl fmt::Display for RoleTrackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inclusive => write!(f, "inclusive"),
            Self::Exclusive => write!(f, "exclusive"),
        }
    }
}
