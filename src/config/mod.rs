//! Configuration loading.
//!
//! - [`AnalyticsSettings`] - The persisted settings (script location, version,
//!   snippets, extra variables and role tracking policy)
//! - [`parse_config`] - Generic TOML loading with file path context

mod parser;
mod settings;

pub use parser::parse_config;
pub use settings::{AnalyticsSettings, ExtraVariable, RoleTrackingType};
