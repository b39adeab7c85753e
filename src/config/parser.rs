//! Generic configuration parsing utilities.
//!
//! Reads a TOML file and deserializes it into any `DeserializeOwned` type,
//! attaching the file path to read and parse failures.
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /path/to/settings.toml
//! Caused by:
//!     invalid type: integer `3`, expected a string
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use analytics_snippet::config::{AnalyticsSettings, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let settings: AnalyticsSettings = parse_config(Path::new("settings.toml"))?;
/// println!("Tracking script: {}", settings.js_file_location);
/// # Ok(())
/// # }
/// ```
///
/// # Error Messages
///
/// 1. **File Operation Context**: "Failed to read config file: /path/to/file.toml"
/// 2. **Parsing Context**: "Failed to parse config file: /path/to/file.toml"
///
/// The underlying error (file system or TOML parsing) is preserved as the cause.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
