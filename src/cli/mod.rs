//! Command-line interface for rendering tracking snippets.
//!
//! The binary renders one request the same way a page would: it loads
//! [`AnalyticsSettings`] from TOML, builds the in-memory host from an optional
//! JSON [`Fixture`], registers the admin route and role matchers, and prints
//! the result.
//!
//! # Examples
//!
//! ```bash
//! # Print the formatted variables for the front page
//! analytics-snippet --settings analytics.toml
//!
//! # Render a node page for an editor, as JSON
//! analytics-snippet --settings analytics.toml --fixture site.json \
//!     --path /node/1 --role authenticated --role editor --format json
//!
//! # Show token resolution and matcher votes
//! analytics-snippet -v --settings analytics.toml --path /node/1
//! ```
//!
//! Nothing is printed when tracking is unconfigured or forbidden for the
//! request; the exit status is still zero.

mod fixture;

pub use fixture::{FieldMapEntry, Fixture};

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::access::{AdminRouteMatcher, RoleMatcher};
use crate::config::{AnalyticsSettings, parse_config};
use crate::formatter::{Host, TrackingMarkup, VariableFormatter};
use crate::host::{RouteRequest, StaticUser};
use crate::tokens::EntityTokenReplacer;
use crate::variables::VariablesFactory;

/// How the rendered payload is printed.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// The formatted variables block only.
    Text,
    /// The whole payload as JSON.
    Json,
}

/// Logging setup derived from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl CliConfig {
    /// Install a stderr subscriber. `RUST_LOG` takes precedence over the level.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "analytics-snippet",
    about = "Render an analytics tracking snippet for a request",
    version,
    long_about = "Renders the tracking payload for one request from a settings file and an optional JSON fixture describing entities, routes and field maps."
)]
pub struct Cli {
    /// Enable debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Path to the analytics settings (TOML).
    #[arg(short, long, value_name = "FILE")]
    settings: PathBuf,

    /// Path to a JSON fixture with entities, routes and field maps.
    #[arg(short, long, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Path of the request being rendered.
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Role of the current user; repeat for several roles.
    #[arg(short, long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Cli {
    /// Translate the verbosity flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
        }
    }

    /// Initialise logging, then render and print.
    pub fn execute(self) -> Result<()> {
        self.build_config().init_logging();
        let markup = self.render()?;

        let mut stdout = std::io::stdout().lock();
        if let Some(markup) = markup {
            match self.format {
                OutputFormat::Text => write!(stdout, "{}", markup.formatted_vars)?,
                OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string_pretty(&markup)?)?,
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Render the payload for the configured request without printing it.
    pub fn render(&self) -> Result<Option<TrackingMarkup>> {
        let settings: AnalyticsSettings = parse_config(&self.settings)?;
        let fixture = match &self.fixture {
            Some(path) => Fixture::load(path)?,
            None => Fixture::default(),
        };

        let storage = fixture.storage();
        let router = fixture.router()?;
        let field_map = fixture.field_map();
        let request = RouteRequest::new(self.path.clone(), &router, &storage);
        let user = StaticUser::new(self.roles.iter().cloned());
        let replacer = EntityTokenReplacer::new();

        let role_matcher = RoleMatcher::from_settings(&settings, &user);
        let variables = VariablesFactory::new(settings).load()?;

        let host = Host::new(&replacer, &storage, &request, &field_map);
        let mut formatter = VariableFormatter::new(variables, host);
        formatter.add_tracking_matcher(AdminRouteMatcher::new(&request));
        formatter.add_tracking_matcher(role_matcher);
        for (token_type, entity) in fixture.token_context(&storage)? {
            formatter.add_token_context(entity, token_type);
        }

        let markup = formatter.render_markup();
        if markup.is_none() {
            tracing::debug!(path = self.path.as_str(), "Nothing to render");
        }
        Ok(markup)
    }
}
