//! analytics-snippet CLI entry point
//!
//! Parses arguments, renders the tracking payload and turns any failure into
//! a coloured message with suggestions before exiting with status 1.

use analytics_snippet::cli;
use analytics_snippet::core::user_friendly_error;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
