//! Repokey - keep shared GitHub Actions secrets in sync across repositories.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repokey::cli::output;
use repokey::cli::{execute, Cli};
use repokey::error::Error;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("REPOKEY_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("repokey=debug")
        } else {
            EnvFilter::new("repokey=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let suggestion = match &e {
                Error::ConfigNotFound(_) => Some("create repokey.toml or pass --config"),
                Error::GhNotFound => Some("install the GitHub CLI: https://cli.github.com"),
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(hint);
            }
            std::process::exit(1);
        }
    }
}
