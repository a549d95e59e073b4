//! Command-line interface.

pub mod completions;
pub mod list;
pub mod output;
pub mod sync;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// Repokey - keep shared GitHub Actions secrets in sync across repositories.
#[derive(Parser)]
#[command(
    name = "repokey",
    about = "Sync GitHub Actions secrets across repositories from the local keychain",
    version
)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Show which repositories already have their required secrets
    List {
        /// Limit to a single secret
        secret: Option<String>,
    },

    /// Push secret values out to the repositories that need them
    #[command(group = ArgGroup::new("scope").required(true).args(["secret", "all"]))]
    Sync {
        /// Secret to sync
        secret: Option<String>,

        /// Sync every declared secret
        #[arg(long)]
        all: bool,

        /// Limit to a single repository (owner/name)
        #[arg(long)]
        repo: Option<String>,

        /// Preview without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a command, returning the process exit code.
pub fn execute(cli: Cli) -> crate::error::Result<i32> {
    let Cli {
        config, command, ..
    } = cli;

    match command {
        Command::List { secret } => list::execute(&config, secret.as_deref()),
        Command::Sync {
            secret,
            all: _,
            repo,
            dry_run,
        } => sync::execute(&config, secret.as_deref(), repo.as_deref(), dry_run),
        Command::Completions { shell } => completions::execute(shell),
    }
}
