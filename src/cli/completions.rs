//! Completions command - generate shell completion scripts.

use clap::CommandFactory;

use crate::error::Result;

/// Write completions for `shell` to stdout.
pub fn execute(shell: clap_complete::Shell) -> Result<i32> {
    let mut cmd = super::Cli::command();
    clap_complete::generate(shell, &mut cmd, "repokey", &mut std::io::stdout());
    Ok(0)
}
