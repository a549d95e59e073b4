//! List command - show secret presence per repository.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::config::Config;
use crate::core::executor;
use crate::core::plan::{self, Selector};
use crate::core::sink::GhCli;
use crate::error::Result;

/// Probe each repository for its required secrets. Informational only;
/// no resolution, no writes, exit code 0.
pub fn execute(config_path: &Path, secret: Option<&str>) -> Result<i32> {
    info!(secret = secret.unwrap_or("<all>"), "running list");

    let config = Config::load(config_path)?;
    let selector = Selector {
        secret: secret.map(String::from),
        repo: None,
    };
    let plan = plan::build(&config, &selector)?;

    if plan.is_empty() {
        output::dimmed("no repositories require any of the selected secrets");
        return Ok(0);
    }

    let sink = GhCli::new()?;
    let mut rows = executor::probe(&sink, &plan)?;

    // Group output by secret, repositories underneath.
    rows.sort_by(|a, b| (&a.secret, &a.repo).cmp(&(&b.secret, &b.repo)));
    let mut current: Option<String> = None;
    for row in &rows {
        if current.as_deref() != Some(row.secret.as_str()) {
            output::section(&row.secret);
            let description = &config.secrets[&row.secret].description;
            if !description.is_empty() {
                output::dimmed(description);
            }
            current = Some(row.secret.clone());
        }
        if row.present {
            output::success(&row.repo);
        } else {
            output::warn(&format!("{} (missing)", row.repo));
        }
    }

    Ok(0)
}
