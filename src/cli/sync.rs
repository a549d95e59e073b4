//! Sync command - fan secret values out to their repositories.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::config::Config;
use crate::core::executor::{Executor, Mode};
use crate::core::plan::{self, Selector};
use crate::core::prompt::TerminalPrompt;
use crate::core::report::{Report, Status};
use crate::core::sink::GhCli;
use crate::core::source::Keychain;
use crate::error::Result;

/// Resolve the selected secrets and write them to every repository that
/// requires them. Returns the process exit code.
pub fn execute(
    config_path: &Path,
    secret: Option<&str>,
    repo: Option<&str>,
    dry_run: bool,
) -> Result<i32> {
    info!(dry_run, "running sync");

    let config = Config::load(config_path)?;
    let selector = Selector {
        secret: secret.map(String::from),
        repo: repo.map(String::from),
    };
    let plan = plan::build(&config, &selector)?;

    if plan.is_empty() {
        output::dimmed("nothing to sync");
        return Ok(0);
    }

    let sink = GhCli::new()?;
    let source = Keychain::new();
    let mode = if dry_run { Mode::DryRun } else { Mode::Apply };

    let mut executor = Executor::new(&config, &source, &sink, &TerminalPrompt);
    let report = executor.run(&plan, mode)?;

    render(&report);

    if dry_run {
        // Preview only, always informational.
        return Ok(0);
    }
    Ok(if report.is_success(config.policy.fail_on_skip) {
        0
    } else {
        1
    })
}

fn render(report: &Report) {
    for outcome in &report.outcomes {
        let what = format!("{} in {}", outcome.secret, outcome.repo);
        match outcome.status {
            Status::Applied => output::success(&format!("set {}", what)),
            Status::WouldApply => output::hint(&format!("would set {}", what)),
            Status::SkippedValueMissing => {
                output::warn(&format!("skipped {} (no value)", what))
            }
            Status::Failed => {
                let detail = outcome.detail.as_deref().unwrap_or("unknown error");
                output::error(&format!("failed to set {}: {}", what, detail));
            }
        }
    }

    println!();
    let would_apply = report.count(Status::WouldApply);
    if would_apply > 0 {
        output::kv("would apply", would_apply);
    } else {
        output::kv("applied", report.count(Status::Applied));
    }
    output::kv("skipped", report.count(Status::SkippedValueMissing));
    output::kv("failed", report.count(Status::Failed));
}
