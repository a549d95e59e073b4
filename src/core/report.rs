//! Per-item outcomes and run-level reporting.

/// Terminal status of one work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The remote write succeeded. Only ever recorded after the sink
    /// confirmed the side effect.
    Applied,
    /// Dry-run: a value is available and would be written.
    WouldApply,
    /// No value could be obtained for this item's secret.
    SkippedValueMissing,
    /// The remote write failed.
    Failed,
}

/// Outcome recorded for one (secret, repository) pair.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub secret: String,
    pub repo: String,
    pub status: Status,
    pub detail: Option<String>,
}

/// Aggregated outcomes for one run. Every work item in the plan ends up
/// here, so partial success is always fully visible.
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn record(&mut self, secret: &str, repo: &str, status: Status, detail: Option<String>) {
        self.outcomes.push(Outcome {
            secret: secret.to_string(),
            repo: repo.to_string(),
            status,
            detail,
        });
    }

    pub fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Whether the run as a whole succeeded.
    ///
    /// Skips are a warning rather than a failure, unless `fail_on_skip`
    /// is set, or nothing was applied at all while items were pending.
    pub fn is_success(&self, fail_on_skip: bool) -> bool {
        let failed = self.count(Status::Failed);
        let skipped = self.count(Status::SkippedValueMissing);
        let applied = self.count(Status::Applied);

        if failed > 0 {
            return false;
        }
        if fail_on_skip && skipped > 0 {
            return false;
        }
        if skipped > 0 && applied == 0 {
            return false;
        }
        true
    }
}
