//! Sync executor - resolves each secret once and fans it out.
//!
//! A run moves through planning, resolving, and applying. Resolution hits
//! the credential source at most once per distinct secret; the result,
//! including the fact that a secret is unavailable, is memoized for the
//! rest of the run. Per-item write failures never abort the run: every
//! work item gets a recorded outcome.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::core::plan::WorkItem;
use crate::core::prompt::ValueFallback;
use crate::core::report::{Report, Status};
use crate::core::sink::SecretSink;
use crate::core::source::{CredentialSource, Resolution};
use crate::error::{Error, Result};

/// How a run treats the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report what would be written without calling the sink. Stays
    /// non-interactive: missing values show up as skipped in the preview.
    DryRun,
    /// Write to the remote store.
    Apply,
}

/// Presence of one required secret in one repository, from list mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub secret: String,
    pub repo: String,
    pub present: bool,
}

/// Walks a plan against injected source/sink/fallback capabilities.
pub struct Executor<'a> {
    config: &'a Config,
    source: &'a dyn CredentialSource,
    sink: &'a dyn SecretSink,
    fallback: &'a dyn ValueFallback,
    /// Per-run memo. `None` records that a secret is unavailable for the
    /// rest of the run. Owned by this executor, discarded with it.
    resolved: BTreeMap<String, Option<Zeroizing<String>>>,
}

impl<'a> Executor<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn CredentialSource,
        sink: &'a dyn SecretSink,
        fallback: &'a dyn ValueFallback,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            fallback,
            resolved: BTreeMap::new(),
        }
    }

    /// Run the plan to completion and report every item's outcome.
    ///
    /// Only setup problems (an undeclared secret, a failing prompt) abort
    /// the run; remote write failures are contained to their item.
    pub fn run(&mut self, plan: &[WorkItem], mode: Mode) -> Result<Report> {
        // Resolving: one source lookup per distinct secret.
        for item in plan {
            if !self.resolved.contains_key(&item.secret) {
                let value = self.resolve(&item.secret, mode)?;
                self.resolved.insert(item.secret.clone(), value);
            }
        }

        // Applying: plan order, never aborting on a single item.
        let mut report = Report::default();
        for item in plan {
            let value = self.resolved.get(&item.secret).and_then(|v| v.as_ref());
            match (value, mode) {
                (None, _) => {
                    warn!(secret = %item.secret, repo = %item.repo, "no value available, skipping");
                    report.record(&item.secret, &item.repo, Status::SkippedValueMissing, None);
                }
                (Some(_), Mode::DryRun) => {
                    report.record(&item.secret, &item.repo, Status::WouldApply, None);
                }
                (Some(value), Mode::Apply) => {
                    match self.sink.write(&item.repo, &item.secret, value) {
                        Ok(()) => {
                            info!(secret = %item.secret, repo = %item.repo, "secret applied");
                            report.record(&item.secret, &item.repo, Status::Applied, None);
                        }
                        Err(e) => {
                            warn!(secret = %item.secret, repo = %item.repo, error = %e, "remote write failed");
                            report.record(
                                &item.secret,
                                &item.repo,
                                Status::Failed,
                                Some(e.to_string()),
                            );
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// Resolve one secret through the source, falling back to the operator
    /// when the store has no value. Called at most once per secret per run.
    fn resolve(&self, name: &str, mode: Mode) -> Result<Option<Zeroizing<String>>> {
        let def = self
            .config
            .secrets
            .get(name)
            .ok_or_else(|| Error::UnknownSecret(name.to_string()))?;

        let lookup = match &def.keychain {
            Some(keychain) => self.source.resolve(keychain),
            None => Ok(Resolution::Absent),
        };

        match lookup {
            Ok(Resolution::Found(value)) => {
                info!(secret = %name, "resolved from keychain");
                return Ok(Some(value));
            }
            Ok(Resolution::Absent) => {
                debug!(secret = %name, "not found in keychain");
            }
            Err(Error::StoreUnavailable(reason)) => {
                warn!(secret = %name, %reason, "keychain unavailable");
            }
            Err(e) => return Err(e),
        }

        if mode == Mode::DryRun {
            return Ok(None);
        }
        self.fallback.obtain(name)
    }
}

/// List mode: probe the sink for each work item's presence. Performs no
/// resolution and no writes.
pub fn probe(sink: &dyn SecretSink, plan: &[WorkItem]) -> Result<Vec<Presence>> {
    let mut rows = Vec::with_capacity(plan.len());
    for item in plan {
        let present = sink.exists(&item.repo, &item.secret)?;
        rows.push(Presence {
            secret: item.secret.clone(),
            repo: item.repo.clone(),
            present,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeychainRef, RepoTarget, SecretDef};
    use crate::core::prompt::NoFallback;
    use std::cell::RefCell;

    fn config(secrets: &[&str], repos: &[(&str, &[&str])]) -> Config {
        let mut c = Config::default();
        for name in secrets {
            c.secrets.insert(
                name.to_string(),
                SecretDef {
                    description: String::new(),
                    keychain: Some(KeychainRef {
                        service: "svc".into(),
                        account: None,
                        json_path: None,
                    }),
                },
            );
        }
        for (repo, names) in repos {
            c.repos.insert(
                repo.to_string(),
                RepoTarget {
                    secrets: names.iter().map(|s| s.to_string()).collect(),
                },
            );
        }
        c
    }

    fn plan_for(config: &Config) -> Vec<WorkItem> {
        crate::core::plan::build(config, &Default::default()).unwrap()
    }

    /// Source returning a fixed answer, counting invocations.
    struct FakeSource {
        answer: std::result::Result<Option<&'static str>, &'static str>,
        calls: RefCell<usize>,
    }

    impl FakeSource {
        fn found(value: &'static str) -> Self {
            Self {
                answer: Ok(Some(value)),
                calls: RefCell::new(0),
            }
        }

        fn absent() -> Self {
            Self {
                answer: Ok(None),
                calls: RefCell::new(0),
            }
        }

        fn unavailable(reason: &'static str) -> Self {
            Self {
                answer: Err(reason),
                calls: RefCell::new(0),
            }
        }
    }

    impl CredentialSource for FakeSource {
        fn resolve(&self, _keychain: &KeychainRef) -> Result<Resolution> {
            *self.calls.borrow_mut() += 1;
            match self.answer {
                Ok(Some(value)) => Ok(Resolution::Found(Zeroizing::new(value.to_string()))),
                Ok(None) => Ok(Resolution::Absent),
                Err(reason) => Err(Error::StoreUnavailable(reason.to_string())),
            }
        }
    }

    /// Sink recording writes, failing for chosen repositories.
    #[derive(Default)]
    struct FakeSink {
        fail_repos: Vec<&'static str>,
        present: Vec<(&'static str, &'static str)>,
        writes: RefCell<Vec<(String, String)>>,
        probes: RefCell<usize>,
    }

    impl SecretSink for FakeSink {
        fn write(&self, repo: &str, name: &str, _value: &str) -> Result<()> {
            self.writes.borrow_mut().push((repo.into(), name.into()));
            if self.fail_repos.contains(&repo) {
                Err(Error::GhFailed("boom".into()))
            } else {
                Ok(())
            }
        }

        fn exists(&self, repo: &str, name: &str) -> Result<bool> {
            *self.probes.borrow_mut() += 1;
            Ok(self.present.contains(&(repo, name)))
        }
    }

    /// Fallback that yields a fixed value, counting invocations.
    struct FakePrompt {
        value: Option<&'static str>,
        calls: RefCell<usize>,
    }

    impl FakePrompt {
        fn yielding(value: &'static str) -> Self {
            Self {
                value: Some(value),
                calls: RefCell::new(0),
            }
        }
    }

    impl ValueFallback for FakePrompt {
        fn obtain(&self, _secret: &str) -> Result<Option<Zeroizing<String>>> {
            *self.calls.borrow_mut() += 1;
            Ok(self.value.map(|v| Zeroizing::new(v.to_string())))
        }
    }

    #[test]
    fn test_resolves_each_secret_once() {
        let c = config(
            &["TOKEN"],
            &[
                ("acme/one", &["TOKEN"]),
                ("acme/two", &["TOKEN"]),
                ("acme/three", &["TOKEN"]),
            ],
        );
        let source = FakeSource::found("abc123");
        let sink = FakeSink::default();

        let mut executor = Executor::new(&c, &source, &sink, &NoFallback);
        let report = executor.run(&plan_for(&c), Mode::Apply).unwrap();

        assert_eq!(*source.calls.borrow(), 1);
        assert_eq!(report.count(Status::Applied), 3);
        assert_eq!(sink.writes.borrow().len(), 3);
    }

    #[test]
    fn test_dry_run_never_writes() {
        let c = config(
            &["TOKEN"],
            &[("acme/one", &["TOKEN"]), ("acme/two", &["TOKEN"])],
        );
        let source = FakeSource::found("abc123");
        let sink = FakeSink::default();

        let mut executor = Executor::new(&c, &source, &sink, &NoFallback);
        let report = executor.run(&plan_for(&c), Mode::DryRun).unwrap();

        assert!(sink.writes.borrow().is_empty());
        assert_eq!(report.count(Status::WouldApply), 2);
    }

    #[test]
    fn test_partial_failure_continues_and_reports_both() {
        let c = config(
            &["TOKEN"],
            &[("acme/r1", &["TOKEN"]), ("acme/r2", &["TOKEN"])],
        );
        let source = FakeSource::found("abc123");
        let sink = FakeSink {
            fail_repos: vec!["acme/r2"],
            ..Default::default()
        };

        let mut executor = Executor::new(&c, &source, &sink, &NoFallback);
        let report = executor.run(&plan_for(&c), Mode::Apply).unwrap();

        let by_repo: Vec<(&str, Status)> = report
            .outcomes
            .iter()
            .map(|o| (o.repo.as_str(), o.status))
            .collect();
        assert_eq!(
            by_repo,
            vec![("acme/r1", Status::Applied), ("acme/r2", Status::Failed)]
        );
        assert!(!report.is_success(false));
    }

    #[test]
    fn test_absent_value_skips_without_writes() {
        let c = config(
            &["TOKEN"],
            &[("acme/r1", &["TOKEN"]), ("acme/r2", &["TOKEN"])],
        );
        let source = FakeSource::absent();
        let sink = FakeSink::default();

        let mut executor = Executor::new(&c, &source, &sink, &NoFallback);
        let report = executor.run(&plan_for(&c), Mode::Apply).unwrap();

        assert!(sink.writes.borrow().is_empty());
        assert_eq!(report.count(Status::SkippedValueMissing), 2);
        assert!(!report.is_success(false));
    }

    #[test]
    fn test_fallback_rescues_unavailable_store() {
        let c = config(&["TOKEN"], &[("acme/r1", &["TOKEN"])]);
        let source = FakeSource::unavailable("offline");
        let sink = FakeSink::default();
        let prompt = FakePrompt::yielding("typed-in");

        let mut executor = Executor::new(&c, &source, &sink, &prompt);
        let report = executor.run(&plan_for(&c), Mode::Apply).unwrap();

        assert_eq!(*prompt.calls.borrow(), 1);
        assert_eq!(report.count(Status::Applied), 1);
    }

    #[test]
    fn test_fallback_invoked_once_per_secret() {
        let c = config(
            &["TOKEN"],
            &[("acme/r1", &["TOKEN"]), ("acme/r2", &["TOKEN"])],
        );
        let source = FakeSource::absent();
        let sink = FakeSink::default();
        let prompt = FakePrompt::yielding("typed-in");

        let mut executor = Executor::new(&c, &source, &sink, &prompt);
        let report = executor.run(&plan_for(&c), Mode::Apply).unwrap();

        assert_eq!(*prompt.calls.borrow(), 1);
        assert_eq!(report.count(Status::Applied), 2);
    }

    #[test]
    fn test_dry_run_stays_non_interactive() {
        struct PanicPrompt;
        impl ValueFallback for PanicPrompt {
            fn obtain(&self, _secret: &str) -> Result<Option<Zeroizing<String>>> {
                panic!("dry-run must not prompt");
            }
        }

        let c = config(&["TOKEN"], &[("acme/r1", &["TOKEN"])]);
        let source = FakeSource::absent();
        let sink = FakeSink::default();

        let mut executor = Executor::new(&c, &source, &sink, &PanicPrompt);
        let report = executor.run(&plan_for(&c), Mode::DryRun).unwrap();

        assert_eq!(report.count(Status::SkippedValueMissing), 1);
    }

    #[test]
    fn test_probe_reports_presence_without_resolution() {
        let c = config(
            &["TOKEN"],
            &[("acme/r1", &["TOKEN"]), ("acme/r2", &["TOKEN"])],
        );
        let sink = FakeSink {
            present: vec![("acme/r1", "TOKEN")],
            ..Default::default()
        };

        let rows = probe(&sink, &plan_for(&c)).unwrap();

        assert_eq!(
            rows,
            vec![
                Presence {
                    secret: "TOKEN".into(),
                    repo: "acme/r1".into(),
                    present: true,
                },
                Presence {
                    secret: "TOKEN".into(),
                    repo: "acme/r2".into(),
                    present: false,
                },
            ]
        );
        assert_eq!(*sink.probes.borrow(), 2);
        assert!(sink.writes.borrow().is_empty());
    }
}
