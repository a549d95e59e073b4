//! Sync plan construction.
//!
//! A plan is the cross product of declared secrets and the repositories
//! that require them, in a deterministic order so repeated runs against
//! unchanged config are diffable.

use crate::config::Config;
use crate::error::{Error, Result};

/// One (secret, repository) pair to synchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub secret: String,
    pub repo: String,
}

/// Narrows a plan to one secret and/or one repository.
#[derive(Debug, Default, Clone)]
pub struct Selector {
    pub secret: Option<String>,
    pub repo: Option<String>,
}

/// Build the ordered work item list for `config` under `selector`.
///
/// Ordering is by repository, then by secret name. Config validation
/// already guarantees no duplicate (secret, repository) pairs.
pub fn build(config: &Config, selector: &Selector) -> Result<Vec<WorkItem>> {
    if let Some(name) = &selector.secret {
        if !config.secrets.contains_key(name) {
            return Err(Error::UnknownSecret(name.clone()));
        }
    }
    if let Some(repo) = &selector.repo {
        if !config.repos.contains_key(repo) {
            return Err(Error::UnknownRepo(repo.clone()));
        }
    }

    let mut items = Vec::new();
    for (repo, target) in &config.repos {
        if selector.repo.as_deref().is_some_and(|r| r != repo) {
            continue;
        }
        let mut names: Vec<&String> = target
            .secrets
            .iter()
            .filter(|s| selector.secret.as_deref().map_or(true, |sel| sel == s.as_str()))
            .collect();
        names.sort();
        for name in names {
            items.push(WorkItem {
                secret: name.clone(),
                repo: repo.clone(),
            });
        }
    }
    Ok(items)
}
