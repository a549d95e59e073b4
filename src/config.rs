//! repokey.toml loading and validation.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "repokey.toml";

/// Top-level configuration: declared secrets and the repositories that
/// require them.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub secrets: BTreeMap<String, SecretDef>,
    #[serde(default)]
    pub repos: BTreeMap<String, RepoTarget>,
}

/// Run-level policy knobs.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Treat skipped-value-missing outcomes as run failures.
    #[serde(default)]
    pub fail_on_skip: bool,
}

/// A named secret plus instructions for locating its current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretDef {
    #[serde(default)]
    pub description: String,
    pub keychain: Option<KeychainRef>,
}

/// Where to find a secret in the local keychain.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeychainRef {
    pub service: String,
    /// Keychain account; defaults to the current username.
    pub account: Option<String>,
    /// Dotted path selecting a leaf from a JSON-structured item,
    /// e.g. "claudeAiOauth.accessToken".
    pub json_path: Option<String>,
}

/// A destination repository and the secrets it requires.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoTarget {
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl Config {
    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent configuration before any resolution or write.
    fn validate(&self) -> Result<()> {
        for (name, def) in &self.secrets {
            if let Some(keychain) = &def.keychain {
                if keychain.service.trim().is_empty() {
                    return Err(Error::ConfigInvalid(format!(
                        "secret {} has an empty keychain service",
                        name
                    )));
                }
            }
        }
        for (repo, target) in &self.repos {
            if !repo.contains('/') {
                return Err(Error::ConfigInvalid(format!(
                    "repository {} is not in owner/name form",
                    repo
                )));
            }
            let mut seen = BTreeSet::new();
            for secret in &target.secrets {
                if !self.secrets.contains_key(secret) {
                    return Err(Error::ConfigInvalid(format!(
                        "repository {} references undeclared secret {}",
                        repo, secret
                    )));
                }
                if !seen.insert(secret.as_str()) {
                    return Err(Error::ConfigInvalid(format!(
                        "repository {} lists secret {} twice",
                        repo, secret
                    )));
                }
            }
        }
        Ok(())
    }
}
