//! Remote secret sink adapter - GitHub Actions secrets via the gh CLI.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Capability interface over the remote secret store.
///
/// One `write` call mutates exactly one (repository, secret) pair. A
/// transient failure is reported as an error, never retried here. The
/// secret value must never reach any log at any verbosity.
pub trait SecretSink {
    fn write(&self, repo: &str, name: &str, value: &str) -> Result<()>;

    /// Probe whether a secret is already present. Used by list mode only.
    fn exists(&self, repo: &str, name: &str) -> Result<bool>;
}

/// Sink backed by the `gh` CLI.
pub struct GhCli {
    program: PathBuf,
}

impl GhCli {
    /// Locate `gh` on PATH.
    pub fn new() -> Result<Self> {
        let program = which::which("gh").map_err(|_| Error::GhNotFound)?;
        debug!(program = %program.display(), "found gh");
        Ok(Self { program })
    }
}

impl SecretSink for GhCli {
    fn write(&self, repo: &str, name: &str, value: &str) -> Result<()> {
        debug!(repo, name, "setting repository secret");

        // The value goes through stdin so it never appears in the
        // process table or in any log line.
        let mut child = Command::new(&self.program)
            .args(["secret", "set", name, "--repo", repo])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(value.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GhFailed(stderr.trim().to_string()));
        }
        Ok(())
    }

    fn exists(&self, repo: &str, name: &str) -> Result<bool> {
        debug!(repo, name, "listing repository secrets");

        let output = Command::new(&self.program)
            .args(["secret", "list", "--repo", repo])
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(repo, error = %stderr.trim(), "gh secret list failed");
            return Ok(false);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(listed(&stdout, name))
    }
}

/// Whether `gh secret list` output names `name`.
///
/// Each line is `NAME\tUpdated ...`.
fn listed(stdout: &str, name: &str) -> bool {
    stdout
        .lines()
        .any(|line| line.split('\t').next() == Some(name))
}
