//! Test support utilities for repokey integration tests.
//!
//! Each test gets an isolated project dir with its own config and a
//! private bin dir holding a stub `gh`. PATH for the child process is set
//! to the bin dir only, so the stub is always the `gh` that gets called
//! and a real `gh` on the host can never interfere.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Two repositories requiring the same secret. The keychain service name
/// is one no host should have, so resolution always falls through to the
/// stdin fallback.
pub const TWO_REPO_CONFIG: &str = r#"
[secrets.TOKEN]
description = "CI token"
keychain = { service = "repokey-itest-missing-service" }

[repos."acme/one"]
secrets = ["TOKEN"]

[repos."acme/two"]
secrets = ["TOKEN"]
"#;

/// Stub body: consume stdin on `secret set`, succeed for everything.
pub const GH_OK: &str = r#"
if [ "$1" = "secret" ] && [ "$2" = "set" ]; then
  while read -r _line; do :; done
fi
exit 0
"#;

/// Stub body: `secret set` fails for acme/two, succeeds elsewhere.
pub const GH_FAIL_ACME_TWO: &str = r#"
if [ "$1" = "secret" ] && [ "$2" = "set" ]; then
  while read -r _line; do :; done
  if [ "$5" = "acme/two" ]; then
    echo "HTTP 403: forbidden" >&2
    exit 1
  fi
fi
exit 0
"#;

/// Stub body: `secret list` reports TOKEN present in acme/one only.
pub const GH_LIST_ONE_HAS_TOKEN: &str = r#"
if [ "$1" = "secret" ] && [ "$2" = "list" ]; then
  if [ "$4" = "acme/one" ]; then
    printf 'TOKEN\t2024-01-01\n'
  fi
fi
exit 0
"#;

/// Isolated test environment: project dir with config, bin dir for the
/// `gh` stub.
pub struct Test {
    pub dir: TempDir,
    pub bin: TempDir,
}

impl Test {
    /// Environment without a config file.
    pub fn bare() -> Self {
        let dir = TempDir::new().expect("temp project dir");
        let bin = TempDir::new().expect("temp bin dir");
        Self { dir, bin }
    }

    /// Environment with `config` written as repokey.toml.
    pub fn with_config(config: &str) -> Self {
        let t = Self::bare();
        fs::write(t.dir.path().join("repokey.toml"), config).expect("write config");
        t
    }

    /// Install a stub `gh`. Every invocation is appended to `gh.log` in
    /// the project dir before `body` runs.
    pub fn stub_gh(&self, body: &str) {
        let script = format!(
            "#!/bin/sh\nPATH=/usr/bin:/bin:$PATH\necho \"$@\" >> \"{}\"\n{}\n",
            self.log_path().display(),
            body
        );
        let path = self.bin.path().join("gh");
        fs::write(&path, script).expect("write gh stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod gh stub");
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("gh.log")
    }

    /// Everything the stub `gh` was invoked with, one line per call.
    pub fn gh_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// A repokey command wired to this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("repokey").expect("repokey binary");
        cmd.current_dir(self.dir.path());
        cmd.env("PATH", self.bin.path());
        cmd.env("NO_COLOR", "1");
        cmd
    }
}
