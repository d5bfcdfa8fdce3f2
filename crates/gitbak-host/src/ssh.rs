use gitbak_core::error::GitBakError;
use gitbak_core::models::remote::{ProbeOutcome, SshTarget};
use gitbak_git::git_ops;
use gitbak_git::process::{run_captured, CmdOutput};

use crate::SshBackend;

/// Branches whose presence is checked when probing a bare repo.
const PROBE_REFS: &[&str] = &["main", "master"];

/// stderr fragments git prints when the path on the host is not a repository.
const ABSENT_MARKERS: &[&str] = &[
    "does not appear to be a git repository",
    "not a git repository",
    "Repository not found",
];

/// `SshBackend` using the system `ssh` client and `git ls-remote`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSsh;

impl OpenSsh {
    pub fn new() -> Self {
        Self
    }

    fn remote(&self, host: &str, command: &str) -> Result<CmdOutput, GitBakError> {
        run_captured("ssh", &[host, command], None)
    }
}

/// Single-quote `s` for the remote shell.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Map a finished `ls-remote` to a probe outcome.
///
/// A reachable repository without `main` or `master` still counts as present: creating it
/// again would collide with the existing directory.
pub fn classify_ls_remote(out: &CmdOutput) -> ProbeOutcome {
    if out.success {
        return ProbeOutcome::Present;
    }
    if ABSENT_MARKERS.iter().any(|m| out.stderr.contains(m)) {
        return ProbeOutcome::Absent;
    }
    let reason = out.stderr.trim();
    ProbeOutcome::Unknown(if reason.is_empty() {
        "git ls-remote failed without output".to_string()
    } else {
        reason.to_string()
    })
}

impl SshBackend for OpenSsh {
    fn probe(&self, target: &SshTarget) -> ProbeOutcome {
        match git_ops::ls_remote(&target.url(), PROBE_REFS) {
            Ok(out) => classify_ls_remote(&out),
            Err(e) => ProbeOutcome::Unknown(e.to_string()),
        }
    }

    fn create_bare(&self, target: &SshTarget) -> Result<(), GitBakError> {
        let host = target.host.as_str();
        let path = target.path();

        let mkdir_root = format!("mkdir -p {}", quote(&target.repos_dir));
        self.remote(host, &mkdir_root)?
            .ok_or_failure("ssh", &[host, mkdir_root.as_str()])?;

        let mkdir_repo = format!("mkdir {}", quote(&path));
        let out = self.remote(host, &mkdir_repo)?;
        if !out.success {
            if out.stderr.contains("File exists") {
                return Err(GitBakError::RemoteCreationConflict {
                    target: target.url(),
                });
            }
            out.ok_or_failure("ssh", &[host, mkdir_repo.as_str()])?;
        }

        let init = format!("git init --bare {}", quote(&path));
        self.remote(host, &init)?.ok_or_failure("ssh", &[host, init.as_str()])?;
        tracing::info!("created bare repository {}", target.url());
        Ok(())
    }
}
