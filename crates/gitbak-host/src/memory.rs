use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;

use gitbak_core::error::GitBakError;
use gitbak_core::models::decision::Visibility;
use gitbak_core::models::remote::{ProbeOutcome, SshTarget};

use crate::{HostedService, SshBackend};

#[derive(Default)]
struct SshState {
    repos: BTreeSet<String>,
    unreachable: BTreeSet<String>,
    calls: Vec<String>,
}

/// In-memory SSH hosts for testing, keyed by bare-repo URL.
#[derive(Default)]
pub struct MemorySsh {
    state: Mutex<SshState>,
}

impl MemorySsh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a bare repo already exists at `url`.
    pub fn seed_repo(&self, url: &str) {
        self.state.lock().unwrap().repos.insert(url.to_string());
    }

    /// Every operation against `host` fails as if the connection were refused.
    pub fn set_unreachable(&self, host: &str) {
        self.state.lock().unwrap().unreachable.insert(host.to_string());
    }

    pub fn has_repo(&self, url: &str) -> bool {
        self.state.lock().unwrap().repos.contains(url)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl SshBackend for MemorySsh {
    fn probe(&self, target: &SshTarget) -> ProbeOutcome {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("probe {}", target.url()));
        if state.unreachable.contains(&target.host) {
            return ProbeOutcome::Unknown(format!(
                "ssh: connect to host {} port 22: Connection refused",
                target.host
            ));
        }
        if state.repos.contains(&target.url()) {
            ProbeOutcome::Present
        } else {
            ProbeOutcome::Absent
        }
    }

    fn create_bare(&self, target: &SshTarget) -> Result<(), GitBakError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {}", target.url()));
        if state.unreachable.contains(&target.host) {
            return Err(GitBakError::SubprocessFailure {
                command: format!("ssh {}", target.host),
                message: "Connection refused".into(),
            });
        }
        if !state.repos.insert(target.url()) {
            return Err(GitBakError::RemoteCreationConflict {
                target: target.url(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct HostedState {
    repos: BTreeMap<String, String>,
    unreachable: bool,
    calls: Vec<String>,
}

/// In-memory hosted service for testing.
#[derive(Default)]
pub struct MemoryHosted {
    state: Mutex<HostedState>,
}

impl MemoryHosted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_repo(&self, repo: &str) {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(repo.to_string(), Self::url_for(repo));
    }

    pub fn set_unreachable(&self) {
        self.state.lock().unwrap().unreachable = true;
    }

    pub fn url_for(repo: &str) -> String {
        format!("git@github.test:me/{repo}.git")
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl HostedService for MemoryHosted {
    fn label(&self) -> &str {
        "memory"
    }

    fn probe(&self, repo: &str) -> ProbeOutcome {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("probe {repo}"));
        if state.unreachable {
            return ProbeOutcome::Unknown("error connecting to service".into());
        }
        if state.repos.contains_key(repo) {
            ProbeOutcome::Present
        } else {
            ProbeOutcome::Absent
        }
    }

    fn ssh_url(&self, repo: &str) -> Result<String, GitBakError> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .cloned()
            .ok_or_else(|| GitBakError::SubprocessFailure {
                command: format!("repo view {repo}"),
                message: "Could not resolve to a Repository".into(),
            })
    }

    fn create(
        &self,
        repo: &str,
        visibility: Visibility,
        _source: &Path,
        _remote_name: &str,
    ) -> Result<(), GitBakError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {repo} --{visibility}"));
        if state.repos.contains_key(repo) {
            return Err(GitBakError::RemoteCreationConflict {
                target: repo.to_string(),
            });
        }
        state.repos.insert(repo.to_string(), Self::url_for(repo));
        Ok(())
    }

    fn clone_into(&self, repo: &str, dest: &Path) -> Result<(), GitBakError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("clone {repo} {}", dest.display()));
        Ok(())
    }
}
