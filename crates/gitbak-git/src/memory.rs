use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gitbak_core::error::GitBakError;

use crate::Vcs;

#[derive(Default)]
struct State {
    work_trees: BTreeSet<PathBuf>,
    remotes: BTreeMap<PathBuf, BTreeMap<String, String>>,
    failing: BTreeSet<PathBuf>,
    failing_commits: BTreeSet<PathBuf>,
    calls: Vec<String>,
}

/// In-memory `Vcs` for testing. Records every mutating call.
#[derive(Default)]
pub struct MemoryGit {
    state: Mutex<State>,
}

impl MemoryGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as a working tree.
    pub fn add_work_tree(&self, path: &Path) {
        self.state.lock().unwrap().work_trees.insert(path.to_path_buf());
    }

    /// Attach a remote without recording a call.
    pub fn seed_remote(&self, path: &Path, name: &str, url: &str) {
        self.state
            .lock()
            .unwrap()
            .remotes
            .entry(path.to_path_buf())
            .or_default()
            .insert(name.to_string(), url.to_string());
    }

    /// Make network operations (fetch, push, status, pull) fail in `path`.
    pub fn fail_in(&self, path: &Path) {
        self.state.lock().unwrap().failing.insert(path.to_path_buf());
    }

    /// Make `commit` fail in `path`, as it does when no git identity is configured.
    pub fn fail_commits_in(&self, path: &Path) {
        self.state
            .lock()
            .unwrap()
            .failing_commits
            .insert(path.to_path_buf());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing.clear();
        state.failing_commits.clear();
    }

    /// Remotes of `path` as (name, url), sorted by name.
    pub fn remotes(&self, path: &Path) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .remotes
            .get(path)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn network(&self, dir: &Path, call: String) -> Result<(), GitBakError> {
        let failing = self.state.lock().unwrap().failing.contains(dir);
        self.record(call.clone());
        if failing {
            return Err(GitBakError::SubprocessFailure {
                command: call,
                message: "simulated failure".into(),
            });
        }
        Ok(())
    }
}

impl Vcs for MemoryGit {
    fn is_work_tree(&self, path: &Path) -> bool {
        self.state.lock().unwrap().work_trees.contains(path)
    }

    fn init(&self, dir: &Path) -> Result<(), GitBakError> {
        self.add_work_tree(dir);
        self.record(format!("init {}", dir.display()));
        Ok(())
    }

    fn add(&self, dir: &Path, pathspec: &str) -> Result<(), GitBakError> {
        self.record(format!("add {} {pathspec}", dir.display()));
        Ok(())
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<(), GitBakError> {
        let failing = self.state.lock().unwrap().failing_commits.contains(dir);
        self.record(format!("commit {} {message}", dir.display()));
        if failing {
            return Err(GitBakError::SubprocessFailure {
                command: "git commit".into(),
                message: "Please tell me who you are.".into(),
            });
        }
        Ok(())
    }

    fn remote_list(&self, dir: &Path) -> Result<Vec<String>, GitBakError> {
        Ok(self.remotes(dir).into_iter().map(|(name, _)| name).collect())
    }

    fn remote_add(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitBakError> {
        self.record(format!("remote add {} {name} {url}", dir.display()));
        let mut state = self.state.lock().unwrap();
        state
            .remotes
            .entry(dir.to_path_buf())
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| url.to_string());
        Ok(())
    }

    fn remote_remove(&self, dir: &Path, name: &str) -> Result<(), GitBakError> {
        self.record(format!("remote remove {} {name}", dir.display()));
        let mut state = self.state.lock().unwrap();
        let removed = state
            .remotes
            .get_mut(dir)
            .and_then(|m| m.remove(name))
            .is_some();
        if !removed {
            return Err(GitBakError::SubprocessFailure {
                command: format!("git remote remove {name}"),
                message: format!("No such remote: '{name}'"),
            });
        }
        Ok(())
    }

    fn push_all(&self, dir: &Path, remote: &str) -> Result<(), GitBakError> {
        self.network(dir, format!("push --all {} {remote}", dir.display()))
    }

    fn fetch_all(&self, dir: &Path) -> Result<(), GitBakError> {
        self.network(dir, format!("fetch --all {}", dir.display()))
    }

    fn status(&self, dir: &Path) -> Result<(), GitBakError> {
        self.network(dir, format!("status {}", dir.display()))
    }

    fn pull_ff_only(&self, dir: &Path) -> Result<(), GitBakError> {
        self.network(dir, format!("pull --ff-only {}", dir.display()))
    }

    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), GitBakError> {
        self.record(format!("clone {url} {}", dest.display()));
        let mut state = self.state.lock().unwrap();
        state.work_trees.insert(dest.to_path_buf());
        state
            .remotes
            .entry(dest.to_path_buf())
            .or_default()
            .insert("origin".to_string(), url.to_string());
        Ok(())
    }
}
