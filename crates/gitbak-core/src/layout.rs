use std::path::{Path, PathBuf};

use crate::error::GitBakError;
use crate::models::repo::LocalRepo;

/// Name of the repo holding the config and the tracked-repo markers.
pub const TRACKING_REPO_NAME: &str = "git-backup-tracking";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const TRACKED_REPOS_DIR_NAME: &str = "tracked-repos";
const DEFAULT_REPOS_DIR_NAME: &str = "repos";

/// Every path git-backup touches, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    repos_root: PathBuf,
}

impl Layout {
    pub fn new(repos_root: impl Into<PathBuf>) -> Self {
        Self {
            repos_root: repos_root.into(),
        }
    }

    /// `~/repos`.
    pub fn from_home() -> Result<Self, GitBakError> {
        let home = dirs::home_dir().ok_or_else(|| GitBakError::NotInitialized {
            message: "could not determine home directory".into(),
        })?;
        Ok(Self::new(home.join(DEFAULT_REPOS_DIR_NAME)))
    }

    pub fn repos_root(&self) -> &Path {
        &self.repos_root
    }

    /// Directory name of the repos root. Bare repos on SSH hosts live under a
    /// directory of the same name, relative to the remote home.
    pub fn repos_dir_name(&self) -> String {
        self.repos_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_REPOS_DIR_NAME.to_string())
    }

    pub fn tracking_repo_path(&self) -> PathBuf {
        self.repos_root.join(TRACKING_REPO_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.tracking_repo_path().join(CONFIG_FILE_NAME)
    }

    pub fn tracked_dir(&self) -> PathBuf {
        self.tracking_repo_path().join(TRACKED_REPOS_DIR_NAME)
    }

    pub fn repo(&self, name: &str) -> LocalRepo {
        LocalRepo {
            name: name.to_string(),
            path: self.repos_root.join(name),
        }
    }

    pub fn tracking_repo(&self) -> LocalRepo {
        self.repo(TRACKING_REPO_NAME)
    }
}
