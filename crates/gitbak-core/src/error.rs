use std::path::PathBuf;

/// Central error type for git-backup.
#[derive(Debug, thiserror::Error)]
pub enum GitBakError {
    #[error("could not find config file at {path}")]
    ConfigMissing { path: PathBuf },

    #[error("invalid config at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("not initialised: {message}")]
    NotInitialized { message: String },

    #[error("repo {name}: {path} does not exist")]
    RepoPathMissing { name: String, path: PathBuf },

    #[error("repo {name}: {path} exists but is not a git repository")]
    NotAGitRepo { name: String, path: PathBuf },

    #[error("invalid repo name \"{name}\": {reason}")]
    InvalidRepoName { name: String, reason: String },

    #[error("repo {name} is already tracked")]
    AlreadyTracked { name: String },

    #[error("repo {name} is not tracked")]
    NotTracked { name: String },

    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    #[error("could not determine whether {target} exists: {message}")]
    RemoteProbeFailed { target: String, message: String },

    #[error("{target} already exists")]
    RemoteCreationConflict { target: String },

    #[error("{command} failed: {message}")]
    SubprocessFailure { command: String, message: String },

    #[error("aborted by user")]
    AbortedByUser,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GitBakError {
    /// Conflicts are reported as notices rather than failures.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            GitBakError::AlreadyTracked { .. } | GitBakError::RemoteCreationConflict { .. }
        )
    }
}
