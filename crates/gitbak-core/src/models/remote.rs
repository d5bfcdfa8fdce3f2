use crate::config::BackupConfig;

/// Local remote name used for the hosted-service remote.
pub const HOSTED_REMOTE_NAME: &str = "github";

/// A bare repository location on an SSH host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    /// Directory under the remote home holding bare repos, e.g. `repos`.
    pub repos_dir: String,
    pub repo: String,
}

impl SshTarget {
    pub fn new(host: &str, repos_dir: &str, repo: &str) -> Self {
        Self {
            host: host.to_string(),
            repos_dir: repos_dir.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Path of the bare repo relative to the remote home.
    pub fn path(&self) -> String {
        format!("{}/{}.git", self.repos_dir, self.repo)
    }

    /// scp-style URL git understands, e.g. `nas:repos/dotfiles.git`.
    pub fn url(&self) -> String {
        format!("{}:{}", self.host, self.path())
    }
}

impl std::fmt::Display for SshTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// One member of the desired remote set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredRemote {
    /// Bare repo on an SSH host; the local remote is named after the host.
    Ssh { host: String },
    /// The hosted service.
    Hosted,
}

impl DesiredRemote {
    /// SSH hosts in config order, then the hosted remote if enabled.
    pub fn from_config(config: &BackupConfig) -> Vec<DesiredRemote> {
        let mut desired: Vec<DesiredRemote> = config
            .ssh_remote_hosts
            .iter()
            .map(|host| DesiredRemote::Ssh { host: host.clone() })
            .collect();
        if config.enable_hosted_remote {
            desired.push(DesiredRemote::Hosted);
        }
        desired
    }

    /// Name of the local remote this entry maps to.
    pub fn remote_name(&self) -> &str {
        match self {
            DesiredRemote::Ssh { host } => host,
            DesiredRemote::Hosted => HOSTED_REMOTE_NAME,
        }
    }
}

/// Result of asking a backend whether a repo exists on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Present,
    Absent,
    /// The backend could not answer (auth, DNS, connection...). Never safe to create.
    Unknown(String),
}
