pub mod github;
pub mod memory;
pub mod ssh;

use std::path::Path;

use gitbak_core::error::GitBakError;
use gitbak_core::models::decision::Visibility;
use gitbak_core::models::remote::{ProbeOutcome, SshTarget};

pub use github::GhCli;
pub use memory::{MemoryHosted, MemorySsh};
pub use ssh::OpenSsh;

/// Bare repositories on SSH hosts.
pub trait SshBackend {
    /// Whether the bare repo exists. Does not modify anything.
    fn probe(&self, target: &SshTarget) -> ProbeOutcome;

    /// Create the bare repo. Fails with `RemoteCreationConflict` if its directory exists.
    fn create_bare(&self, target: &SshTarget) -> Result<(), GitBakError>;
}

/// A hosted git service reached through its CLI.
pub trait HostedService {
    /// Human-readable service name for messages.
    fn label(&self) -> &str;

    /// Whether `repo` exists on the service. Does not modify anything.
    fn probe(&self, repo: &str) -> ProbeOutcome;

    /// SSH clone URL of an existing repo.
    fn ssh_url(&self, repo: &str) -> Result<String, GitBakError>;

    /// Create `repo` from the local repository at `source`, registering it as `remote_name`.
    fn create(
        &self,
        repo: &str,
        visibility: Visibility,
        source: &Path,
        remote_name: &str,
    ) -> Result<(), GitBakError>;

    /// Clone `repo` from the service into `dest`.
    fn clone_into(&self, repo: &str, dest: &Path) -> Result<(), GitBakError>;
}

/// Build the hosted service when it is enabled in config.
pub fn create_hosted_service(enabled: bool) -> Option<GhCli> {
    enabled.then(GhCli::new)
}
