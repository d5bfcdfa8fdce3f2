use std::collections::BTreeSet;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use gitbak_core::config::BackupConfig;
use gitbak_core::error::GitBakError;
use gitbak_core::layout::Layout;
use gitbak_core::models::decision::{PromptDecision, Visibility};
use gitbak_core::models::remote::{DesiredRemote, ProbeOutcome, SshTarget};
use gitbak_core::models::repo::LocalRepo;
use gitbak_git::Vcs;
use gitbak_host::{HostedService, SshBackend};

/// What happened to one desired remote.
#[derive(Debug)]
pub enum TargetOutcome {
    /// Local remote already present; nothing probed.
    AlreadyAttached,
    /// Existed on the target and was added as a local remote.
    Attached { url: String },
    /// Created on the target, attached, and pushed.
    Created { url: String },
    /// Creation requested but the repo already existed on the target.
    SkippedExisting { attached: bool },
    /// Does not exist on the target; plain reconciliation never creates it.
    LeftAbsent,
    Failed(GitBakError),
}

#[derive(Debug)]
pub struct TargetReport {
    /// Local remote name.
    pub remote: String,
    /// Where the repo lives, for messages.
    pub target: String,
    pub outcome: TargetOutcome,
}

/// Result of reconciling one repository.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub repo: String,
    /// Remotes removed by a reset.
    pub removed: Vec<String>,
    pub targets: Vec<TargetReport>,
}

impl ReconcileReport {
    /// Failures other than notices (e.g. creation conflicts).
    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|t| matches!(&t.outcome, TargetOutcome::Failed(e) if !e.is_notice()))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Brings a repository's remotes in line with the configured remote set.
pub struct RemoteReconciler<'a> {
    vcs: &'a dyn Vcs,
    ssh: &'a dyn SshBackend,
    hosted: Option<&'a dyn HostedService>,
    repos_dir: String,
}

impl<'a> RemoteReconciler<'a> {
    pub fn new(
        layout: &Layout,
        vcs: &'a dyn Vcs,
        ssh: &'a dyn SshBackend,
        hosted: Option<&'a dyn HostedService>,
    ) -> Self {
        Self {
            vcs,
            ssh,
            hosted,
            repos_dir: layout.repos_dir_name(),
        }
    }

    fn ssh_target(&self, repo: &LocalRepo, host: &str) -> SshTarget {
        SshTarget::new(host, &self.repos_dir, &repo.name)
    }

    fn describe(&self, repo: &LocalRepo, desired: &DesiredRemote) -> String {
        match desired {
            DesiredRemote::Ssh { host } => self.ssh_target(repo, host).url(),
            DesiredRemote::Hosted => match self.hosted {
                Some(service) => format!("{} repository {}", service.label(), repo.name),
                None => format!("hosted repository {}", repo.name),
            },
        }
    }

    /// Desired remotes for `config`. The hosted remote is dropped when no service is wired up.
    pub fn desired(&self, config: &BackupConfig) -> Vec<DesiredRemote> {
        DesiredRemote::from_config(config)
            .into_iter()
            .filter(|d| match d {
                DesiredRemote::Hosted if self.hosted.is_none() => {
                    tracing::warn!("hosted remote enabled in config but no service available");
                    false
                }
                _ => true,
            })
            .collect()
    }

    pub fn existing(&self, repo: &LocalRepo) -> Result<BTreeSet<String>, GitBakError> {
        Ok(self.vcs.remote_list(&repo.path)?.into_iter().collect())
    }

    /// Ask the backend whether the repo exists there. Read-only.
    pub fn probe(&self, repo: &LocalRepo, desired: &DesiredRemote) -> ProbeOutcome {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("checking {}", self.describe(repo, desired)));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let outcome = match desired {
            DesiredRemote::Ssh { host } => self.ssh.probe(&self.ssh_target(repo, host)),
            DesiredRemote::Hosted => match self.hosted {
                Some(service) => service.probe(&repo.name),
                None => ProbeOutcome::Unknown("no hosted service configured".into()),
            },
        };

        spinner.finish_and_clear();
        tracing::debug!("probe {}: {:?}", self.describe(repo, desired), outcome);
        outcome
    }

    /// Add an existing target as a local remote. No data is transferred.
    pub fn attach(&self, repo: &LocalRepo, desired: &DesiredRemote) -> Result<String, GitBakError> {
        let url = match desired {
            DesiredRemote::Ssh { host } => self.ssh_target(repo, host).url(),
            DesiredRemote::Hosted => self.service()?.ssh_url(&repo.name)?,
        };
        self.vcs
            .remote_add(&repo.path, desired.remote_name(), &url)?;
        tracing::info!("{}: added remote {} -> {url}", repo.name, desired.remote_name());
        Ok(url)
    }

    /// Create the repo on the target, attach it, and push all branches.
    pub fn create(
        &self,
        repo: &LocalRepo,
        desired: &DesiredRemote,
        visibility: Option<Visibility>,
    ) -> Result<String, GitBakError> {
        let name = desired.remote_name();
        let url = match desired {
            DesiredRemote::Ssh { host } => {
                let target = self.ssh_target(repo, host);
                self.ssh.create_bare(&target)?;
                self.vcs.remote_add(&repo.path, name, &target.url())?;
                target.url()
            }
            DesiredRemote::Hosted => {
                let service = self.service()?;
                let visibility = visibility.unwrap_or(Visibility::Private);
                service.create(&repo.name, visibility, &repo.path, name)?;
                let url = service.ssh_url(&repo.name)?;
                if !self.existing(repo)?.contains(name) {
                    self.vcs.remote_add(&repo.path, name, &url)?;
                }
                url
            }
        };
        self.vcs.push_all(&repo.path, name)?;
        tracing::info!("{}: created {url} and pushed all branches", repo.name);
        Ok(url)
    }

    fn service(&self) -> Result<&'a dyn HostedService, GitBakError> {
        self.hosted.ok_or_else(|| GitBakError::SubprocessFailure {
            command: "hosted service".into(),
            message: "no hosted service configured".into(),
        })
    }

    fn probe_failed(&self, repo: &LocalRepo, desired: &DesiredRemote, message: String) -> TargetOutcome {
        TargetOutcome::Failed(GitBakError::RemoteProbeFailed {
            target: self.describe(repo, desired),
            message,
        })
    }

    fn report(&self, repo: &LocalRepo, desired: &DesiredRemote, outcome: TargetOutcome) -> TargetReport {
        TargetReport {
            remote: desired.remote_name().to_string(),
            target: self.describe(repo, desired),
            outcome,
        }
    }

    /// Attach every desired remote that exists on its target but not locally.
    /// Missing targets are left absent. Idempotent.
    pub fn add_remotes(
        &self,
        repo: &LocalRepo,
        config: &BackupConfig,
    ) -> Result<ReconcileReport, GitBakError> {
        let existing = self.existing(repo)?;
        let mut report = ReconcileReport {
            repo: repo.name.clone(),
            ..Default::default()
        };

        for desired in self.desired(config) {
            let outcome = if existing.contains(desired.remote_name()) {
                TargetOutcome::AlreadyAttached
            } else {
                match self.probe(repo, &desired) {
                    ProbeOutcome::Present => match self.attach(repo, &desired) {
                        Ok(url) => TargetOutcome::Attached { url },
                        Err(e) => TargetOutcome::Failed(e),
                    },
                    ProbeOutcome::Absent => TargetOutcome::LeftAbsent,
                    ProbeOutcome::Unknown(message) => self.probe_failed(repo, &desired, message),
                }
            };
            report.targets.push(self.report(repo, &desired, outcome));
        }

        Ok(report)
    }

    /// Remove every remote, then `add_remotes`.
    pub fn reset_remotes(
        &self,
        repo: &LocalRepo,
        config: &BackupConfig,
    ) -> Result<ReconcileReport, GitBakError> {
        let mut removed = Vec::new();
        for name in self.existing(repo)? {
            self.vcs.remote_remove(&repo.path, &name)?;
            tracing::info!("{}: removed remote {name}", repo.name);
            removed.push(name);
        }
        let mut report = self.add_remotes(repo, config)?;
        report.removed = removed;
        Ok(report)
    }

    /// Create the remotes selected in `decision`, skipping targets that already exist.
    pub fn create_remotes(
        &self,
        repo: &LocalRepo,
        decision: &PromptDecision,
        config: &BackupConfig,
    ) -> Result<ReconcileReport, GitBakError> {
        let existing = self.existing(repo)?;
        let mut report = ReconcileReport {
            repo: repo.name.clone(),
            ..Default::default()
        };

        let selected = self.desired(config).into_iter().filter(|d| match d {
            DesiredRemote::Ssh { .. } => decision.use_ssh_remotes,
            DesiredRemote::Hosted => decision.use_hosted_remote,
        });

        for desired in selected {
            let attached = existing.contains(desired.remote_name());
            let outcome = match self.probe(repo, &desired) {
                ProbeOutcome::Present if attached => TargetOutcome::SkippedExisting { attached: true },
                ProbeOutcome::Present => match self.attach(repo, &desired) {
                    Ok(_) => TargetOutcome::SkippedExisting { attached: false },
                    Err(e) => TargetOutcome::Failed(e),
                },
                ProbeOutcome::Absent => match self.create(repo, &desired, decision.visibility) {
                    Ok(url) => TargetOutcome::Created { url },
                    Err(e) => TargetOutcome::Failed(e),
                },
                ProbeOutcome::Unknown(message) => self.probe_failed(repo, &desired, message),
            };
            report.targets.push(self.report(repo, &desired, outcome));
        }

        Ok(report)
    }
}
