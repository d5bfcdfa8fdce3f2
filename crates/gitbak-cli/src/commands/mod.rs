pub mod batch;
pub mod clone;
pub mod create;
pub mod init;
pub mod list;
pub mod remotes;
pub mod update;

use clap::Subcommand;

use gitbak_core::config::BackupConfig;
use gitbak_core::layout::Layout;
use gitbak_core::models::repo::LocalRepo;
use gitbak_git::{SystemGit, Vcs};
use gitbak_host::{create_hosted_service, GhCli, HostedService, OpenSsh};
use gitbak_registry::MarkerDirRegistry;
use gitbak_sync::remotes::{ReconcileReport, RemoteReconciler};

use crate::ui;

#[derive(Subcommand)]
pub enum Command {
    /// Create the tracking repository and first-time config
    Init(init::InitArgs),
    /// Fetch all remotes of every tracked repo
    Fetch,
    /// Show git status of every tracked repo
    Status,
    /// Push all branches of every tracked repo to all of its remotes
    Push,
    /// Pull the tracking repo and report untracked or missing repos
    Update,
    /// List tracked and untracked repos under the repos root
    List,
    /// Track a local repo and create it on the configured remotes
    Create {
        /// Directory name under the repos root
        repo: String,
    },
    /// Create an already tracked repo on the configured remotes
    CreateOnRemote {
        repo: String,
    },
    /// Remove every remote of a repo, then add the configured ones that exist
    ResetRemotes {
        repo: String,
    },
    /// Add configured remotes that exist but are not yet set up
    AddRemotes {
        repo: String,
    },
    /// Clone a repo from a URL into the repos root and track it
    CloneUrl {
        repo: String,
        url: String,
    },
    /// Clone one of your GitHub repos into the repos root and track it
    CloneGh {
        repo: String,
    },
    /// Run a shell command in every tracked repo
    Foreach {
        /// Command passed to `bash -c`, so bash syntax such as `[[ ]]` works
        command: String,
    },
}

pub fn run(cmd: Command, layout: Layout) -> anyhow::Result<()> {
    match cmd {
        Command::Init(args) => init::run(args, layout),
        Command::Fetch => batch::run(batch::Op::Fetch, layout),
        Command::Status => batch::run(batch::Op::Status, layout),
        Command::Push => batch::run(batch::Op::Push, layout),
        Command::Foreach { command } => batch::run(batch::Op::Foreach(command), layout),
        Command::Update => update::run(layout),
        Command::List => list::run(layout),
        Command::Create { repo } => create::run(&repo, layout, false),
        Command::CreateOnRemote { repo } => create::run(&repo, layout, true),
        Command::ResetRemotes { repo } => remotes::run(&repo, layout, true),
        Command::AddRemotes { repo } => remotes::run(&repo, layout, false),
        Command::CloneUrl { repo, url } => clone::run(&repo, clone::Source::Url(url), layout),
        Command::CloneGh { repo } => clone::run(&repo, clone::Source::Hosted, layout),
    }
}

static SYSTEM_GIT: SystemGit = SystemGit;

/// Everything a command needs once initialisation has been verified.
pub struct Context {
    pub layout: Layout,
    pub config: BackupConfig,
    pub registry: MarkerDirRegistry<'static>,
    pub git: SystemGit,
    pub ssh: OpenSsh,
    pub hosted: Option<GhCli>,
}

impl Context {
    /// Check the tracking repo and config, then load the config.
    pub fn load(layout: Layout) -> anyhow::Result<Self> {
        let registry = MarkerDirRegistry::open(&layout, &SYSTEM_GIT)?;
        let config = BackupConfig::load_from(&layout.config_path())?;
        if !config.config_confirmed {
            tracing::warn!(
                "config_is_ready is false in {}; review the config",
                layout.config_path().display()
            );
        }
        let hosted = create_hosted_service(config.enable_hosted_remote);
        Ok(Self {
            layout,
            config,
            registry,
            git: SYSTEM_GIT,
            ssh: OpenSsh::new(),
            hosted,
        })
    }

    pub fn reconciler(&self) -> RemoteReconciler<'_> {
        let hosted = self.hosted.as_ref().map(|h| h as &dyn HostedService);
        RemoteReconciler::new(&self.layout, &self.git, &self.ssh, hosted)
    }

    /// The repo directory must exist and be a git working tree.
    pub fn existing_repo(&self, name: &str) -> anyhow::Result<LocalRepo> {
        gitbak_core::models::repo::validate_repo_name(name)?;
        let repo = self.layout.repo(name);
        if !repo.path.is_dir() {
            anyhow::bail!(gitbak_core::error::GitBakError::RepoPathMissing {
                name: repo.name,
                path: repo.path,
            });
        }
        if !self.git.is_work_tree(&repo.path) {
            anyhow::bail!(gitbak_core::error::GitBakError::NotAGitRepo {
                name: repo.name,
                path: repo.path,
            });
        }
        Ok(repo)
    }
}

/// Print the report and turn target failures into a non-zero exit.
pub fn finish(report: &ReconcileReport) -> anyhow::Result<()> {
    ui::print_reconcile(report);
    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{failed} remote(s) of {} failed", report.repo);
    }
    Ok(())
}
