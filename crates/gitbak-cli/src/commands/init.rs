use clap::Args;

use gitbak_core::config::BackupConfig;
use gitbak_core::error::GitBakError;
use gitbak_core::layout::Layout;
use gitbak_git::process::run_inherited;
use gitbak_git::{SystemGit, Vcs};
use gitbak_host::{create_hosted_service, HostedService, OpenSsh};
use gitbak_registry::MarkerDirRegistry;
use gitbak_sync::prompt::RemotePrompt;
use gitbak_sync::remotes::RemoteReconciler;

use crate::ui;

const INITIAL_COMMIT_MESSAGE: &str = "Initial commit: git_backup initialisation";

#[derive(Args)]
pub struct InitArgs {
    /// Continue after editing the config written by a previous `init`
    #[arg(long)]
    resume: bool,
}

pub fn run(args: InitArgs, layout: Layout) -> anyhow::Result<()> {
    let git = SystemGit;
    let tracking = layout.tracking_repo_path();
    let config_path = layout.config_path();

    if args.resume {
        if !tracking.is_dir() {
            anyhow::bail!(GitBakError::NotInitialized {
                message: format!(
                    "{} does not exist; run `git-backup init` first",
                    tracking.display()
                ),
            });
        }
        if git.is_work_tree(&tracking) {
            anyhow::bail!(
                "{} is already a git repository; initialisation has completed",
                tracking.display()
            );
        }
    } else {
        if tracking.exists() {
            anyhow::bail!(
                "{} already exists; run `git-backup init --resume` to continue an interrupted init",
                tracking.display()
            );
        }
        std::fs::create_dir_all(layout.repos_root())?;
        BackupConfig::write_template(&config_path)?;
        println!("Wrote config template to {}", config_path.display());

        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
        let path = config_path.to_string_lossy();
        if let Err(e) = run_inherited(&editor, &[&*path], None) {
            ui::warn(&format!("could not open editor: {e}"));
        }
    }

    let config = BackupConfig::load_from(&config_path)?;
    if !config.config_confirmed {
        if args.resume {
            anyhow::bail!(
                "cannot resume initialisation: config was not marked ready; set \
                 `config_is_ready: true` in {}",
                config_path.display()
            );
        }
        println!(
            "Edit {}, set `config_is_ready: true`, then run `git-backup init --resume`.",
            config_path.display()
        );
        return Ok(());
    }

    let repo = layout.tracking_repo();
    let Some(decision) = RemotePrompt::new(&repo.name, &config).run(&mut ui::TerminalPrompter)
    else {
        ui::notice(&GitBakError::AbortedByUser.to_string());
        println!("Resume initialisation by running `git-backup init --resume`.");
        return Ok(());
    };

    git.init(&tracking)?;
    MarkerDirRegistry::create(&layout, &git)?;
    git.add(&tracking, ".")?;
    git.commit(&tracking, INITIAL_COMMIT_MESSAGE)?;
    ui::success(&format!("Initialised tracking repository {}", tracking.display()));

    let ssh = OpenSsh::new();
    let hosted = create_hosted_service(config.enable_hosted_remote);
    let reconciler = RemoteReconciler::new(
        &layout,
        &git,
        &ssh,
        hosted.as_ref().map(|h| h as &dyn HostedService),
    );
    let report = reconciler.create_remotes(&repo, &decision, &config)?;
    super::finish(&report)
}
