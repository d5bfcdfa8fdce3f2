use gitbak_core::error::GitBakError;
use gitbak_core::layout::Layout;
use gitbak_core::models::repo::validate_repo_name;
use gitbak_git::Vcs;
use gitbak_host::{GhCli, HostedService};
use gitbak_registry::TrackingRegistry;

use super::Context;
use crate::ui;

pub enum Source {
    Url(String),
    /// One of the user's repos on the hosted service.
    Hosted,
}

/// Clone into `<root>/<name>`, track it, then rebuild its remotes from config.
pub fn run(name: &str, source: Source, layout: Layout) -> anyhow::Result<()> {
    validate_repo_name(name)?;
    let ctx = Context::load(layout)?;
    let repo = ctx.layout.repo(name);
    if repo.path.exists() {
        anyhow::bail!(GitBakError::AlreadyExists { path: repo.path });
    }

    match source {
        Source::Url(url) => Vcs::clone_into(&ctx.git, &url, &repo.path)?,
        Source::Hosted => HostedService::clone_into(&GhCli::new(), name, &repo.path)?,
    }

    if ctx.registry.mark_tracked(name)? {
        ui::success(&format!("Now tracking {name}"));
    }

    let report = ctx.reconciler().reset_remotes(&repo, &ctx.config)?;
    super::finish(&report)
}
