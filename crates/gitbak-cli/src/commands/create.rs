use gitbak_core::error::GitBakError;
use gitbak_core::layout::Layout;
use gitbak_registry::TrackingRegistry;
use gitbak_sync::prompt::RemotePrompt;

use super::Context;
use crate::ui;

/// `create` when `remote_only` is false, `create-on-remote` otherwise.
pub fn run(name: &str, layout: Layout, remote_only: bool) -> anyhow::Result<()> {
    let ctx = Context::load(layout)?;
    let repo = ctx.existing_repo(name)?;
    let tracked = ctx.registry.is_tracked(name)?;

    if remote_only && !tracked {
        anyhow::bail!(GitBakError::NotTracked {
            name: name.to_string()
        });
    }
    if !remote_only && tracked {
        let notice = GitBakError::AlreadyTracked {
            name: name.to_string(),
        };
        ui::warn(&notice.to_string());
    }

    // nothing is tracked or created unless the prompt is confirmed
    let Some(decision) = RemotePrompt::new(name, &ctx.config).run(&mut ui::TerminalPrompter) else {
        ui::notice(&GitBakError::AbortedByUser.to_string());
        return Ok(());
    };

    if !remote_only && ctx.registry.mark_tracked(name)? {
        ui::success(&format!("Now tracking {name}"));
    }

    let report = ctx.reconciler().create_remotes(&repo, &decision, &ctx.config)?;
    super::finish(&report)
}
