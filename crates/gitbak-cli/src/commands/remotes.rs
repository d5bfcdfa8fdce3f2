use gitbak_core::layout::Layout;

use super::Context;

/// `reset-remotes` when `reset` is true, `add-remotes` otherwise.
pub fn run(name: &str, layout: Layout, reset: bool) -> anyhow::Result<()> {
    let ctx = Context::load(layout)?;
    let repo = ctx.existing_repo(name)?;
    let reconciler = ctx.reconciler();

    let report = if reset {
        reconciler.reset_remotes(&repo, &ctx.config)?
    } else {
        reconciler.add_remotes(&repo, &ctx.config)?
    };
    super::finish(&report)
}
