use gitbak_core::layout::Layout;
use gitbak_git::Vcs;
use gitbak_sync::engine::{write_drift, BatchRunner};

use super::Context;
use crate::ui;

pub fn run(layout: Layout) -> anyhow::Result<()> {
    let ctx = Context::load(layout)?;
    let tracking = ctx.layout.tracking_repo_path();

    if let Err(e) = ctx.git.pull_ff_only(&tracking) {
        ui::warn(&format!(
            "could not pull {}: {e}\nIf no upstream is set, run `git branch --set-upstream-to=<remote>/<branch>` there.",
            tracking.display()
        ));
    }

    let drift = BatchRunner::new(&ctx.layout, &ctx.git, &ctx.registry).drift()?;
    if drift.is_clean() {
        println!("All repositories under {} are tracked.", ctx.layout.repos_root().display());
    } else {
        write_drift(&mut std::io::stdout(), &drift)?;
    }
    Ok(())
}
