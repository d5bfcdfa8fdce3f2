use std::collections::BTreeSet;

use comfy_table::{Cell, Color, Table};

use gitbak_core::layout::Layout;
use gitbak_git::Vcs;
use gitbak_registry::{scan_repos_root, TrackingRegistry};

use super::Context;

pub fn run(layout: Layout) -> anyhow::Result<()> {
    let ctx = Context::load(layout)?;
    let tracked = ctx.registry.list_tracked()?;
    let present = scan_repos_root(ctx.layout.repos_root())?;

    let mut table = Table::new();
    table.set_header(vec!["REPO", "STATE"]);

    let all: BTreeSet<&String> = tracked.iter().chain(present.iter()).collect();
    for name in &all {
        let (state, color) = match (tracked.contains(*name), present.contains(*name)) {
            (true, false) => ("missing", Color::Red),
            (false, _) => ("untracked", Color::Yellow),
            (true, true) if !ctx.git.is_work_tree(&ctx.layout.repo(name).path) => {
                ("not a git repo", Color::Red)
            }
            (true, true) => ("tracked", Color::Green),
        };
        table.add_row(vec![Cell::new(name), Cell::new(state).fg(color)]);
    }

    println!("{table}");
    println!("{} tracked, {} in {}", tracked.len(), present.len(), ctx.layout.repos_root().display());
    Ok(())
}
