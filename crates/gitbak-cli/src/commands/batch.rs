use comfy_table::{Cell, Color, Table};

use gitbak_core::layout::Layout;
use gitbak_sync::engine::{BatchOp, BatchRunner, BatchSummary};

use super::Context;

pub enum Op {
    Fetch,
    Status,
    Push,
    Foreach(String),
}

impl From<Op> for BatchOp {
    fn from(op: Op) -> Self {
        match op {
            Op::Fetch => BatchOp::FetchAll,
            Op::Status => BatchOp::Status,
            Op::Push => BatchOp::PushAll,
            Op::Foreach(cmd) => BatchOp::Shell(cmd),
        }
    }
}

pub fn run(op: Op, layout: Layout) -> anyhow::Result<()> {
    let ctx = Context::load(layout)?;
    let runner = BatchRunner::new(&ctx.layout, &ctx.git, &ctx.registry);

    let op = BatchOp::from(op);
    let mut stdout = std::io::stdout();
    let summary = runner.run(&op, &mut stdout)?;

    println!("{}", summary_table(&summary));
    println!(
        "{}: {} ok | {} failed | {} skipped",
        op.label(),
        summary.succeeded(),
        summary.failed(),
        summary.skipped.len()
    );

    if summary.failed() > 0 {
        anyhow::bail!("{} failed in {} repo(s)", op.label(), summary.failed());
    }
    Ok(())
}

fn summary_table(summary: &BatchSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["REPO", "RESULT"]);
    for result in &summary.results {
        let cell = match &result.result {
            Ok(()) => Cell::new("ok").fg(Color::Green),
            Err(e) => Cell::new(e.to_string()).fg(Color::Red),
        };
        table.add_row(vec![Cell::new(&result.repo), cell]);
    }
    for reason in &summary.skipped {
        table.add_row(vec![
            Cell::new(skipped_name(reason)),
            Cell::new(format!("skipped: {reason}")).fg(Color::Yellow),
        ]);
    }
    table
}

fn skipped_name(reason: &gitbak_core::error::GitBakError) -> String {
    use gitbak_core::error::GitBakError::*;
    match reason {
        RepoPathMissing { name, .. } | NotAGitRepo { name, .. } => name.clone(),
        _ => String::new(),
    }
}
