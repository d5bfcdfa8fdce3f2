mod commands;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use gitbak_core::layout::Layout;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "git-backup",
    version,
    about = "Track local git repos and back them up to SSH hosts and GitHub"
)]
struct Cli {
    /// Directory holding your repositories [default: ~/repos]
    #[arg(long, global = true, env = "GIT_BACKUP_REPOS_ROOT")]
    repos_root: Option<PathBuf>,

    /// Show debug logging, including every subprocess invocation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .without_time()
        .with_target(false)
        .init();

    let layout = match cli.repos_root {
        Some(root) => Layout::new(root),
        None => Layout::from_home()?,
    };
    commands::run(cli.command, layout)
}
