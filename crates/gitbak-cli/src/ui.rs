use console::style;
use dialoguer::Input;

use gitbak_sync::prompt::Prompter;
use gitbak_sync::remotes::{ReconcileReport, TargetOutcome};

/// `Prompter` reading answers from the terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .ok()
    }
}

pub fn warn(message: &str) {
    eprintln!("{}", style(message).yellow());
}

pub fn notice(message: &str) {
    println!("{}", style(message).cyan());
}

pub fn success(message: &str) {
    println!("{}", style(message).green());
}

/// Print one line per target of a reconcile report.
pub fn print_reconcile(report: &ReconcileReport) {
    for name in &report.removed {
        println!("{}: removed remote {name}", report.repo);
    }
    for target in &report.targets {
        match &target.outcome {
            TargetOutcome::AlreadyAttached => {
                println!("{}: remote {} already set up", report.repo, target.remote)
            }
            TargetOutcome::Attached { url } => {
                success(&format!("{}: added remote {} ({url})", report.repo, target.remote))
            }
            TargetOutcome::Created { url } => {
                success(&format!("{}: created {url} and pushed", report.repo))
            }
            TargetOutcome::SkippedExisting { attached } => {
                let suffix = if *attached { "" } else { "; added it as a remote" };
                notice(&format!("{} already exists, skipping{suffix}", target.target))
            }
            TargetOutcome::LeftAbsent => notice(&format!(
                "{}: {} does not exist; run `git-backup create-on-remote {}` to create it",
                report.repo, target.target, report.repo
            )),
            TargetOutcome::Failed(e) if e.is_notice() => notice(&format!("{e}, skipping")),
            TargetOutcome::Failed(e) => {
                eprintln!("{}", style(format!("{}: {e}", report.repo)).red())
            }
        }
    }
}
