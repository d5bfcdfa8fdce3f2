use gitbak_core::config::BackupConfig;
use gitbak_core::models::decision::{PromptDecision, Visibility};

/// Terminal access for the remote-creation prompt.
pub trait Prompter {
    fn say(&mut self, message: &str);

    /// Read one line. `None` means the input was cancelled.
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// States of the remote-creation prompt.
///
/// ```text
/// Start -> PromptSsh -> PromptHosted -> PromptVisibility -> Confirmed
///              |             |                 |
///              +-------------+-----------------+----------> Aborted
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Start,
    PromptSsh,
    PromptHosted { use_ssh: bool },
    PromptVisibility { use_ssh: bool },
    Confirmed(PromptDecision),
    Aborted,
}

impl PromptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptState::Confirmed(_) | PromptState::Aborted)
    }
}

/// `Some(true)` for yes, `Some(false)` for no, `None` for cancel or anything unrecognised.
fn parse_yes_no(answer: Option<String>) -> Option<bool> {
    match answer?.trim().to_uppercase().as_str() {
        "Y" | "YES" => Some(true),
        "N" | "NO" => Some(false),
        _ => None,
    }
}

/// Asks which remotes to create for one repository.
pub struct RemotePrompt<'a> {
    repo: &'a str,
    config: &'a BackupConfig,
}

impl<'a> RemotePrompt<'a> {
    pub fn new(repo: &'a str, config: &'a BackupConfig) -> Self {
        Self { repo, config }
    }

    /// Advance one transition. Terminal states map to themselves.
    pub fn step(&self, state: PromptState, prompter: &mut dyn Prompter) -> PromptState {
        match state {
            PromptState::Start => {
                prompter.say(&format!("Create repository \"{}\".", self.repo));
                PromptState::PromptSsh
            }
            PromptState::PromptSsh => {
                let hosts = &self.config.ssh_remote_hosts;
                if hosts.is_empty() {
                    prompter.say("Skipping SSH remote setup as none are configured.");
                    return PromptState::PromptHosted { use_ssh: false };
                }
                let listing: String = hosts.iter().map(|h| format!("\n - {h}")).collect();
                prompter.say(&format!(
                    "Setting up SSH remotes for \"{}\":{listing}",
                    self.repo
                ));
                match parse_yes_no(prompter.ask("Continue? [Yes/Cancel]")) {
                    Some(true) => PromptState::PromptHosted { use_ssh: true },
                    _ => PromptState::Aborted,
                }
            }
            PromptState::PromptHosted { use_ssh } => {
                if !self.config.enable_hosted_remote {
                    prompter.say("Skipping GitHub remote setup because it is disabled in config.");
                    return PromptState::Confirmed(PromptDecision {
                        use_ssh_remotes: use_ssh,
                        use_hosted_remote: false,
                        visibility: None,
                    });
                }
                match parse_yes_no(
                    prompter.ask("Also create GitHub repository using gh? [Yes/No/Cancel]"),
                ) {
                    Some(true) => PromptState::PromptVisibility { use_ssh },
                    Some(false) => PromptState::Confirmed(PromptDecision {
                        use_ssh_remotes: use_ssh,
                        use_hosted_remote: false,
                        visibility: None,
                    }),
                    None => PromptState::Aborted,
                }
            }
            PromptState::PromptVisibility { use_ssh } => {
                let allowed: Vec<String> = Visibility::ALL.iter().map(|v| v.to_string()).collect();
                let question = format!("Enter visibility on GitHub [{}]", allowed.join("/"));
                match prompter
                    .ask(&question)
                    .and_then(|answer| answer.parse::<Visibility>().ok())
                {
                    Some(visibility) => PromptState::Confirmed(PromptDecision {
                        use_ssh_remotes: use_ssh,
                        use_hosted_remote: true,
                        visibility: Some(visibility),
                    }),
                    None => PromptState::Aborted,
                }
            }
            terminal => terminal,
        }
    }

    /// Run to completion. `None` means the user aborted.
    pub fn run(&self, prompter: &mut dyn Prompter) -> Option<PromptDecision> {
        let mut state = PromptState::Start;
        while !state.is_terminal() {
            state = self.step(state, prompter);
        }
        match state {
            PromptState::Confirmed(decision) => Some(decision),
            _ => {
                prompter.say("Aborting remote repo creation.");
                None
            }
        }
    }
}
