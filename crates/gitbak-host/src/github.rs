use std::path::Path;

use serde::Deserialize;

use gitbak_core::error::GitBakError;
use gitbak_core::models::decision::Visibility;
use gitbak_core::models::remote::ProbeOutcome;
use gitbak_git::process::{run_captured, run_inherited, CmdOutput};

use crate::HostedService;

/// `HostedService` for GitHub, driven through the `gh` CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct GhCli;

impl GhCli {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct GhRepoView {
    #[serde(rename = "sshUrl")]
    ssh_url: String,
}

/// Map a finished `gh repo view` to a probe outcome.
pub fn classify_repo_view(out: &CmdOutput) -> ProbeOutcome {
    if out.success {
        ProbeOutcome::Present
    } else if out.stderr.contains("Could not resolve to a Repository") {
        ProbeOutcome::Absent
    } else {
        ProbeOutcome::Unknown(out.stderr.trim().to_string())
    }
}

fn parse_ssh_url(json: &str) -> Result<String, GitBakError> {
    let view: GhRepoView =
        serde_json::from_str(json).map_err(|e| GitBakError::Serialization(e.to_string()))?;
    Ok(view.ssh_url)
}

impl HostedService for GhCli {
    fn label(&self) -> &str {
        "GitHub"
    }

    fn probe(&self, repo: &str) -> ProbeOutcome {
        match run_captured("gh", &["repo", "view", repo, "--json", "name"], None) {
            Ok(out) => classify_repo_view(&out),
            Err(e) => ProbeOutcome::Unknown(e.to_string()),
        }
    }

    fn ssh_url(&self, repo: &str) -> Result<String, GitBakError> {
        let args = ["repo", "view", repo, "--json", "sshUrl"];
        let stdout = run_captured("gh", &args, None)?.ok_or_failure("gh", &args)?;
        parse_ssh_url(&stdout)
    }

    fn create(
        &self,
        repo: &str,
        visibility: Visibility,
        source: &Path,
        remote_name: &str,
    ) -> Result<(), GitBakError> {
        let visibility = format!("--{visibility}");
        let remote = format!("--remote={remote_name}");
        let args = [
            "repo",
            "create",
            repo,
            visibility.as_str(),
            "--source=.",
            remote.as_str(),
        ];
        let out = run_captured("gh", &args, Some(source))?;
        if !out.success && out.stderr.contains("already exists") {
            return Err(GitBakError::RemoteCreationConflict {
                target: format!("{} repository {repo}", self.label()),
            });
        }
        out.ok_or_failure("gh", &args)?;
        tracing::info!("created {repo} on {}", self.label());
        Ok(())
    }

    fn clone_into(&self, repo: &str, dest: &Path) -> Result<(), GitBakError> {
        let dest = dest.to_string_lossy();
        run_inherited("gh", &["repo", "clone", repo, &dest], None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(success: bool, stderr: &str) -> CmdOutput {
        CmdOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success,
        }
    }

    #[test]
    fn test_classify_repo_view() {
        assert_eq!(classify_repo_view(&out(true, "")), ProbeOutcome::Present);
        assert_eq!(
            classify_repo_view(&out(
                false,
                "GraphQL: Could not resolve to a Repository with the name 'me/x'. (repository)"
            )),
            ProbeOutcome::Absent
        );
        assert!(matches!(
            classify_repo_view(&out(false, "error connecting to api.github.com")),
            ProbeOutcome::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_ssh_url() {
        let url = parse_ssh_url(r#"{"sshUrl":"git@github.com:me/dotfiles.git"}"#).unwrap();
        assert_eq!(url, "git@github.com:me/dotfiles.git");
        assert!(parse_ssh_url("not json").is_err());
    }
}
