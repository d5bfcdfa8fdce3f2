use std::path::Path;
use std::process::Command;

use gitbak_core::error::GitBakError;

/// Captured result of a subprocess.
#[derive(Debug)]
pub struct CmdOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CmdOutput {
    /// Turn a non-zero exit into `SubprocessFailure`, keeping stdout on success.
    pub fn ok_or_failure(self, program: &str, args: &[&str]) -> Result<String, GitBakError> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(GitBakError::SubprocessFailure {
                command: describe(program, args),
                message: self.stderr.trim().to_string(),
            })
        }
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

fn command(program: &str, args: &[&str], dir: Option<&Path>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// Run a command and capture its output.
pub fn run_captured(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
) -> Result<CmdOutput, GitBakError> {
    tracing::debug!(dir = ?dir, "running {}", describe(program, args));
    let output = command(program, args, dir)
        .output()
        .map_err(|e| GitBakError::SubprocessFailure {
            command: describe(program, args),
            message: e.to_string(),
        })?;

    Ok(CmdOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Run a command attached to the terminal so progress stays visible.
pub fn run_inherited(program: &str, args: &[&str], dir: Option<&Path>) -> Result<(), GitBakError> {
    tracing::debug!(dir = ?dir, "running {} (attached)", describe(program, args));
    let status = command(program, args, dir)
        .status()
        .map_err(|e| GitBakError::SubprocessFailure {
            command: describe(program, args),
            message: e.to_string(),
        })?;

    if !status.success() {
        return Err(GitBakError::SubprocessFailure {
            command: describe(program, args),
            message: match status.code() {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            },
        });
    }
    Ok(())
}

/// Run `cmd` through `bash -c` with `dir` as working directory.
pub fn shell(dir: &Path, cmd: &str) -> Result<(), GitBakError> {
    run_inherited("bash", &["-c", cmd], Some(dir))
}
