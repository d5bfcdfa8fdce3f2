use std::path::Path;

use gitbak_core::error::GitBakError;

use crate::process::{run_captured, run_inherited, CmdOutput};

/// Run a git command in the given directory.
fn git(dir: Option<&Path>, args: &[&str]) -> Result<CmdOutput, GitBakError> {
    run_captured("git", args, dir)
}

/// Run a git command in the given directory, returning an error if it fails.
fn git_ok(dir: &Path, args: &[&str]) -> Result<String, GitBakError> {
    git(Some(dir), args)?.ok_or_failure("git", args)
}

/// Whether `path` is inside a git working tree.
pub fn is_git_repo(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    match git(Some(path), &["rev-parse", "--is-inside-work-tree"]) {
        Ok(out) => out.success && out.stdout.trim() == "true",
        Err(_) => false,
    }
}

pub fn init(dir: &Path) -> Result<(), GitBakError> {
    git_ok(dir, &["init", "."])?;
    Ok(())
}

/// Stage a pathspec.
pub fn add(dir: &Path, pathspec: &str) -> Result<(), GitBakError> {
    git_ok(dir, &["add", pathspec])?;
    Ok(())
}

pub fn commit(dir: &Path, message: &str) -> Result<(), GitBakError> {
    git_ok(dir, &["commit", "-m", message])?;
    Ok(())
}

/// List remote names.
pub fn remote_list(dir: &Path) -> Result<Vec<String>, GitBakError> {
    let stdout = git_ok(dir, &["remote"])?;
    Ok(stdout
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Add a remote. An existing remote of the same name is left alone.
pub fn remote_add(dir: &Path, name: &str, url: &str) -> Result<(), GitBakError> {
    let out = git(Some(dir), &["remote", "add", name, url])?;
    if !out.success {
        if out.stderr.contains("already exists") {
            tracing::debug!("remote {name} already exists in {}", dir.display());
            return Ok(());
        }
        return Err(GitBakError::SubprocessFailure {
            command: format!("git remote add {name} {url}"),
            message: out.stderr.trim().to_string(),
        });
    }
    Ok(())
}

pub fn remote_remove(dir: &Path, name: &str) -> Result<(), GitBakError> {
    git_ok(dir, &["remote", "remove", name])?;
    Ok(())
}

/// Query refs on a remote without fetching anything.
pub fn ls_remote(url: &str, refs: &[&str]) -> Result<CmdOutput, GitBakError> {
    let mut args = vec!["ls-remote", "--heads", url];
    args.extend_from_slice(refs);
    git(None, &args)
}

pub fn fetch_all(dir: &Path) -> Result<(), GitBakError> {
    run_inherited("git", &["fetch", "--all"], Some(dir))
}

pub fn status(dir: &Path) -> Result<(), GitBakError> {
    run_inherited("git", &["status"], Some(dir))
}

/// Push every branch to one remote.
pub fn push_all(dir: &Path, remote: &str) -> Result<(), GitBakError> {
    run_inherited("git", &["push", "--all", remote], Some(dir))
}

pub fn pull_ff_only(dir: &Path) -> Result<(), GitBakError> {
    run_inherited("git", &["pull", "--ff-only"], Some(dir))
}

/// Clone `url` into `dest`.
pub fn clone(url: &str, dest: &Path) -> Result<(), GitBakError> {
    let dest_str = dest.to_string_lossy();
    run_inherited("git", &["clone", url, &dest_str], None)
}
