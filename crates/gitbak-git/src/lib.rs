pub mod git_ops;
pub mod memory;
pub mod process;

pub use memory::MemoryGit;

use std::path::Path;

use gitbak_core::error::GitBakError;

/// The version-control operations git-backup depends on.
pub trait Vcs {
    fn is_work_tree(&self, path: &Path) -> bool;

    fn init(&self, dir: &Path) -> Result<(), GitBakError>;

    fn add(&self, dir: &Path, pathspec: &str) -> Result<(), GitBakError>;

    fn commit(&self, dir: &Path, message: &str) -> Result<(), GitBakError>;

    fn remote_list(&self, dir: &Path) -> Result<Vec<String>, GitBakError>;

    fn remote_add(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitBakError>;

    fn remote_remove(&self, dir: &Path, name: &str) -> Result<(), GitBakError>;

    /// Push all branches to `remote`.
    fn push_all(&self, dir: &Path, remote: &str) -> Result<(), GitBakError>;

    fn fetch_all(&self, dir: &Path) -> Result<(), GitBakError>;

    fn status(&self, dir: &Path) -> Result<(), GitBakError>;

    fn pull_ff_only(&self, dir: &Path) -> Result<(), GitBakError>;

    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), GitBakError>;
}

/// `Vcs` backed by the `git` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl Vcs for SystemGit {
    fn is_work_tree(&self, path: &Path) -> bool {
        git_ops::is_git_repo(path)
    }

    fn init(&self, dir: &Path) -> Result<(), GitBakError> {
        git_ops::init(dir)
    }

    fn add(&self, dir: &Path, pathspec: &str) -> Result<(), GitBakError> {
        git_ops::add(dir, pathspec)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<(), GitBakError> {
        git_ops::commit(dir, message)
    }

    fn remote_list(&self, dir: &Path) -> Result<Vec<String>, GitBakError> {
        git_ops::remote_list(dir)
    }

    fn remote_add(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitBakError> {
        git_ops::remote_add(dir, name, url)
    }

    fn remote_remove(&self, dir: &Path, name: &str) -> Result<(), GitBakError> {
        git_ops::remote_remove(dir, name)
    }

    fn push_all(&self, dir: &Path, remote: &str) -> Result<(), GitBakError> {
        git_ops::push_all(dir, remote)
    }

    fn fetch_all(&self, dir: &Path) -> Result<(), GitBakError> {
        git_ops::fetch_all(dir)
    }

    fn status(&self, dir: &Path) -> Result<(), GitBakError> {
        git_ops::status(dir)
    }

    fn pull_ff_only(&self, dir: &Path) -> Result<(), GitBakError> {
        git_ops::pull_ff_only(dir)
    }

    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), GitBakError> {
        git_ops::clone(url, dest)
    }
}
