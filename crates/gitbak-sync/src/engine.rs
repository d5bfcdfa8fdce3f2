use std::io::Write;

use console::style;

use gitbak_core::error::GitBakError;
use gitbak_core::layout::Layout;
use gitbak_core::models::repo::LocalRepo;
use gitbak_git::process;
use gitbak_git::Vcs;
use gitbak_registry::{reconcile_with_filesystem, scan_repos_root, DriftReport, TrackingRegistry};

/// An operation applied to every tracked repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    FetchAll,
    /// Push all branches to every configured remote of the repo.
    PushAll,
    Status,
    /// Arbitrary command run through `bash -c` in the repo directory.
    Shell(String),
}

impl BatchOp {
    pub fn label(&self) -> String {
        match self {
            BatchOp::FetchAll => "fetch".into(),
            BatchOp::PushAll => "push".into(),
            BatchOp::Status => "status".into(),
            BatchOp::Shell(cmd) => format!("foreach: {cmd}"),
        }
    }

    pub fn apply(&self, vcs: &dyn Vcs, repo: &LocalRepo) -> Result<(), GitBakError> {
        match self {
            BatchOp::FetchAll => vcs.fetch_all(&repo.path),
            BatchOp::Status => vcs.status(&repo.path),
            BatchOp::Shell(cmd) => process::shell(&repo.path, cmd),
            BatchOp::PushAll => {
                let remotes = vcs.remote_list(&repo.path)?;
                if remotes.is_empty() {
                    tracing::warn!("{} has no remotes; try `git-backup add-remotes {}`", repo, repo);
                }
                let mut failed = Vec::new();
                for remote in remotes {
                    if let Err(e) = vcs.push_all(&repo.path, &remote) {
                        tracing::error!("{repo}: push to {remote} failed: {e}");
                        failed.push(remote);
                    }
                }
                if failed.is_empty() {
                    Ok(())
                } else {
                    Err(GitBakError::SubprocessFailure {
                        command: "git push --all".into(),
                        message: format!("failed for remote(s) {}", failed.join(", ")),
                    })
                }
            }
        }
    }
}

/// Outcome of a batch operation on one repository.
#[derive(Debug)]
pub struct RepoResult {
    pub repo: String,
    pub result: Result<(), GitBakError>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Tracked repos that could not be visited.
    pub skipped: Vec<GitBakError>,
    pub results: Vec<RepoResult>,
    /// `None` when the drift check itself failed.
    pub drift: Option<DriftReport>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Runs operations sequentially across the tracked repositories.
pub struct BatchRunner<'a> {
    layout: &'a Layout,
    vcs: &'a dyn Vcs,
    registry: &'a dyn TrackingRegistry,
}

impl<'a> BatchRunner<'a> {
    pub fn new(layout: &'a Layout, vcs: &'a dyn Vcs, registry: &'a dyn TrackingRegistry) -> Self {
        Self {
            layout,
            vcs,
            registry,
        }
    }

    /// Tracked repos that exist and are working trees, sorted by name, plus the reasons the
    /// others were skipped.
    pub fn select_repos(&self) -> Result<(Vec<LocalRepo>, Vec<GitBakError>), GitBakError> {
        let mut repos = Vec::new();
        let mut skipped = Vec::new();
        for name in self.registry.list_tracked()? {
            let repo = self.layout.repo(&name);
            if !repo.path.is_dir() {
                skipped.push(GitBakError::RepoPathMissing {
                    name,
                    path: repo.path,
                });
            } else if !self.vcs.is_work_tree(&repo.path) {
                skipped.push(GitBakError::NotAGitRepo {
                    name,
                    path: repo.path,
                });
            } else {
                repos.push(repo);
            }
        }
        Ok((repos, skipped))
    }

    /// Visit every selected repo with `f`, printing a header before and a blank line after each.
    /// Failures are reported inline and do not stop the loop. The drift check runs last.
    pub fn run_for_each<F>(
        &self,
        out: &mut dyn Write,
        mut f: F,
    ) -> Result<BatchSummary, GitBakError>
    where
        F: FnMut(&LocalRepo) -> Result<(), GitBakError>,
    {
        let (repos, skipped) = self.select_repos()?;
        for reason in &skipped {
            writeln!(out, "{}", style(format!("Skipping: {reason}")).yellow())?;
        }

        let mut results = Vec::new();
        for repo in repos {
            writeln!(out, "{}", style(format!("==> {}", repo.name)).green().bold())?;
            let result = f(&repo);
            if let Err(e) = &result {
                writeln!(out, "{}", style(format!("{}: {e}", repo.name)).red())?;
            }
            writeln!(out)?;
            results.push(RepoResult {
                repo: repo.name,
                result,
            });
        }

        let drift = match self.drift() {
            Ok(report) => {
                write_drift(out, &report)?;
                Some(report)
            }
            Err(e) => {
                tracing::warn!("drift check failed: {e}");
                None
            }
        };

        Ok(BatchSummary {
            skipped,
            results,
            drift,
        })
    }

    pub fn run(&self, op: &BatchOp, out: &mut dyn Write) -> Result<BatchSummary, GitBakError> {
        tracing::debug!("batch {}", op.label());
        self.run_for_each(out, |repo| op.apply(self.vcs, repo))
    }

    pub fn drift(&self) -> Result<DriftReport, GitBakError> {
        let tracked = self.registry.list_tracked()?;
        let present = scan_repos_root(self.layout.repos_root())?;
        Ok(reconcile_with_filesystem(&tracked, &present))
    }
}

/// Print drift warnings with suggested follow-ups. Prints nothing when clean.
pub fn write_drift(out: &mut dyn Write, report: &DriftReport) -> std::io::Result<()> {
    if !report.tracked_but_missing.is_empty() {
        writeln!(
            out,
            "{}",
            style("Tracked repositories missing from the repos root:").yellow()
        )?;
        for name in &report.tracked_but_missing {
            writeln!(
                out,
                "  {name}  (restore with `git-backup clone-url {name} <url>` or `git-backup clone-gh {name}`)"
            )?;
        }
    }
    if !report.present_but_untracked.is_empty() {
        writeln!(out, "{}", style("Untracked repositories in the repos root:").yellow())?;
        for name in &report.present_but_untracked {
            writeln!(out, "  {name}  (track with `git-backup create {name}`)")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitbak_git::MemoryGit;
    use gitbak_registry::MemoryRegistry;

    struct Fixture {
        _dir: tempfile::TempDir,
        layout: Layout,
        git: MemoryGit,
    }

    /// Creates a repos root with `repos` as git working trees and `plain` as plain directories.
    fn fixture(repos: &[&str], plain: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path().join("repos"));
        let git = MemoryGit::new();
        for name in repos {
            let path = layout.repo(name).path;
            std::fs::create_dir_all(&path).unwrap();
            git.add_work_tree(&path);
        }
        for name in plain {
            std::fs::create_dir_all(layout.repo(name).path).unwrap();
        }
        std::fs::create_dir_all(layout.repos_root()).unwrap();
        Fixture {
            _dir: dir,
            layout,
            git,
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_skips_missing_and_non_git() {
        let f = fixture(&["a"], &["notgit"]);
        let registry = MemoryRegistry::with_names(["a", "gone", "notgit"]);
        let runner = BatchRunner::new(&f.layout, &f.git, &registry);

        let (repos, skipped) = runner.select_repos().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "a");
        assert!(matches!(skipped[0], GitBakError::RepoPathMissing { ref name, .. } if name == "gone"));
        assert!(matches!(skipped[1], GitBakError::NotAGitRepo { ref name, .. } if name == "notgit"));
    }

    #[test]
    fn test_visits_in_name_order_and_continues_past_failures() {
        let f = fixture(&["c", "a", "b"], &[]);
        f.git.fail_in(&f.layout.repo("b").path);
        let registry = MemoryRegistry::with_names(["c", "b", "a"]);
        let runner = BatchRunner::new(&f.layout, &f.git, &registry);

        let mut out = Vec::new();
        let summary = runner.run(&BatchOp::FetchAll, &mut out).unwrap();

        let visited: Vec<&str> = summary.results.iter().map(|r| r.repo.as_str()).collect();
        assert_eq!(visited, vec!["a", "b", "c"]);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(f.git.calls().len(), 3);

        let text = output(out);
        assert!(text.contains("==> a"));
        assert!(text.find("==> a").unwrap() < text.find("==> c").unwrap());
    }

    #[test]
    fn test_push_all_pushes_every_remote() {
        let f = fixture(&["a"], &[]);
        let path = f.layout.repo("a").path;
        f.git.seed_remote(&path, "nas", "nas:repos/a.git");
        f.git.seed_remote(&path, "github", "git@github.test:me/a.git");
        let registry = MemoryRegistry::with_names(["a"]);

        let mut out = Vec::new();
        let summary = BatchRunner::new(&f.layout, &f.git, &registry)
            .run(&BatchOp::PushAll, &mut out)
            .unwrap();

        assert_eq!(summary.failed(), 0);
        let pushes: Vec<String> = f
            .git
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("push"))
            .collect();
        assert_eq!(pushes.len(), 2);
        assert!(pushes[0].ends_with("github"));
        assert!(pushes[1].ends_with("nas"));
    }

    #[test]
    fn test_drift_reported_after_batch() {
        let f = fixture(&["b", "c"], &[]);
        let registry = MemoryRegistry::with_names(["a", "b"]);
        let runner = BatchRunner::new(&f.layout, &f.git, &registry);

        let mut out = Vec::new();
        let summary = runner.run(&BatchOp::Status, &mut out).unwrap();

        let drift = summary.drift.unwrap();
        assert!(drift.tracked_but_missing.contains("a"));
        assert!(drift.present_but_untracked.contains("c"));
        assert_eq!(summary.skipped.len(), 1);

        let text = output(out);
        assert!(text.contains("git-backup clone-gh a"));
        assert!(text.contains("git-backup create c"));
    }

    #[test]
    fn test_clean_drift_prints_nothing() {
        let mut out = Vec::new();
        write_drift(&mut out, &DriftReport::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_for_each_custom_closure() {
        let f = fixture(&["a", "b"], &[]);
        let registry = MemoryRegistry::with_names(["a", "b"]);
        let mut seen = Vec::new();
        let mut out = Vec::new();
        BatchRunner::new(&f.layout, &f.git, &registry)
            .run_for_each(&mut out, |repo| {
                seen.push(repo.name.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec!["a", "b"]);
    }
}
