use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

use gitbak_core::config::BackupConfig;
use gitbak_core::layout::Layout;
use gitbak_core::models::decision::{PromptDecision, Visibility};
use gitbak_git::{MemoryGit, Vcs};
use gitbak_host::{HostedService, MemoryHosted, MemorySsh};
use gitbak_registry::{MarkerDirRegistry, TrackingRegistry};
use gitbak_sync::engine::{BatchOp, BatchRunner};
use gitbak_sync::remotes::{RemoteReconciler, TargetOutcome};

fn git_backup(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("git-backup").unwrap();
    cmd.arg("--repos-root").arg(root);
    cmd.env_remove("GIT_BACKUP_REPOS_ROOT");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git_init(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let status = std::process::Command::new("git")
        .args(["init", "--quiet"])
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success());
}

/// A tracking repo with a confirmed, remote-less config. Markers are left uncommitted.
fn initialised_root(tracked: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    git_init(&layout.tracking_repo_path());
    fs::create_dir_all(layout.tracked_dir()).unwrap();
    fs::write(layout.tracked_dir().join("git-backup-tracking"), "").unwrap();
    for name in tracked {
        fs::write(layout.tracked_dir().join(name), "").unwrap();
    }
    fs::write(
        layout.config_path(),
        "gh: false\nssh_remotes: []\nconfig_is_ready: true\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("git-backup")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-on-remote"))
        .stdout(predicate::str::contains("clone-gh"))
        .stdout(predicate::str::contains("--repos-root"));
}

#[test]
fn test_uninitialised_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    git_backup(dir.path())
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("git-backup init"));
}

#[test]
fn test_interrupted_init_suggests_resume() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("git-backup-tracking")).unwrap();
    git_backup(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("init --resume"));
}

#[test]
fn test_init_refuses_existing_tracking_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("git-backup-tracking")).unwrap();
    git_backup(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--resume"));
}

#[test]
fn test_resume_without_init_fails() {
    let dir = tempfile::tempdir().unwrap();
    git_backup(dir.path())
        .args(["init", "--resume"])
        .assert()
        .failure();
}

#[test]
fn test_init_writes_template_and_stops_until_ready() {
    let dir = tempfile::tempdir().unwrap();
    git_backup(dir.path())
        .arg("init")
        .env("EDITOR", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("config_is_ready: true"));

    let config = dir.path().join("git-backup-tracking").join("config.yaml");
    let written = fs::read_to_string(config).unwrap();
    assert!(written.contains("config_is_ready: false"));
    assert!(!dir.path().join("git-backup-tracking").join(".git").exists());
}

#[test]
fn test_resume_with_unready_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    BackupConfig::write_template(&layout.config_path()).unwrap();
    git_backup(dir.path())
        .args(["init", "--resume"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config was not marked ready"));
    assert!(!layout.tracking_repo_path().join(".git").exists());
}

#[test]
fn test_aborted_init_prompt_suggests_resume() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    fs::create_dir_all(layout.tracking_repo_path()).unwrap();
    fs::write(
        layout.config_path(),
        "gh: false\nssh_remotes: [nas]\nconfig_is_ready: true\n",
    )
    .unwrap();

    // no terminal: the SSH confirmation cannot be answered
    git_backup(dir.path())
        .args(["init", "--resume"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("aborted by user"))
        .stdout(predicate::str::contains("git-backup init --resume"));
    assert!(!layout.tracking_repo_path().join(".git").exists());
    assert!(!layout.tracked_dir().exists());
}

#[test]
fn test_missing_self_marker_warned_once() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&[]);
    let layout = Layout::new(dir.path());
    fs::remove_file(layout.tracked_dir().join("git-backup-tracking")).unwrap();

    let output = git_backup(dir.path())
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert_eq!(stderr.matches("does not track itself").count(), 1, "{stderr}");
}

#[test]
fn test_invalid_config_names_field() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&[]);
    let layout = Layout::new(dir.path());
    fs::write(layout.config_path(), "gh: yes please\nssh_remotes: []\nconfig_is_ready: true\n")
        .unwrap();
    git_backup(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("`gh` must be a boolean"));
}

#[test]
fn test_list_shows_states() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&["gone", "plain"]);
    git_init(&dir.path().join("stray"));
    fs::create_dir_all(dir.path().join("plain")).unwrap();

    git_backup(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing"))
        .stdout(predicate::str::contains("untracked"))
        .stdout(predicate::str::contains("not a git repo"));
}

#[test]
fn test_fetch_skips_and_reports_drift() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&["gone"]);
    git_init(&dir.path().join("stray"));

    git_backup(dir.path())
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("==> git-backup-tracking"))
        .stdout(predicate::str::contains("Skipping"))
        .stdout(predicate::str::contains("git-backup create stray"));
}

#[test]
fn test_foreach_failure_exits_non_zero() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&[]);
    git_backup(dir.path())
        .args(["foreach", "exit 1"])
        .assert()
        .failure();
}

#[test]
fn test_create_on_remote_requires_tracking() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&[]);
    git_init(&dir.path().join("proj"));
    git_backup(dir.path())
        .args(["create-on-remote", "proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not tracked"));
}

#[test]
fn test_clone_refuses_existing_directory() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&[]);
    fs::create_dir_all(dir.path().join("proj")).unwrap();
    git_backup(dir.path())
        .args(["clone-url", "proj", "https://example.invalid/proj.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_add_remotes_with_empty_config_is_noop() {
    if !git_available() {
        return;
    }
    let dir = initialised_root(&["proj"]);
    git_init(&dir.path().join("proj"));
    git_backup(dir.path())
        .args(["add-remotes", "proj"])
        .assert()
        .success();
}

#[test]
fn test_full_pipeline_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path().join("repos"));
    let git = MemoryGit::new();
    let ssh = MemorySsh::new();
    let hosted = MemoryHosted::new();
    let config = BackupConfig {
        enable_hosted_remote: true,
        ssh_remote_hosts: vec!["nas".into()],
        config_confirmed: true,
    };

    // 1. Initialise the tracking repo
    git.init(&layout.tracking_repo_path()).unwrap();
    let registry = MarkerDirRegistry::create(&layout, &git).unwrap();
    assert!(registry.is_tracked("git-backup-tracking").unwrap());

    // 2. Track a new repo and create it everywhere
    let repo = layout.repo("notes");
    fs::create_dir_all(&repo.path).unwrap();
    git.add_work_tree(&repo.path);
    assert!(registry.mark_tracked("notes").unwrap());

    let reconciler = RemoteReconciler::new(
        &layout,
        &git,
        &ssh,
        Some(&hosted as &dyn HostedService),
    );
    let decision = PromptDecision {
        use_ssh_remotes: true,
        use_hosted_remote: true,
        visibility: Some(Visibility::Public),
    };
    let report = reconciler.create_remotes(&repo, &decision, &config).unwrap();
    assert!(report
        .targets
        .iter()
        .all(|t| matches!(t.outcome, TargetOutcome::Created { .. })));
    assert!(ssh.has_repo("nas:repos/notes.git"));
    assert!(hosted.calls().contains(&"create notes --public".to_string()));

    // 3. A fresh clone elsewhere picks the same remotes back up
    let copy = layout.repo("notes-copy");
    git.clone_into("nas:repos/notes.git", &copy.path).unwrap();
    ssh.seed_repo("nas:repos/notes-copy.git");
    let reset = reconciler.reset_remotes(&copy, &config).unwrap();
    assert_eq!(reset.removed, vec!["origin"]);
    let names: Vec<String> = git.remotes(&copy.path).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["nas"]);

    // 4. Push everything; the copy only exists in memory so the disk shows no drift
    let mut out = Vec::new();
    let summary = BatchRunner::new(&layout, &git, &registry)
        .run(&BatchOp::PushAll, &mut out)
        .unwrap();
    assert_eq!(summary.failed(), 0);
    let drift = summary.drift.unwrap();
    assert!(drift.tracked_but_missing.is_empty());
    assert!(drift.present_but_untracked.is_empty());
}
