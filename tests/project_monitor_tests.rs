//! Integration tests for the project git monitor against a real `git`
//!
//! Skipped when `git` isn't on the PATH.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use devtop::projects::{GitCli, GitStatusSource, MonitorOutcome, ProjectGitMonitor, ProjectRecord};
use tempfile::TempDir;

const GIT_TIMEOUT: Duration = Duration::from_secs(10);

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    fs::write(dir.join("README.md"), "hello\n").unwrap();
    git(dir, &["add", "README.md"]);
    git(dir, &["commit", "-q", "-m", "initial"]);
}

#[tokio::test]
async fn test_clean_then_dirty_repository() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    init_repo(temp.path());

    let status = GitCli::default().status(temp.path(), GIT_TIMEOUT).await.unwrap();
    assert!(status.is_repo);
    assert!(status.is_clean());
    assert!(status.branch.is_some());

    fs::write(temp.path().join("new.txt"), "x").unwrap();
    fs::write(temp.path().join("README.md"), "changed\n").unwrap();

    let status = GitCli::default().status(temp.path(), GIT_TIMEOUT).await.unwrap();
    assert_eq!(status.changes, 2);
    assert!(!status.is_clean());
}

#[tokio::test]
async fn test_plain_directory_is_not_a_repository() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let status = GitCli::default().status(temp.path(), GIT_TIMEOUT).await.unwrap();
    assert!(!status.is_repo);

    let missing = temp.path().join("does-not-exist");
    let status = GitCli::default().status(&missing, GIT_TIMEOUT).await.unwrap();
    assert!(!status.is_repo);
}

#[tokio::test]
async fn test_monitor_cycle_lists_only_repositories() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("api");
    let plain = temp.path().join("notes");
    fs::create_dir_all(&repo).unwrap();
    fs::create_dir_all(&plain).unwrap();
    init_repo(&repo);

    let monitor = ProjectGitMonitor::new(
        vec![
            ProjectRecord::from_path(plain.clone()),
            ProjectRecord::from_path(repo.clone()),
        ],
        Arc::new(GitCli::default()),
        GIT_TIMEOUT,
        Duration::from_millis(1),
    );

    match monitor.run_cycle().await {
        MonitorOutcome::Completed(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].project.name, "api");
            assert!(entries[0].git.is_clean());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    monitor.shutdown();
    assert!(matches!(monitor.run_cycle().await, MonitorOutcome::Aborted));
}
