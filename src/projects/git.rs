//! Git status collaborator
//!
//! One `git status --porcelain=v2 --branch` per query: branch, ahead/behind
//! and change count in a single call.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{DashError, Result};

/// Snapshot of one working tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub is_repo: bool,
    pub branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    /// Changed, renamed, unmerged and untracked entries
    pub changes: u32,
}

impl GitStatus {
    pub fn not_repo() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.ahead == 0 && self.behind == 0 && self.changes == 0
    }
}

/// Source of git status snapshots.
///
/// "Not a repository" is `Ok` with `is_repo = false`; `Err` is reserved for
/// transient failures (timeouts, spawn errors) the monitor may paper over
/// with a cached entry.
#[async_trait]
pub trait GitStatusSource: Send + Sync {
    async fn status(&self, path: &Path, timeout: Duration) -> Result<GitStatus>;
}

/// Parse porcelain v2 output (with `--branch` headers).
pub fn parse_porcelain(stdout: &str) -> GitStatus {
    let mut status = GitStatus {
        is_repo: true,
        branch: Some("HEAD".to_string()),
        ..Default::default()
    };

    for line in stdout.lines() {
        if let Some(head) = line.strip_prefix("# branch.head ") {
            status.branch = Some(head.trim().to_string());
        } else if let Some(ab) = line.strip_prefix("# branch.ab ") {
            let mut parts = ab.split_whitespace();
            status.ahead = parts
                .next()
                .and_then(|a| a.trim_start_matches('+').parse().ok())
                .unwrap_or(0);
            status.behind = parts
                .next()
                .and_then(|b| b.trim_start_matches('-').parse().ok())
                .unwrap_or(0);
        } else if matches!(line.as_bytes().first(), Some(b'1' | b'2' | b'u' | b'?')) {
            status.changes += 1;
        }
    }

    status
}

/// Exit code git uses for fatal errors such as "not a git repository"
const GIT_FATAL_EXIT: i32 = 128;

/// The `git` executable, `git` on the PATH by default
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::with_program("git")
    }
}

/// A failed `git status` that means "no repository here", not a transient error.
///
/// Output is forced to the C locale, and the fatal exit code covers gits
/// that ignore it.
fn is_not_repo(code: Option<i32>, stderr: &str) -> bool {
    code == Some(GIT_FATAL_EXIT) || stderr.contains("not a git repository")
}

#[async_trait]
impl GitStatusSource for GitCli {
    async fn status(&self, path: &Path, timeout: Duration) -> Result<GitStatus> {
        if !path.is_dir() {
            return Ok(GitStatus::not_repo());
        }

        let child = Command::new(&self.program)
            .args(["status", "--porcelain=v2", "--branch"])
            .current_dir(path)
            .env("LC_ALL", "C")
            // Read-only query: don't contend for index.lock with the user's git
            .env("GIT_OPTIONAL_LOCKS", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DashError::GitCommand {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| DashError::GitTimeout {
                path: path.display().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })??;

        if output.status.success() {
            return Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_repo(output.status.code(), &stderr) {
            return Ok(GitStatus::not_repo());
        }
        Err(DashError::GitCommand {
            path: path.display().to_string(),
            reason: stderr.trim().to_string(),
        })
    }
}
