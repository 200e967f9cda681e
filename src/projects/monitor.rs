//! Project git monitor
//!
//! ```text
//! cycle ──► cache lock free? ──no──► Skipped
//!                 │yes
//!                 ▼
//!   for each project (discovery order):
//!     alive? ──no──► Aborted
//!     (delay, then alive? again)
//!     status(path, timeout)
//!       Ok(repo)      → emit + cache
//!       Ok(not repo)  → evict
//!       Err(_)        → emit cached entry, if any
//! ```
//!
//! The cache is owned by the monitor and only touched by the cycle holding
//! its lock, so two cycles can never interleave.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::discovery::ProjectRecord;
use super::git::{GitStatus, GitStatusSource};

/// A discovered project with its last known git status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub project: ProjectRecord,
    pub git: GitStatus,
}

/// Result of one monitoring cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Entries to display, in discovery order
    Completed(Vec<ProjectEntry>),
    /// Another cycle held the lock; nothing was queried
    Skipped,
    /// Monitor shut down mid-cycle; nothing to publish
    Aborted,
}

pub struct ProjectGitMonitor {
    projects: Vec<ProjectRecord>,
    git: Arc<dyn GitStatusSource>,
    cache: Mutex<HashMap<PathBuf, ProjectEntry>>,
    alive: AtomicBool,
    git_timeout: Duration,
    query_delay: Duration,
}

impl ProjectGitMonitor {
    pub fn new(
        projects: Vec<ProjectRecord>,
        git: Arc<dyn GitStatusSource>,
        git_timeout: Duration,
        query_delay: Duration,
    ) -> Self {
        Self {
            projects,
            git,
            cache: Mutex::new(HashMap::new()),
            alive: AtomicBool::new(true),
            git_timeout,
            query_delay,
        }
    }

    /// Stop publishing. A running cycle aborts at its next checkpoint.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Query every project once, sequentially.
    pub async fn run_cycle(&self) -> MonitorOutcome {
        let Ok(mut cache) = self.cache.try_lock() else {
            tracing::trace!("project cycle already running, tick ignored");
            return MonitorOutcome::Skipped;
        };

        let mut entries = Vec::with_capacity(self.projects.len());

        for (i, project) in self.projects.iter().enumerate() {
            if !self.is_alive() {
                return MonitorOutcome::Aborted;
            }
            if i > 0 && !self.query_delay.is_zero() {
                tokio::time::sleep(self.query_delay).await;
                if !self.is_alive() {
                    return MonitorOutcome::Aborted;
                }
            }

            match self.git.status(&project.path, self.git_timeout).await {
                Ok(git) if git.is_repo => {
                    let entry = ProjectEntry {
                        project: project.clone(),
                        git,
                    };
                    cache.insert(project.path.clone(), entry.clone());
                    entries.push(entry);
                }
                Ok(_) => {
                    if cache.remove(&project.path).is_some() {
                        tracing::debug!(project = %project.name, "no longer a repository, evicted");
                    }
                }
                Err(e) => {
                    tracing::debug!(project = %project.name, error = %e, "git status failed");
                    if let Some(cached) = cache.get(&project.path) {
                        entries.push(cached.clone());
                    }
                }
            }
        }

        if !self.is_alive() {
            return MonitorOutcome::Aborted;
        }
        MonitorOutcome::Completed(entries)
    }
}

impl std::fmt::Debug for ProjectGitMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectGitMonitor")
            .field("projects", &self.projects.len())
            .field("alive", &self.is_alive())
            .field("git_timeout", &self.git_timeout)
            .field("query_delay", &self.query_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashError, Result};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Clone)]
    enum Reply {
        Repo(&'static str),
        NotRepo,
        Timeout,
        Slow(Duration),
    }

    /// Scripted replies per path; an exhausted script repeats `Timeout`.
    #[derive(Default)]
    struct ScriptedGit {
        replies: StdMutex<HashMap<PathBuf, VecDeque<Reply>>>,
        queried: StdMutex<Vec<PathBuf>>,
    }

    impl ScriptedGit {
        fn script(self, path: &str, replies: Vec<Reply>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), replies.into());
            self
        }
    }

    #[async_trait]
    impl GitStatusSource for ScriptedGit {
        async fn status(&self, path: &Path, timeout: Duration) -> Result<GitStatus> {
            self.queried.lock().unwrap().push(path.to_path_buf());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(path)
                .and_then(|q| q.pop_front())
                .unwrap_or(Reply::Timeout);
            match reply {
                Reply::Repo(branch) => Ok(GitStatus {
                    is_repo: true,
                    branch: Some(branch.to_string()),
                    ..Default::default()
                }),
                Reply::NotRepo => Ok(GitStatus::not_repo()),
                Reply::Timeout => Err(DashError::GitTimeout {
                    path: path.display().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
                Reply::Slow(d) => {
                    tokio::time::sleep(d).await;
                    Ok(GitStatus {
                        is_repo: true,
                        ..Default::default()
                    })
                }
            }
        }
    }

    fn record(path: &str) -> ProjectRecord {
        ProjectRecord::from_path(PathBuf::from(path))
    }

    fn monitor(projects: &[&str], git: ScriptedGit) -> Arc<ProjectGitMonitor> {
        Arc::new(ProjectGitMonitor::new(
            projects.iter().map(|p| record(p)).collect(),
            Arc::new(git),
            Duration::from_millis(200),
            Duration::from_millis(100),
        ))
    }

    fn branches(outcome: &MonitorOutcome) -> Vec<(String, Option<String>)> {
        match outcome {
            MonitorOutcome::Completed(entries) => entries
                .iter()
                .map(|e| (e.project.name.clone(), e.git.branch.clone()))
                .collect(),
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_preserves_discovery_order() {
        let git = ScriptedGit::default()
            .script("/p/a", vec![Reply::Repo("main")])
            .script("/p/b", vec![Reply::NotRepo])
            .script("/p/c", vec![Reply::Repo("dev")]);
        let m = monitor(&["/p/a", "/p/b", "/p/c"], git);

        let outcome = m.run_cycle().await;
        assert_eq!(
            branches(&outcome),
            vec![
                ("a".to_string(), Some("main".to_string())),
                ("c".to_string(), Some("dev".to_string())),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_serves_cached_entry() {
        let git = ScriptedGit::default().script("/p/a", vec![Reply::Repo("main"), Reply::Timeout]);
        let m = monitor(&["/p/a"], git);

        let first = m.run_cycle().await;
        let second = m.run_cycle().await;
        assert_eq!(first, second);
        assert_eq!(branches(&second), vec![("a".to_string(), Some("main".to_string()))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_cache_emits_nothing() {
        let git = ScriptedGit::default().script("/p/a", vec![Reply::Timeout]);
        let m = monitor(&["/p/a"], git);
        assert_eq!(m.run_cycle().await, MonitorOutcome::Completed(vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_repo_evicts_and_stays_evicted() {
        let git = ScriptedGit::default().script(
            "/p/a",
            vec![Reply::Repo("main"), Reply::NotRepo, Reply::Timeout, Reply::Timeout],
        );
        let m = monitor(&["/p/a"], git);

        assert_eq!(branches(&m.run_cycle().await).len(), 1);
        for _ in 0..3 {
            assert_eq!(m.run_cycle().await, MonitorOutcome::Completed(vec![]));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_queries() {
        let git = ScriptedGit::default()
            .script("/p/a", vec![Reply::Repo("main")])
            .script("/p/b", vec![Reply::Repo("main")])
            .script("/p/c", vec![Reply::Repo("main")]);
        let m = monitor(&["/p/a", "/p/b", "/p/c"], git);

        let start = tokio::time::Instant::now();
        m.run_cycle().await;
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cycle_is_skipped() {
        let git = ScriptedGit::default().script("/p/a", vec![Reply::Slow(Duration::from_secs(1))]);
        let m = monitor(&["/p/a"], git);

        let running = tokio::spawn({
            let m = Arc::clone(&m);
            async move { m.run_cycle().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(m.run_cycle().await, MonitorOutcome::Skipped);
        assert!(matches!(running.await.unwrap(), MonitorOutcome::Completed(ref e) if e.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_cycle_aborts() {
        let git = ScriptedGit::default()
            .script("/p/a", vec![Reply::Repo("main")])
            .script("/p/b", vec![Reply::Repo("main")]);
        let git = Arc::new(git);
        let m = Arc::new(ProjectGitMonitor::new(
            vec![record("/p/a"), record("/p/b")],
            git.clone(),
            Duration::from_millis(200),
            Duration::from_millis(100),
        ));

        let running = tokio::spawn({
            let m = Arc::clone(&m);
            async move { m.run_cycle().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        m.shutdown();

        assert_eq!(running.await.unwrap(), MonitorOutcome::Aborted);
        // The second project was never queried
        assert_eq!(*git.queried.lock().unwrap(), vec![PathBuf::from("/p/a")]);
    }

    #[tokio::test]
    async fn test_dead_monitor_publishes_nothing() {
        let m = monitor(&["/p/a"], ScriptedGit::default());
        m.shutdown();
        assert_eq!(m.run_cycle().await, MonitorOutcome::Aborted);
    }
}
