//! # Git Projects Panel Data
//!
//! - [`discovery`] - which directories to watch (once per config)
//! - [`git`] - `GitStatusSource` collaborator and the `git` CLI implementation
//! - [`monitor`] - throttled sequential polling with cache fallback

pub mod discovery;
pub mod git;
pub mod monitor;

pub use discovery::{discover, ProjectRecord, RECENT_PROJECT_LIMIT};
pub use git::{parse_porcelain, GitCli, GitStatus, GitStatusSource};
pub use monitor::{MonitorOutcome, ProjectEntry, ProjectGitMonitor};
