//! devtop - terminal dashboard for a developer workstation
//!
//! Host metrics, network reachability, local ports, Docker containers and
//! the git state of recent projects, each refreshed on its own schedule.

pub mod config;
pub mod docker;
pub mod error;
pub mod projects;
pub mod refresh;
pub mod sources;
pub mod tui;
pub mod util;

pub use config::DashConfig;
pub use docker::{calculate, ContainerMetrics, ContainerSample};
pub use error::{DashError, FixSuggestion, Result};
pub use projects::{GitStatus, MonitorOutcome, ProjectGitMonitor};
pub use refresh::RefreshScheduler;
pub use tui::{ScrollEvent, ScrollState, SelectionEvent, SelectionState};
