// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! devtop Error Types with Error Codes
//!
//! Error code ranges:
//! - DEVTOP-000-009: Configuration errors
//! - DEVTOP-010-019: Host collector errors
//! - DEVTOP-020-029: Container engine errors
//! - DEVTOP-030-039: Git/project errors
//! - DEVTOP-040-049: Network probe errors
//! - DEVTOP-090-099: IO errors
//!
//! Nothing below is fatal to the dashboard: panels turn these into
//! "N/A" / "NOT OK" / error text and keep refreshing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum DashError {
    // ═══════════════════════════════════════════
    // CONFIG ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-001] Failed to read config '{path}': {reason}")]
    ConfigRead { path: String, reason: String },

    #[error("[DEVTOP-002] Failed to parse config: {reason}")]
    ConfigParse { reason: String },

    #[error("[DEVTOP-003] Config file already exists at {path}")]
    ConfigExists { path: String },

    #[error("[DEVTOP-004] Failed to write config '{path}': {reason}")]
    ConfigWrite { path: String, reason: String },

    // ═══════════════════════════════════════════
    // HOST COLLECTOR ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-010] Collector '{collector}' failed: {reason}")]
    Collector { collector: String, reason: String },

    #[error("[DEVTOP-011] Collector task '{collector}' did not complete: {reason}")]
    CollectorJoin { collector: String, reason: String },

    // ═══════════════════════════════════════════
    // CONTAINER ENGINE ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-020] Container engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    #[error("[DEVTOP-021] Container engine request failed: {reason}")]
    EngineRequest { reason: String },

    // ═══════════════════════════════════════════
    // GIT / PROJECT ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-030] git status timed out after {timeout_ms}ms in '{path}'")]
    GitTimeout { path: String, timeout_ms: u64 },

    #[error("[DEVTOP-031] git status failed in '{path}': {reason}")]
    GitCommand { path: String, reason: String },

    // ═══════════════════════════════════════════
    // NETWORK PROBE ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-040] Probe of '{target}' failed: {reason}")]
    Probe { target: String, reason: String },

    #[error("[DEVTOP-041] HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[DEVTOP-042] Unexpected response from '{target}': {reason}")]
    UnexpectedResponse { target: String, reason: String },

    // ═══════════════════════════════════════════
    // IO ERRORS (090-099)
    // ═══════════════════════════════════════════
    #[error("[DEVTOP-090] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashError {
    /// Short, panel-friendly message without the error code prefix.
    pub fn panel_message(&self) -> String {
        match self {
            DashError::EngineUnavailable { reason } => reason.clone(),
            DashError::EngineRequest { reason } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Transient errors are retried on the next tick without user action.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            DashError::ConfigRead { .. }
                | DashError::ConfigParse { .. }
                | DashError::ConfigExists { .. }
                | DashError::ConfigWrite { .. }
        )
    }
}

impl FixSuggestion for DashError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            DashError::ConfigRead { .. } => Some("Check the config path and its permissions"),
            DashError::ConfigParse { .. } => {
                Some("Check YAML syntax, or regenerate with 'devtop init --force'")
            }
            DashError::ConfigExists { .. } => Some("Pass --force to overwrite the existing file"),
            DashError::ConfigWrite { .. } => Some("Check that the config directory is writable"),
            DashError::EngineUnavailable { .. } => {
                Some("Start the Docker daemon or check /var/run/docker.sock permissions")
            }
            DashError::GitTimeout { .. } => Some("Raise projects.gitTimeout in the config"),
            _ => None,
        }
    }
}
