//! Project discovery
//!
//! Runs once per configuration, never per tick: an explicit list wins,
//! otherwise the projects root is scanned (non-recursive) for the most
//! recently modified directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::{expand_tilde, ProjectsConfig};

/// How many recent directories a root scan keeps
pub const RECENT_PROJECT_LIMIT: usize = 3;

/// A monitored project directory. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRecord {
    pub name: String,
    pub path: PathBuf,
}

impl ProjectRecord {
    /// Record named after the last path segment.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// Resolve the project set for a configuration.
pub fn discover(config: &ProjectsConfig) -> Vec<ProjectRecord> {
    if !config.list.is_empty() {
        return from_list(&config.list);
    }
    recent_projects(&config.root_path(), RECENT_PROJECT_LIMIT)
}

/// One record per configured path, order preserved.
pub fn from_list(list: &[String]) -> Vec<ProjectRecord> {
    list.iter()
        .map(|p| ProjectRecord::from_path(expand_tilde(p)))
        .collect()
}

/// Newest `limit` non-hidden directories under `root`, newest first.
///
/// Any I/O failure yields an empty list.
pub fn recent_projects(root: &Path, limit: usize) -> Vec<ProjectRecord> {
    match scan(root, limit) {
        Ok(projects) => {
            tracing::debug!(root = %root.display(), found = projects.len(), "projects discovered");
            projects
        }
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "project discovery failed");
            Vec::new()
        }
    }
}

fn scan(root: &Path, limit: usize) -> io::Result<Vec<ProjectRecord>> {
    let mut dirs: Vec<(SystemTime, ProjectRecord)> = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so linked project dirs count too
        let meta = fs::metadata(entry.path())?;
        if !meta.is_dir() {
            continue;
        }
        dirs.push((
            meta.modified()?,
            ProjectRecord {
                name,
                path: entry.path(),
            },
        ));
    }

    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(dirs.into_iter().take(limit).map(|(_, p)| p).collect())
}
