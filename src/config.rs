//! devtop Configuration Module
//!
//! One explicit structure, resolved once at startup. Stored in
//! `~/.config/devtop/config.yml` (overridable with `--config`).
//!
//! ## Resolution
//!
//! 1. File present and valid: its values, every missing field defaulted
//! 2. File absent: all defaults
//! 3. File malformed: all defaults plus a notice for the footer
//!
//! `processes` also accepts the historical `proccesses` spelling.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashConfig {
    pub status_bar: StatusBarConfig,
    pub cpu: PanelConfig,
    pub memory: PanelConfig,
    pub disks: PanelConfig,
    pub network: NetworkConfig,
    pub port_scanner: PortScannerConfig,
    pub services: ServicesConfig,
    pub projects: ProjectsConfig,
    pub docker: PanelConfig,
    #[serde(alias = "proccesses")]
    pub processes: ProcessesConfig,
    pub theme: ThemeConfig,
}

/// Panels that only carry a refresh cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelConfig {
    /// Milliseconds
    pub refresh_interval: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 2000,
        }
    }
}

impl PanelConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessesConfig {
    pub refresh_interval: u64,
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 1000,
        }
    }
}

impl ProcessesConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

/// `{ enabled }` switch for a status bar item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Toggle {
    pub enabled: bool,
}

impl Default for Toggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Status bar item with a chrono format string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatToggle {
    pub enabled: bool,
    pub format: String,
}

impl Default for FormatToggle {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "%H:%M:%S".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusBarConfig {
    pub refresh_interval: u64,
    pub location: Toggle,
    pub date: FormatToggle,
    pub time: FormatToggle,
    pub wifi: Toggle,
    pub battery: Toggle,
    pub node: Toggle,
    pub python3: Toggle,
    pub git: Toggle,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 5000,
            location: Toggle { enabled: false },
            date: FormatToggle {
                enabled: true,
                format: "%b,%d %Y".to_string(),
            },
            time: FormatToggle::default(),
            wifi: Toggle::default(),
            battery: Toggle::default(),
            node: Toggle::default(),
            python3: Toggle::default(),
            git: Toggle::default(),
        }
    }
}

impl StatusBarConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIpConfig {
    pub refresh_interval: u64,
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 300_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub refresh_interval: u64,
    /// Kept snake_case for compatibility with existing files
    #[serde(rename = "public_ip")]
    pub public_ip: PublicIpConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 3000,
            public_ip: PublicIpConfig::default(),
        }
    }
}

impl NetworkConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }

    pub fn public_ip_interval(&self) -> Duration {
        Duration::from_millis(self.public_ip.refresh_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortEntry {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PortScannerConfig {
    pub refresh_interval: u64,
    pub list: Vec<PortEntry>,
}

impl Default for PortScannerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 3000,
            list: Vec::new(),
        }
    }
}

impl PortScannerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

/// A health-checked service: `host` is either a URL or a bare host/IP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceEntry {
    pub name: String,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicesConfig {
    pub refresh_interval: u64,
    pub list: Vec<ServiceEntry>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 3000,
            list: Vec::new(),
        }
    }
}

impl ServicesConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectsConfig {
    pub refresh_interval: u64,
    /// Explicit project paths; when non-empty, `root` is not scanned
    pub list: Vec<String>,
    /// Directory scanned for recently modified projects (default `~/Projects`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Per-query git timeout in milliseconds
    pub git_timeout: u64,
    /// Pause between successive git queries in milliseconds
    pub query_delay: u64,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 10_000,
            list: Vec::new(),
            root: None,
            git_timeout: 200,
            query_delay: 100,
        }
    }
}

impl ProjectsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_millis(self.git_timeout)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay)
    }

    pub fn root_path(&self) -> PathBuf {
        match &self.root {
            Some(root) => expand_tilde(root),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Projects"),
        }
    }
}

/// Color names (or `#rrggbb`) for the dashboard palette
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: "blue".to_string(),
            secondary: "cyan".to_string(),
            success: "green".to_string(),
            warning: "yellow".to_string(),
            error: "red".to_string(),
            text: "white".to_string(),
            border: None,
        }
    }
}

/// Starter file written by `devtop init`
pub const DEFAULT_CONFIG_YAML: &str = r#"statusBar:
  refreshInterval: 5000
  location:
    enabled: false
  date:
    enabled: true
    format: '%b,%d %Y'
  time:
    enabled: true
    format: '%H:%M:%S'
  wifi:
    enabled: true
  battery:
    enabled: true
  node:
    enabled: true
  python3:
    enabled: true
  git:
    enabled: true
cpu:
  refreshInterval: 2000
memory:
  refreshInterval: 2000
disks:
  refreshInterval: 2000
network:
  refreshInterval: 3000
  public_ip:
    refreshInterval: 300000
portScanner:
  refreshInterval: 3000
  list:
    - name: Mysql
      port: 3306
    - name: Postgres
      port: 5432
    - name: Redis
      port: 6379
    - name: Mongo
      port: 27017
services:
  refreshInterval: 3000
  list:
    - name: google
      host: 8.8.8.8
    - name: cloudflare
      host: 1.1.1.1
    - name: gitlab
      host: gitlab.com
    - name: backend
      host: http://127.0.0.1:3000/
projects:
  refreshInterval: 10000
  # Leave empty to show the 3 most recently modified directories in root
  list: []
  root: ~/Projects
  gitTimeout: 200
  queryDelay: 100
processes:
  refreshInterval: 1000
docker:
  refreshInterval: 2000
theme:
  primary: blue
  secondary: cyan
  success: green
  warning: yellow
  error: red
  text: white
"#;

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl DashConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/devtop/` on Linux
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("devtop")
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yml")
    }

    /// Parse YAML content. Empty content means defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| DashError::ConfigParse {
            reason: e.to_string(),
        })
    }

    /// Load configuration from `path`
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| DashError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Load, falling back to defaults on any error.
    ///
    /// The second element is a one-line notice for the footer when the file
    /// was rejected.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config rejected, using defaults");
                (Self::default(), Some(format!("config ignored: {}", e)))
            }
        }
    }

    /// Write the starter config to `path`
    ///
    /// Creates the parent directory if needed. Refuses to overwrite an
    /// existing file unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(DashError::ConfigExists {
                path: path.display().to_string(),
            });
        }

        let write_err = |e: std::io::Error| DashError::ConfigWrite {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(write_err)?;
            }
        }

        fs::write(path, DEFAULT_CONFIG_YAML).map_err(write_err)?;
        tracing::info!(path = %path.display(), "config written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_contains_devtop() {
        let path = DashConfig::config_path();
        assert!(path.to_string_lossy().contains("devtop"));
        assert!(path.to_string_lossy().ends_with("config.yml"));
    }

    #[test]
    fn test_defaults() {
        let config = DashConfig::default();
        assert_eq!(config.projects.refresh_interval, 10_000);
        assert_eq!(config.docker.refresh_interval, 2000);
        assert_eq!(config.processes.refresh_interval, 1000);
        assert_eq!(config.cpu.interval(), Duration::from_secs(2));
        assert_eq!(config.network.refresh_interval, 3000);
        assert_eq!(config.network.public_ip.refresh_interval, 300_000);
        assert_eq!(config.status_bar.refresh_interval, 5000);
        assert_eq!(config.projects.git_timeout(), Duration::from_millis(200));
        assert_eq!(config.projects.query_delay(), Duration::from_millis(100));
        assert_eq!(config.theme.primary, "blue");
        assert!(!config.status_bar.location.enabled);
        assert!(config.status_bar.git.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = DashConfig::parse(
            "cpu:\n  refreshInterval: 500\nprojects:\n  list:\n    - /tmp/a\n",
        )
        .unwrap();
        assert_eq!(config.cpu.refresh_interval, 500);
        assert_eq!(config.memory.refresh_interval, 2000);
        assert_eq!(config.projects.list, vec!["/tmp/a".to_string()]);
        assert_eq!(config.projects.refresh_interval, 10_000);
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_processes_alias() {
        let config = DashConfig::parse("proccesses:\n  refreshInterval: 4000\n").unwrap();
        assert_eq!(config.processes.refresh_interval, 4000);
    }

    #[test]
    fn test_nested_block_defaults() {
        let config = DashConfig::parse("processes: {}\nstatusBar:\n  time:\n    enabled: false\n")
            .unwrap();
        assert_eq!(config.processes.refresh_interval, 1000);
        assert!(!config.status_bar.time.enabled);
        assert_eq!(config.status_bar.time.format, "%H:%M:%S");
        assert_eq!(config.status_bar.date.format, "%b,%d %Y");
    }

    #[test]
    fn test_empty_content_is_default() {
        assert_eq!(DashConfig::parse("  \n").unwrap(), DashConfig::default());
    }

    #[test]
    fn test_malformed_is_parse_error() {
        let err = DashConfig::parse("cpu: [unclosed").unwrap_err();
        assert!(matches!(err, DashError::ConfigParse { .. }));
    }

    #[test]
    fn test_default_template_parses() {
        let config = DashConfig::parse(DEFAULT_CONFIG_YAML).unwrap();
        assert_eq!(config.port_scanner.list.len(), 4);
        assert_eq!(config.port_scanner.list[1].port, 5432);
        assert_eq!(config.services.list[0].host, "8.8.8.8");
        assert_eq!(config.projects.root.as_deref(), Some("~/Projects"));
        assert_eq!(config.processes.refresh_interval, 1000);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = DashConfig::load_from(&dir.path().join("nope.yml")).unwrap();
        assert_eq!(config, DashConfig::default());
    }

    #[test]
    fn test_load_or_default_reports_notice() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "cpu: [").unwrap();
        let (config, notice) = DashConfig::load_or_default(&path);
        assert_eq!(config, DashConfig::default());
        assert!(notice.unwrap().contains("DEVTOP-002"));
    }

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        DashConfig::write_default(&path, false).unwrap();
        assert!(path.exists());

        let err = DashConfig::write_default(&path, false).unwrap_err();
        assert!(matches!(err, DashError::ConfigExists { .. }));

        fs::write(&path, "cpu: {}").unwrap();
        DashConfig::write_default(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_YAML);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/Projects"), home.join("Projects"));
        }
    }

    #[test]
    fn test_projects_root_default() {
        let config = ProjectsConfig::default();
        assert!(config.root_path().ends_with("Projects"));
    }
}
