//! Status bar sources: Wi-Fi, battery, location and tool versions
//!
//! Linux-first: Wi-Fi comes from `/proc/net/wireless`, battery from
//! `/sys/class/power_supply`. Missing files simply mean "no Wi-Fi" or
//! "on AC power".

use std::fs;
use std::path::Path;
use std::process::Stdio;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::config::StatusBarConfig;
use crate::error::{DashError, Result};
use crate::util::constants::VERSION_TIMEOUT;

const WIRELESS_PATH: &str = "/proc/net/wireless";
const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

static VERSION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").unwrap());

// ═══════════════════════════════════════════════════════════════
// Wi-Fi
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiInfo {
    pub iface: String,
    pub signal_dbm: i32,
}

impl WifiInfo {
    pub fn quality(&self) -> SignalQuality {
        match self.signal_dbm {
            s if s >= -60 => SignalQuality::Good,
            s if s >= -80 => SignalQuality::Fair,
            _ => SignalQuality::Poor,
        }
    }
}

/// First interface listed in `/proc/net/wireless` content.
pub fn parse_wireless(content: &str) -> Option<WifiInfo> {
    content.lines().skip(2).find_map(|line| {
        let (iface, rest) = line.split_once(':')?;
        let mut fields = rest.split_whitespace();
        let _status = fields.next()?;
        let _link = fields.next()?;
        let level: f64 = fields.next()?.trim_end_matches('.').parse().ok()?;
        Some(WifiInfo {
            iface: iface.trim().to_string(),
            signal_dbm: level.round() as i32,
        })
    })
}

pub fn read_wifi() -> Option<WifiInfo> {
    fs::read_to_string(WIRELESS_PATH)
        .ok()
        .and_then(|content| parse_wireless(&content))
}

// ═══════════════════════════════════════════════════════════════
// Battery
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryInfo {
    pub percent: u8,
    pub charging: bool,
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// First `type = Battery` supply under `root`.
pub fn read_battery_from(root: &Path) -> Option<BatteryInfo> {
    let pattern = root.join("*");
    let entries = glob::glob(&pattern.to_string_lossy()).ok()?;

    entries.filter_map(|e| e.ok()).find_map(|dir| {
        if read_trimmed(&dir.join("type"))? != "Battery" {
            return None;
        }
        let percent = read_trimmed(&dir.join("capacity"))?.parse::<u8>().ok()?;
        let charging = read_trimmed(&dir.join("status")).is_some_and(|s| s == "Charging");
        Some(BatteryInfo {
            percent: percent.min(100),
            charging,
        })
    })
}

pub fn read_battery() -> Option<BatteryInfo> {
    read_battery_from(Path::new(POWER_SUPPLY_ROOT))
}

// ═══════════════════════════════════════════════════════════════
// Location
// ═══════════════════════════════════════════════════════════════

/// City part of an IANA zone: `America/New_York` → `New York`.
pub fn location_from_timezone(tz: &str) -> Option<String> {
    let city = tz.rsplit('/').next()?;
    if city.is_empty() || !tz.contains('/') {
        return None;
    }
    Some(city.replace('_', " "))
}

fn local_timezone() -> Option<String> {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim_start_matches(':').to_string();
        if !tz.is_empty() {
            return Some(tz);
        }
    }
    if let Some(tz) = read_trimmed(Path::new("/etc/timezone")) {
        return Some(tz);
    }
    let target = fs::read_link("/etc/localtime").ok()?;
    let target = target.to_string_lossy();
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
}

/// Offline location guess from the local time zone.
pub fn location() -> String {
    local_timezone()
        .and_then(|tz| location_from_timezone(&tz))
        .unwrap_or_else(|| "Unknown".to_string())
}

// ═══════════════════════════════════════════════════════════════
// Tool versions
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolVersions {
    pub node: Option<String>,
    pub python3: Option<String>,
    pub git: Option<String>,
}

/// First dotted version number in `--version` output.
pub fn parse_version(output: &str) -> Option<String> {
    VERSION_NUMBER
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `<tool> --version`, reading stdout then stderr (older Pythons print there).
pub async fn tool_version(tool: &str) -> Result<String> {
    let child = Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DashError::Probe {
            target: tool.to_string(),
            reason: e.to_string(),
        })?;

    let output = tokio::time::timeout(VERSION_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| DashError::Probe {
            target: tool.to_string(),
            reason: "version lookup timed out".to_string(),
        })??;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    parse_version(&stdout)
        .or_else(|| parse_version(&stderr))
        .ok_or_else(|| DashError::UnexpectedResponse {
            target: tool.to_string(),
            reason: "no version in output".to_string(),
        })
}

async fn enabled_version(enabled: bool, tool: &str) -> Option<String> {
    if !enabled {
        return None;
    }
    match tool_version(tool).await {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(tool, error = %e, "version unavailable");
            None
        }
    }
}

/// Looked up once at startup, only for enabled items.
pub async fn tool_versions(config: &StatusBarConfig) -> ToolVersions {
    let (node, python3, git) = tokio::join!(
        enabled_version(config.node.enabled, "node"),
        enabled_version(config.python3.enabled, "python3"),
        enabled_version(config.git.enabled, "git"),
    );
    ToolVersions { node, python3, git }
}

// ═══════════════════════════════════════════════════════════════
// Periodic snapshot
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub wifi: Option<WifiInfo>,
    pub battery: Option<BatteryInfo>,
}

/// Wi-Fi and battery, skipping disabled items.
pub async fn sample_status(wifi: bool, battery: bool) -> Result<StatusSnapshot> {
    tokio::task::spawn_blocking(move || StatusSnapshot {
        wifi: if wifi { read_wifi() } else { None },
        battery: if battery { read_battery() } else { None },
    })
    .await
    .map_err(|e| DashError::CollectorJoin {
        collector: "status".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WIRELESS: &str = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
wlp2s0: 0000   54.  -56.  -256        0      0      0      0      0        0
";

    #[test]
    fn test_parse_wireless() {
        let wifi = parse_wireless(WIRELESS).unwrap();
        assert_eq!(wifi.iface, "wlp2s0");
        assert_eq!(wifi.signal_dbm, -56);
        assert_eq!(wifi.quality(), SignalQuality::Good);
    }

    #[test]
    fn test_parse_wireless_headers_only() {
        let headers: String = WIRELESS.lines().take(2).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_wireless(&headers), None);
    }

    #[test]
    fn test_signal_quality_bands() {
        let at = |dbm| WifiInfo {
            iface: "w".into(),
            signal_dbm: dbm,
        };
        assert_eq!(at(-60).quality(), SignalQuality::Good);
        assert_eq!(at(-61).quality(), SignalQuality::Fair);
        assert_eq!(at(-80).quality(), SignalQuality::Fair);
        assert_eq!(at(-81).quality(), SignalQuality::Poor);
    }

    fn supply(root: &Path, name: &str, kind: &str, capacity: &str, status: &str) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("type"), format!("{}\n", kind)).unwrap();
        fs::write(dir.join("capacity"), format!("{}\n", capacity)).unwrap();
        fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
    }

    #[test]
    fn test_read_battery_skips_mains() {
        let tmp = TempDir::new().unwrap();
        supply(tmp.path(), "AC", "Mains", "0", "Unknown");
        supply(tmp.path(), "BAT0", "Battery", "87", "Charging");

        let battery = read_battery_from(tmp.path()).unwrap();
        assert_eq!(battery.percent, 87);
        assert!(battery.charging);
    }

    #[test]
    fn test_read_battery_none_on_desktop() {
        let tmp = TempDir::new().unwrap();
        supply(tmp.path(), "AC", "Mains", "0", "Unknown");
        assert_eq!(read_battery_from(tmp.path()), None);
    }

    #[test]
    fn test_location_from_timezone() {
        assert_eq!(location_from_timezone("America/New_York").as_deref(), Some("New York"));
        assert_eq!(location_from_timezone("Africa/Casablanca").as_deref(), Some("Casablanca"));
        assert_eq!(location_from_timezone("UTC"), None);
    }

    #[test]
    fn test_parse_version_outputs() {
        assert_eq!(parse_version("v20.11.0\n").as_deref(), Some("20.11.0"));
        assert_eq!(parse_version("Python 3.11.4").as_deref(), Some("3.11.4"));
        assert_eq!(parse_version("git version 2.43.0").as_deref(), Some("2.43.0"));
        assert_eq!(parse_version("command not found"), None);
    }

    #[tokio::test]
    async fn test_missing_tool_is_error() {
        assert!(tool_version("devtop-no-such-tool-xyz").await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_versions_are_skipped() {
        let mut config = StatusBarConfig::default();
        config.node.enabled = false;
        config.python3.enabled = false;
        config.git.enabled = false;
        assert_eq!(tool_versions(&config).await, ToolVersions::default());
    }
}
