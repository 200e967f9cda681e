//! Host metric samplers (sysinfo)
//!
//! sysinfo calls block and need the previous refresh to compute deltas, so
//! each sampler keeps its handles between ticks behind a mutex and runs on
//! the blocking pool via [`SharedSampler::sample`].

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use sysinfo::{Components, Disks, Networks, ProcessesToUpdate, System};

use crate::error::{DashError, Result};

/// How many processes the processes panel keeps
pub const TOP_PROCESS_LIMIT: usize = 20;

static VPN_INTERFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(tun|tap|ppp|utun|wg)").unwrap());

/// A blocking, stateful metric source
pub trait Sampler: Send + 'static {
    type Output: Send + 'static;

    /// Name used in logs and collector errors
    const NAME: &'static str;

    fn sample(&mut self) -> Self::Output;
}

/// Sampler shared between a panel's ticks
pub struct SharedSampler<S: Sampler> {
    inner: Arc<Mutex<S>>,
}

impl<S: Sampler> Clone for SharedSampler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Sampler> SharedSampler<S> {
    pub fn new(sampler: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sampler)),
        }
    }

    /// Take one reading on the blocking pool.
    pub async fn sample(&self) -> Result<S::Output> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut sampler = inner.lock().map_err(|_| DashError::Collector {
                collector: S::NAME.to_string(),
                reason: "sampler lock poisoned".to_string(),
            })?;
            Ok(sampler.sample())
        })
        .await
        .map_err(|e| DashError::CollectorJoin {
            collector: S::NAME.to_string(),
            reason: e.to_string(),
        })?
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

// ═══════════════════════════════════════════════════════════════
// CPU
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSnapshot {
    /// Global usage, 0-100
    pub usage: f64,
    pub model: String,
    pub cores: usize,
    pub speed_ghz: f64,
    /// 1-minute load average
    pub load_avg: f64,
    /// Hottest sensor in °C, when any sensor reports
    pub temperature: Option<f64>,
}

pub struct CpuSampler {
    system: System,
    components: Components,
}

impl CpuSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        // Usage is a delta between refreshes; prime the first one
        system.refresh_cpu_all();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for CpuSampler {
    type Output = CpuSnapshot;
    const NAME: &'static str = "cpu";

    fn sample(&mut self) -> CpuSnapshot {
        self.system.refresh_cpu_all();
        self.components.refresh(true);

        let cpus = self.system.cpus();
        let speed_mhz = if cpus.is_empty() {
            0
        } else {
            cpus.iter().map(|c| c.frequency()).sum::<u64>() / cpus.len() as u64
        };
        let temperature = self
            .components
            .iter()
            .filter_map(|c| c.temperature())
            .filter(|t| t.is_finite() && *t > 0.0)
            .fold(None, |max: Option<f32>, t| Some(max.map_or(t, |m| m.max(t))));

        CpuSnapshot {
            usage: self.system.global_cpu_usage() as f64,
            model: cpus
                .first()
                .map(|c| c.brand().trim().to_string())
                .unwrap_or_default(),
            cores: cpus.len(),
            speed_ghz: speed_mhz as f64 / 1000.0,
            load_avg: System::load_average().one,
            temperature: temperature.map(f64::from),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Memory
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemorySnapshot {
    pub fn free_percent(&self) -> f64 {
        percent(self.available, self.total)
    }

    pub fn used_percent(&self) -> f64 {
        percent(self.used, self.total)
    }

    pub fn swap_percent(&self) -> f64 {
        percent(self.swap_used, self.swap_total)
    }
}

pub struct MemorySampler {
    system: System,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for MemorySampler {
    type Output = MemorySnapshot;
    const NAME: &'static str = "memory";

    fn sample(&mut self) -> MemorySnapshot {
        self.system.refresh_memory();
        MemorySnapshot {
            total: self.system.total_memory(),
            used: self.system.used_memory(),
            available: self.system.available_memory(),
            swap_total: self.system.total_swap(),
            swap_used: self.system.used_swap(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Disks
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskSnapshot {
    pub total: u64,
    pub used: u64,
    pub read_per_sec: f64,
    pub write_per_sec: f64,
}

impl DiskSnapshot {
    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    pub fn used_percent(&self) -> f64 {
        percent(self.used, self.total)
    }

    pub fn free_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 - self.used_percent()
    }
}

/// One mounted filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountUsage<'a> {
    pub mount: &'a Path,
    pub total: u64,
    pub available: u64,
}

/// `(total, used)`: the root filesystem when mounted, else every filesystem.
///
/// Used space is `size - available` so reserved blocks count as used.
pub fn summarize_mounts(mounts: &[MountUsage<'_>]) -> (u64, u64) {
    if let Some(root) = mounts.iter().find(|m| m.mount == Path::new("/")) {
        return (root.total, root.total.saturating_sub(root.available));
    }
    mounts.iter().fold((0, 0), |(total, used), m| {
        (
            total + m.total,
            used + m.total.saturating_sub(m.available),
        )
    })
}

pub struct DiskSampler {
    disks: Disks,
    last: Instant,
}

impl DiskSampler {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
            last: Instant::now(),
        }
    }
}

impl Default for DiskSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for DiskSampler {
    type Output = DiskSnapshot;
    const NAME: &'static str = "disks";

    fn sample(&mut self) -> DiskSnapshot {
        self.disks.refresh(true);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;

        let mounts: Vec<MountUsage<'_>> = self
            .disks
            .iter()
            .map(|d| MountUsage {
                mount: d.mount_point(),
                total: d.total_space(),
                available: d.available_space(),
            })
            .collect();
        let (total, used) = summarize_mounts(&mounts);

        let (read, written) = self.disks.iter().fold((0u64, 0u64), |(r, w), d| {
            let usage = d.usage();
            (r + usage.read_bytes, w + usage.written_bytes)
        });

        DiskSnapshot {
            total,
            used,
            read_per_sec: per_second(read, elapsed),
            write_per_sec: per_second(written, elapsed),
        }
    }
}

fn per_second(bytes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 / elapsed_secs
}

// ═══════════════════════════════════════════════════════════════
// Processes
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub cpu: f64,
    /// Resident set size in bytes
    pub rss: u64,
    pub mem_percent: f64,
}

/// Highest CPU first, ties by pid, truncated to `limit`.
pub fn top_by_cpu(mut rows: Vec<ProcessRow>, limit: usize) -> Vec<ProcessRow> {
    rows.sort_by(|a, b| b.cpu.total_cmp(&a.cpu).then_with(|| a.pid.cmp(&b.pid)));
    rows.truncate(limit);
    rows
}

pub struct ProcessSampler {
    system: System,
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for ProcessSampler {
    type Output = Vec<ProcessRow>;
    const NAME: &'static str = "processes";

    fn sample(&mut self) -> Vec<ProcessRow> {
        self.system.refresh_memory();
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        let total_memory = self.system.total_memory();

        let rows = self
            .system
            .processes()
            .iter()
            .map(|(pid, p)| ProcessRow {
                pid: pid.as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                cpu: p.cpu_usage() as f64,
                rss: p.memory(),
                mem_percent: percent(p.memory(), total_memory),
            })
            .collect();
        top_by_cpu(rows, TOP_PROCESS_LIMIT)
    }
}

// ═══════════════════════════════════════════════════════════════
// Network interfaces
// ═══════════════════════════════════════════════════════════════

/// Interface counters for one sampling window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub ipv4: Option<Ipv4Addr>,
    pub rx_delta: u64,
    pub tx_delta: u64,
    pub total_traffic: u64,
}

impl InterfaceInfo {
    fn is_loopback(&self) -> bool {
        self.name == "lo" || self.ipv4.is_some_and(|ip| ip.is_loopback())
    }
}

pub fn is_vpn_interface(name: &str) -> bool {
    VPN_INTERFACE.is_match(name)
}

/// Busiest non-loopback, non-VPN interface with an IPv4 address.
pub fn default_interface(interfaces: &[InterfaceInfo]) -> Option<&InterfaceInfo> {
    interfaces
        .iter()
        .filter(|i| i.ipv4.is_some() && !i.is_loopback() && !is_vpn_interface(&i.name))
        .max_by_key(|i| i.total_traffic)
}

/// First tunnel-like interface carrying an IPv4 address.
pub fn vpn_interface(interfaces: &[InterfaceInfo]) -> Option<&InterfaceInfo> {
    interfaces
        .iter()
        .find(|i| i.ipv4.is_some() && !i.is_loopback() && is_vpn_interface(&i.name))
}

/// Local side of the network panel (ping and public IP are probed separately)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceSnapshot {
    pub iface: Option<String>,
    pub lan_ip: Option<Ipv4Addr>,
    pub vpn_ip: Option<Ipv4Addr>,
    pub rx_per_sec: f64,
    pub tx_per_sec: f64,
}

impl InterfaceSnapshot {
    pub fn from_interfaces(interfaces: &[InterfaceInfo], elapsed_secs: f64) -> Self {
        let default = default_interface(interfaces);
        Self {
            iface: default.map(|i| i.name.clone()),
            lan_ip: default.and_then(|i| i.ipv4),
            vpn_ip: vpn_interface(interfaces).and_then(|i| i.ipv4),
            rx_per_sec: default.map_or(0.0, |i| per_second(i.rx_delta, elapsed_secs)),
            tx_per_sec: default.map_or(0.0, |i| per_second(i.tx_delta, elapsed_secs)),
        }
    }
}

pub struct NetworkSampler {
    networks: Networks,
    last: Instant,
}

impl NetworkSampler {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            last: Instant::now(),
        }
    }
}

impl Default for NetworkSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for NetworkSampler {
    type Output = InterfaceSnapshot;
    const NAME: &'static str = "network";

    fn sample(&mut self) -> InterfaceSnapshot {
        self.networks.refresh(true);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;

        let interfaces: Vec<InterfaceInfo> = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceInfo {
                name: name.clone(),
                ipv4: data.ip_networks().iter().find_map(|n| match n.addr {
                    IpAddr::V4(v4) => Some(v4),
                    IpAddr::V6(_) => None,
                }),
                rx_delta: data.received(),
                tx_delta: data.transmitted(),
                total_traffic: data.total_received() + data.total_transmitted(),
            })
            .collect();

        InterfaceSnapshot::from_interfaces(&interfaces, elapsed)
    }
}
