//! Container metrics calculator
//!
//! Turns one engine stats payload (current reading plus the engine's
//! "previous" reading) into presentation strings. Pure: no I/O, no errors.
//! Missing or inconsistent fields degrade to `0.00%` / `0B`.

use crate::util::format::{format_bytes, format_percent};

/// One CPU reading as reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuReading {
    /// Cumulative container CPU time (ns)
    pub total_usage: Option<u64>,
    /// Cumulative host CPU time (ns)
    pub system_usage: Option<u64>,
    pub online_cpus: Option<u64>,
    /// Length of the per-CPU usage breakdown, when reported
    pub percpu_len: Option<usize>,
}

impl CpuReading {
    /// Explicit online count, else per-CPU breakdown length, else 0.
    pub fn cpu_count(&self) -> u64 {
        match self.online_cpus {
            Some(n) if n > 0 => n,
            _ => self.percpu_len.map(|n| n as u64).unwrap_or(0),
        }
    }
}

/// Per-interface network counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// A container's current and previous readings from one stats payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSample {
    pub cpu: CpuReading,
    pub precpu: CpuReading,
    pub mem_usage: Option<u64>,
    /// Reclaimable page cache included in `mem_usage`
    pub mem_cache: Option<u64>,
    pub mem_limit: Option<u64>,
    pub networks: Vec<InterfaceCounters>,
}

/// Presentation-ready container metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetrics {
    pub cpu: String,
    pub memory: String,
    pub net_io: String,
}

impl Default for ContainerMetrics {
    fn default() -> Self {
        calculate(&ContainerSample::default())
    }
}

/// `(Δcpu / Δsystem) × cpu_count × 100`, or 0 when it can't be computed.
pub fn cpu_percent(sample: &ContainerSample) -> f64 {
    let (Some(cpu_now), Some(cpu_prev), Some(sys_now), Some(sys_prev)) = (
        sample.cpu.total_usage,
        sample.precpu.total_usage,
        sample.cpu.system_usage,
        sample.precpu.system_usage,
    ) else {
        return 0.0;
    };

    if cpu_now <= cpu_prev || sys_now <= sys_prev {
        return 0.0;
    }
    let cpu_delta = (cpu_now - cpu_prev) as f64;
    let system_delta = (sys_now - sys_prev) as f64;

    (cpu_delta / system_delta) * sample.cpu.cpu_count() as f64 * 100.0
}

/// Active memory pressure: page cache is reclaimable, so it's subtracted.
pub fn memory_percent(sample: &ContainerSample) -> f64 {
    let (Some(usage), Some(limit)) = (sample.mem_usage, sample.mem_limit) else {
        return 0.0;
    };
    if usage == 0 || limit == 0 {
        return 0.0;
    }
    let active = usage.saturating_sub(sample.mem_cache.unwrap_or(0));
    (active as f64 / limit as f64) * 100.0
}

/// Total bytes received and transmitted across every interface
pub fn network_totals(sample: &ContainerSample) -> (u64, u64) {
    sample.networks.iter().fold((0u64, 0u64), |(rx, tx), iface| {
        (rx.saturating_add(iface.rx_bytes), tx.saturating_add(iface.tx_bytes))
    })
}

/// `"<rx> / <tx>"`
pub fn network_io(sample: &ContainerSample) -> String {
    let (rx, tx) = network_totals(sample);
    format!("{} / {}", format_bytes(rx), format_bytes(tx))
}

pub fn calculate(sample: &ContainerSample) -> ContainerMetrics {
    ContainerMetrics {
        cpu: format_percent(cpu_percent(sample)),
        memory: format_percent(memory_percent(sample)),
        net_io: network_io(sample),
    }
}
