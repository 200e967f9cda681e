//! # Panel Data Sources
//!
//! Collaborators outside the refresh core:
//!
//! - [`host`] - CPU, memory, disks, processes and interfaces (sysinfo)
//! - [`probe`] - ports, service health, ping, public IP (tokio + reqwest)
//! - [`status`] - Wi-Fi, battery, location, tool versions

pub mod host;
pub mod probe;
pub mod status;

pub use host::{
    CpuSampler, CpuSnapshot, DiskSampler, DiskSnapshot, InterfaceSnapshot, MemorySampler,
    MemorySnapshot, NetworkSampler, ProcessRow, ProcessSampler, Sampler, SharedSampler,
};
pub use probe::{PortStatus, PublicIp, ServiceStatus};
pub use status::{BatteryInfo, StatusSnapshot, ToolVersions, WifiInfo};
