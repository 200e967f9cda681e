//! # Container Panel Data
//!
//! - [`ContainerEngine`] - collaborator trait (list + per-container sample)
//! - [`BollardEngine`] - local Docker socket implementation
//! - [`metrics`] - pure CPU / memory / network calculator
//!
//! [`collect_containers`] is the panel producer: list, order, sample each
//! container concurrently and reduce the samples to display rows.

mod client;
pub mod metrics;

pub use client::BollardEngine;
pub use metrics::{calculate, ContainerMetrics, ContainerSample, CpuReading, InterfaceCounters};

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::Result;

/// Container lifecycle state as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Restarting,
    Other(String),
}

impl ContainerState {
    pub fn parse(state: &str) -> Self {
        match state {
            "running" => ContainerState::Running,
            "restarting" => ContainerState::Restarting,
            other => ContainerState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Restarting => "restarting",
            ContainerState::Other(s) => s,
        }
    }
}

/// Container identity from the list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    /// Human name, leading `/` already stripped
    pub name: String,
    pub state: ContainerState,
    pub image: String,
}

/// One rendered row of the container panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRow {
    /// First 12 characters of the engine id
    pub short_id: String,
    pub name: String,
    pub state: ContainerState,
    pub image: String,
    pub metrics: ContainerMetrics,
}

/// Container engine collaborator
///
/// `list_containers` failing with `DashError::EngineUnavailable` means the
/// engine can't be reached at all; the panel shows it as an error.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>>;

    async fn sample(&self, id: &str) -> Result<ContainerSample>;
}

/// Running containers first, then by name.
pub fn sort_containers(containers: &mut [ContainerInfo]) {
    containers.sort_by(|a, b| {
        let a_running = a.state == ContainerState::Running;
        let b_running = b.state == ContainerState::Running;
        b_running
            .cmp(&a_running)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Panel producer: list, sort and sample every container.
///
/// A failed sample degrades that row to zeroed metrics instead of failing
/// the whole refresh.
pub async fn collect_containers(engine: &dyn ContainerEngine) -> Result<Vec<ContainerRow>> {
    let mut containers = engine.list_containers().await?;
    sort_containers(&mut containers);

    let samples = join_all(containers.iter().map(|c| engine.sample(&c.id))).await;

    Ok(containers
        .into_iter()
        .zip(samples)
        .map(|(info, sample)| {
            let metrics = match sample {
                Ok(sample) => calculate(&sample),
                Err(e) => {
                    tracing::debug!(container = %info.name, error = %e, "stats unavailable");
                    ContainerMetrics::default()
                }
            };
            ContainerRow {
                short_id: info.id.chars().take(12).collect(),
                name: info.name,
                state: info.state,
                image: info.image,
                metrics,
            }
        })
        .collect())
}
