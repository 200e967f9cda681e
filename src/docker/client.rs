//! Docker engine over the local socket (bollard)

use async_trait::async_trait;
use bollard::container::{ListContainersOptions, MemoryStatsStats, Stats, StatsOptions};
use bollard::Docker;
use futures::StreamExt;

use super::metrics::{ContainerSample, CpuReading, InterfaceCounters};
use super::{ContainerEngine, ContainerInfo, ContainerState};
use crate::error::{DashError, Result};

/// Local Docker engine
///
/// Connection problems are deferred to the first call so the panel can show
/// them instead of aborting startup.
pub struct BollardEngine {
    docker: std::result::Result<Docker, String>,
}

impl BollardEngine {
    pub fn connect() -> Self {
        let docker = Docker::connect_with_local_defaults().map_err(|e| e.to_string());
        if let Err(reason) = &docker {
            tracing::warn!(%reason, "docker client unavailable");
        }
        Self { docker }
    }

    fn client(&self) -> Result<&Docker> {
        self.docker
            .as_ref()
            .map_err(|reason| DashError::EngineUnavailable {
                reason: reason.clone(),
            })
    }
}

impl std::fmt::Debug for BollardEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BollardEngine")
            .field("connected", &self.docker.is_ok())
            .finish()
    }
}

/// Server-side errors mean the engine answered; anything else means it didn't.
fn map_list_error(err: bollard::errors::Error) -> DashError {
    match err {
        bollard::errors::Error::DockerResponseServerError { message, .. } => {
            DashError::EngineRequest { reason: message }
        }
        other => DashError::EngineUnavailable {
            reason: other.to_string(),
        },
    }
}

fn cpu_reading(stats: &bollard::container::CPUStats) -> CpuReading {
    CpuReading {
        total_usage: Some(stats.cpu_usage.total_usage),
        system_usage: stats.system_cpu_usage,
        online_cpus: stats.online_cpus,
        percpu_len: stats.cpu_usage.percpu_usage.as_ref().map(|v| v.len()),
    }
}

/// Reduce a bollard stats payload to the calculator's input.
fn sample_from_stats(stats: &Stats) -> ContainerSample {
    let mem_cache = stats.memory_stats.stats.as_ref().map(|s| match s {
        MemoryStatsStats::V1(v1) => v1.cache,
        MemoryStatsStats::V2(v2) => v2.inactive_file,
    });

    let networks = stats
        .networks
        .as_ref()
        .map(|nets| {
            nets.values()
                .map(|n| InterfaceCounters {
                    rx_bytes: n.rx_bytes,
                    tx_bytes: n.tx_bytes,
                })
                .collect()
        })
        .unwrap_or_default();

    ContainerSample {
        cpu: cpu_reading(&stats.cpu_stats),
        precpu: cpu_reading(&stats.precpu_stats),
        mem_usage: stats.memory_stats.usage,
        mem_cache,
        mem_limit: stats.memory_stats.limit,
        networks,
    }
}

fn display_name(names: Option<&Vec<String>>) -> String {
    names
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default()
}

#[async_trait]
impl ContainerEngine for BollardEngine {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let docker = self.client()?;
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let summaries = docker
            .list_containers(Some(options))
            .await
            .map_err(map_list_error)?;

        Ok(summaries
            .into_iter()
            .map(|c| ContainerInfo {
                name: display_name(c.names.as_ref()),
                id: c.id.unwrap_or_default(),
                state: ContainerState::parse(c.state.as_deref().unwrap_or("unknown")),
                image: c.image.unwrap_or_default(),
            })
            .collect())
    }

    async fn sample(&self, id: &str) -> Result<ContainerSample> {
        let docker = self.client()?;
        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let mut stream = docker.stats(id, Some(options));
        match stream.next().await {
            Some(Ok(stats)) => Ok(sample_from_stats(&stats)),
            Some(Err(e)) => Err(DashError::EngineRequest {
                reason: e.to_string(),
            }),
            None => Err(DashError::EngineRequest {
                reason: format!("no stats returned for {}", id),
            }),
        }
    }
}
