//! Network probes: local ports, service health, ping and public IP
//!
//! Every probe is bounded by a timeout from [`crate::util::constants`]. A
//! failed probe is a value (`NOT OK`, `N/A`), never a panel error; only the
//! public IP lookup returns `Err` so the caller can keep its previous value.

use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Deserialize;
use tokio::net::TcpStream;
use url::Url;

use crate::config::{PortEntry, ServiceEntry};
use crate::error::{DashError, Result};
use crate::util::constants::{HTTP_TIMEOUT, LOCAL_PORT_TIMEOUT, PROBE_TIMEOUT};

/// Endpoint used for the ping latency figure
pub const PING_TARGET: &str = "8.8.8.8:443";

/// Public IP lookup endpoint
pub const PUBLIC_IP_URL: &str = "http://ip-api.com/json/";

/// Shared HTTP client for service checks and the public IP lookup
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("devtop/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Time a TCP handshake to `addr`.
pub async fn tcp_latency(addr: &str, timeout: Duration) -> Result<Duration> {
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Ok(start.elapsed()),
        Ok(Err(e)) => Err(DashError::Probe {
            target: addr.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(DashError::Probe {
            target: addr.to_string(),
            reason: format!("no answer within {}ms", timeout.as_millis()),
        }),
    }
}

/// Round-trip estimate to a well-known host, `None` when unreachable.
pub async fn ping() -> Option<Duration> {
    tcp_latency(PING_TARGET, PROBE_TIMEOUT).await.ok()
}

// ═══════════════════════════════════════════════════════════════
// Ports
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub name: String,
    pub port: u16,
    pub open: bool,
}

/// Whether something accepts connections on `127.0.0.1:port`.
pub async fn port_open(port: u16) -> bool {
    tcp_latency(&format!("127.0.0.1:{}", port), LOCAL_PORT_TIMEOUT)
        .await
        .is_ok()
}

/// Probe every configured port concurrently, in configuration order.
pub async fn scan_ports(entries: &[PortEntry]) -> Vec<PortStatus> {
    join_all(entries.iter().map(|entry| async move {
        PortStatus {
            name: entry.name.clone(),
            port: entry.port,
            open: port_open(entry.port).await,
        }
    }))
    .await
}

// ═══════════════════════════════════════════════════════════════
// Services
// ═══════════════════════════════════════════════════════════════

/// How a service entry is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTarget {
    /// GET the URL, healthy on HTTP 200
    Http(Url),
    /// TCP handshake on 443, then 80
    Host(String),
}

impl ServiceTarget {
    pub fn classify(host: &str) -> Self {
        match Url::parse(host) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => ServiceTarget::Http(url),
            _ => ServiceTarget::Host(host.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    pub host: String,
    pub latency: Option<Duration>,
}

impl ServiceStatus {
    pub fn is_ok(&self) -> bool {
        self.latency.is_some()
    }
}

async fn http_check(client: &reqwest::Client, url: Url) -> Option<Duration> {
    let start = Instant::now();
    match client.get(url.clone()).send().await {
        Ok(resp) if resp.status() == reqwest::StatusCode::OK => Some(start.elapsed()),
        Ok(resp) => {
            tracing::debug!(%url, status = %resp.status(), "service check non-200");
            None
        }
        Err(e) => {
            tracing::debug!(%url, error = %e, "service check failed");
            None
        }
    }
}

async fn host_check(host: &str) -> Option<Duration> {
    for port in [443, 80] {
        if let Ok(latency) = tcp_latency(&format!("{}:{}", host, port), PROBE_TIMEOUT).await {
            return Some(latency);
        }
    }
    None
}

pub async fn check_service(client: &reqwest::Client, entry: &ServiceEntry) -> ServiceStatus {
    let latency = match ServiceTarget::classify(&entry.host) {
        ServiceTarget::Http(url) => http_check(client, url).await,
        ServiceTarget::Host(host) => host_check(&host).await,
    };
    ServiceStatus {
        name: entry.name.clone(),
        host: entry.host.clone(),
        latency,
    }
}

/// Check every service concurrently, in configuration order.
pub async fn check_services(client: &reqwest::Client, entries: &[ServiceEntry]) -> Vec<ServiceStatus> {
    join_all(entries.iter().map(|entry| check_service(client, entry))).await
}

// ═══════════════════════════════════════════════════════════════
// Public IP
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIp {
    pub ip: String,
    pub country: String,
    pub isp: String,
    pub city: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    isp: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    message: Option<String>,
}

/// Parse an ip-api.com body. Anything but `status: success` is an error.
pub fn parse_public_ip(body: &str) -> Result<PublicIp> {
    let resp: IpApiResponse =
        serde_json::from_str(body).map_err(|e| DashError::UnexpectedResponse {
            target: PUBLIC_IP_URL.to_string(),
            reason: e.to_string(),
        })?;

    if resp.status != "success" {
        return Err(DashError::UnexpectedResponse {
            target: PUBLIC_IP_URL.to_string(),
            reason: resp.message.unwrap_or(resp.status),
        });
    }

    Ok(PublicIp {
        ip: resp.query,
        country: resp.country_code,
        isp: resp.isp,
        city: resp.city,
    })
}

pub async fn fetch_public_ip(client: &reqwest::Client) -> Result<PublicIp> {
    let body = client
        .get(PUBLIC_IP_URL)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_public_ip(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_classify_service_targets() {
        assert!(matches!(
            ServiceTarget::classify("http://127.0.0.1:3000/"),
            ServiceTarget::Http(_)
        ));
        assert!(matches!(
            ServiceTarget::classify("https://gitlab.com"),
            ServiceTarget::Http(_)
        ));
        assert_eq!(
            ServiceTarget::classify("8.8.8.8"),
            ServiceTarget::Host("8.8.8.8".into())
        );
        assert_eq!(
            ServiceTarget::classify("gitlab.com"),
            ServiceTarget::Host("gitlab.com".into())
        );
    }

    #[test]
    fn test_parse_public_ip_success() {
        let body = r#"{"status":"success","country":"Morocco","countryCode":"MA","city":"Rabat","isp":"Maroc Telecom","query":"41.250.1.2"}"#;
        let ip = parse_public_ip(body).unwrap();
        assert_eq!(ip.ip, "41.250.1.2");
        assert_eq!(ip.country, "MA");
        assert_eq!(ip.isp, "Maroc Telecom");
        assert_eq!(ip.city, "Rabat");
    }

    #[test]
    fn test_parse_public_ip_fail_status() {
        let err = parse_public_ip(r#"{"status":"fail","message":"reserved range"}"#).unwrap_err();
        assert!(err.to_string().contains("reserved range"));
    }

    #[test]
    fn test_parse_public_ip_garbage() {
        assert!(matches!(
            parse_public_ip("<html>"),
            Err(DashError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_ports_open_and_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // Grab a free port, then release it so nothing listens there
        let closed_port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };

        let entries = vec![
            PortEntry {
                name: "app".into(),
                port: open_port,
            },
            PortEntry {
                name: "gone".into(),
                port: closed_port,
            },
        ];
        let statuses = scan_ports(&entries).await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].open);
        assert_eq!(statuses[0].name, "app");
        assert!(!statuses[1].open);
    }

    #[tokio::test]
    async fn test_tcp_latency_refused_is_probe_error() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };
        let err = tcp_latency(&format!("127.0.0.1:{}", port), Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, DashError::Probe { .. }));
    }
}
