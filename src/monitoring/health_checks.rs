// src/monitoring/health_checks.rs - Backend health monitoring and readiness

use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
}

/// One backend to probe
#[derive(Debug, Clone)]
pub struct BackendCheck {
    pub name: String,
    pub health_url: String,
}

impl BackendCheck {
    /// Derive the health endpoint of a backend from one of its source URLs
    pub fn for_source(name: &str, source_url: &str) -> Self {
        let health_url = match Url::parse(source_url) {
            Ok(mut url) => {
                url.set_path("/__health");
                url.set_query(None);
                url.to_string()
            }
            Err(_) => format!("{}/__health", source_url.trim_end_matches('/')),
        };
        Self {
            name: name.to_string(),
            health_url,
        }
    }
}

/// Probes every configured backend and aggregates the results
pub struct HealthService {
    client: Client,
    checks: Vec<BackendCheck>,
}

impl HealthService {
    pub fn new(client: Client, checks: Vec<BackendCheck>) -> Self {
        Self { client, checks }
    }

    /// Probe all backends in parallel and aggregate into one report
    pub async fn check_all(&self) -> HealthReport {
        let probes: Vec<_> = self.checks.iter().map(|check| self.check_one(check)).collect();
        aggregate(join_all(probes).await)
    }

    /// Readiness view of the same aggregation: the first failing backend's
    /// message, or Ok when every backend answered healthy
    pub async fn good_to_go(&self) -> Result<(), String> {
        let report = self.check_all().await;
        for component in report.components {
            if component.status != HealthStatus::Healthy {
                return Err(component
                    .message
                    .unwrap_or_else(|| format!("{} failed its health check", component.name)));
            }
        }
        Ok(())
    }

    async fn check_one(&self, check: &BackendCheck) -> ComponentHealth {
        match self.client.get(&check.health_url).send().await {
            Ok(response) if response.status().is_success() => ComponentHealth {
                name: check.name.clone(),
                status: HealthStatus::Healthy,
                message: None,
            },
            Ok(response) => {
                let message = format!(
                    "{} is not responding with OK, status={}",
                    check.name,
                    response.status().as_u16()
                );
                warn!("{}", message);
                ComponentHealth {
                    name: check.name.clone(),
                    status: HealthStatus::Unhealthy,
                    message: Some(message),
                }
            }
            Err(err) => {
                let message = format!("{} is unreachable: {}", check.name, err);
                warn!("{}", message);
                ComponentHealth {
                    name: check.name.clone(),
                    status: HealthStatus::Unhealthy,
                    message: Some(message),
                }
            }
        }
    }
}

fn aggregate(components: Vec<ComponentHealth>) -> HealthReport {
    let status = if components
        .iter()
        .all(|component| component.status == HealthStatus::Healthy)
    {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    HealthReport { status, components }
}
