//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend of every pool
//! - Update backend liveness based on results

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::state::HealthPolicy;
use crate::load_balancer::backend::{Backend, Liveness};
use crate::load_balancer::pool::{BackendManager, BackendPool};
use crate::observability::metrics;

const USER_AGENT: &str = "gateway-server-health-check";

/// Result of probing one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    BadStatus(StatusCode),
    Error(String),
    Timeout,
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

pub struct HealthMonitor {
    backends: Arc<BackendManager>,
    config: HealthCheckConfig,
    policy: HealthPolicy,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(backends: Arc<BackendManager>, config: HealthCheckConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeout_secs)));
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            backends,
            policy: HealthPolicy::from(&config),
            config,
            client,
        }
    }

    /// Probe on every tick until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            timeout = self.config.timeout_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one probe cycle over all backends concurrently.
    pub async fn probe_all(&self) {
        let checks = self
            .backends
            .all_backends()
            .into_iter()
            .map(|(pool, backend)| self.check_backend(pool, backend));
        join_all(checks).await;
    }

    async fn check_backend(&self, pool: Arc<BackendPool>, backend: Arc<Backend>) {
        let outcome = self.probe(&backend).await;

        match &outcome {
            ProbeOutcome::Healthy => {
                tracing::debug!(pool = %pool.name(), backend = %backend, "Health check passed");
            }
            ProbeOutcome::BadStatus(status) => {
                tracing::debug!(pool = %pool.name(), backend = %backend, status = %status, "Health check failed: non-200 status");
            }
            ProbeOutcome::Error(e) => {
                tracing::debug!(pool = %pool.name(), backend = %backend, error = %e, "Health check failed: connection error");
            }
            ProbeOutcome::Timeout => {
                tracing::debug!(pool = %pool.name(), backend = %backend, "Health check failed: timeout");
            }
        }

        match self.policy.observe(&backend, outcome.is_healthy()) {
            Some(Liveness::Alive) => {
                tracing::info!(pool = %pool.name(), backend = %backend, "Backend is UP");
            }
            Some(Liveness::Dead) => {
                tracing::warn!(pool = %pool.name(), backend = %backend, reason = ?outcome, "Backend is DOWN");
            }
            None => {}
        }

        metrics::record_backend_health(pool.name(), &backend.to_string(), backend.is_alive());
    }

    /// Issue a single health request to a backend.
    pub async fn probe(&self, backend: &Backend) -> ProbeOutcome {
        let uri = match backend.uri_for(&self.config.path, None) {
            Ok(uri) => uri,
            Err(e) => return ProbeOutcome::Error(e.to_string()),
        };

        let request = match Request::get(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => return ProbeOutcome::Error(e.to_string()),
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => ProbeOutcome::Healthy,
            Ok(Ok(response)) => ProbeOutcome::BadStatus(response.status()),
            Ok(Err(e)) => ProbeOutcome::Error(e.to_string()),
            Err(_) => ProbeOutcome::Timeout,
        }
    }
}
