//! Request dispatch to backend pools.
//!
//! # Responsibilities
//! - Ask the pool for the next live backend
//! - Rewrite the request onto that backend and forward it
//! - Stream the backend response back unmodified
//! - Turn exhaustion, transport failures and timeouts into gateway errors
//!
//! # Design Decisions
//! - Selection and forwarding are separate steps; no lock is held while forwarding
//! - No retry and no fallback pool
//! - Liveness is only touched here when passive health is enabled

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderValue, Request, Version};
use axum::response::Response;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::TimeoutConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::health::passive::PassiveHealth;
use crate::http::headers::{add_forwarded, strip_hop_by_hop};
use crate::http::request::request_id;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;

/// Forwards requests to the backends of a pool.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
    passive: PassiveHealth,
}

impl Dispatcher {
    pub fn new(timeouts: &TimeoutConfig, passive: PassiveHealth) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
            passive,
        }
    }

    /// Select a backend from `pool` and forward `request` to it.
    pub async fn forward(&self, pool: &BackendPool, request: Request<Body>) -> GatewayResult<Response> {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(&request).to_string();

        let Some(backend) = pool.select_next() else {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                pool = %pool.name(),
                "No available services"
            );
            metrics::record_pool_exhausted(pool.name());
            return Err(GatewayError::NoHealthyBackend(pool.name().to_string()));
        };

        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            pool = %pool.name(),
            backend = %backend,
            "Routing request"
        );

        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        let upstream = upstream_request(request, &backend, client_addr)?;

        match self.send(pool.name(), &backend, upstream).await {
            Ok(response) => {
                metrics::record_request(
                    pool.name(),
                    method.as_str(),
                    response.status().as_u16(),
                    &backend.to_string(),
                    start,
                );
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Err(e) => {
                metrics::record_request(
                    pool.name(),
                    method.as_str(),
                    e.status_code().as_u16(),
                    &backend.to_string(),
                    start,
                );
                Err(e)
            }
        }
    }

    /// Send an already-rewritten request to `backend`, bounded by the upstream timeout.
    pub async fn send(
        &self,
        pool: &str,
        backend: &Backend,
        request: Request<Body>,
    ) -> GatewayResult<Response<Incoming>> {
        match time::timeout(self.upstream_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) => {
                tracing::error!(pool = %pool, backend = %backend, error = %source, "Upstream error");
                self.passive.report_failure(pool, backend);
                Err(GatewayError::Upstream {
                    backend: backend.to_string(),
                    source,
                })
            }
            Err(_) => {
                tracing::error!(pool = %pool, backend = %backend, timeout = ?self.upstream_timeout, "Upstream timeout");
                self.passive.report_failure(pool, backend);
                Err(GatewayError::UpstreamTimeout {
                    backend: backend.to_string(),
                    timeout: self.upstream_timeout,
                })
            }
        }
    }
}

/// Rewrite an inbound request so it targets `backend`.
pub fn upstream_request(
    request: Request<Body>,
    backend: &Backend,
    client: Option<SocketAddr>,
) -> GatewayResult<Request<Body>> {
    let (mut parts, body) = request.into_parts();
    let inbound_authority = parts.uri.authority().cloned();

    parts.uri = backend.uri_for(parts.uri.path(), parts.uri.query())?;
    // The upstream client speaks HTTP/1.1 regardless of the inbound protocol.
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    add_forwarded(&mut parts.headers, inbound_authority.as_ref(), client);
    if let Ok(host) = HeaderValue::from_str(backend.authority().as_str()) {
        parts.headers.insert(header::HOST, host);
    }

    Ok(Request::from_parts(parts, body))
}
