//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use gateway_server::config::{GatewayConfig, PoolConfig};
use gateway_server::load_balancer::BackendManager;
use gateway_server::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A mock backend service on an ephemeral port.
///
/// `GET /health` answers 200 while healthy and 503 otherwise, `POST /orders`
/// confirms orders while healthy, and every other path echoes `<name> <path>`.
pub struct MockBackend {
    pub name: &'static str,
    pub addr: SocketAddr,
    healthy: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

pub async fn start_mock_backend(name: &'static str) -> MockBackend {
    let healthy = Arc::new(AtomicBool::new(true));

    let health_flag = healthy.clone();
    let orders_flag = healthy.clone();
    let app = Router::new()
        .route(
            "/health",
            get(move || {
                let healthy = health_flag.load(Ordering::SeqCst);
                async move {
                    if healthy {
                        StatusCode::OK
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                }
            }),
        )
        .route(
            "/orders",
            post(move |headers: HeaderMap, Json(order): Json<serde_json::Value>| {
                let healthy = orders_flag.load(Ordering::SeqCst);
                async move {
                    if !healthy {
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    Json(serde_json::json!({
                        "orderId": "ORD-000001",
                        "status": "CREATED",
                        "servedBy": name,
                        "userId": order["userId"],
                        "requestId": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
                    }))
                    .into_response()
                }
            }),
        )
        .fallback(move |uri: Uri| async move { format!("{} {}", name, uri.path()) });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        name,
        addr,
        healthy,
    }
}

/// An address nothing listens on.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

/// Gateway configuration over the given pools, with the probe loop off so
/// tests drive health cycles themselves.
pub fn gateway_config(restaurant: Vec<String>, order: Vec<String>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.pools = vec![
        PoolConfig {
            name: "restaurant".to_string(),
            backends: restaurant,
        },
        PoolConfig {
            name: "order".to_string(),
            backends: order,
        },
    ];
    config.health_check.enabled = false;
    config.admin.enabled = true;
    config.timeouts.upstream_secs = 5;
    config
}

pub struct RunningGateway {
    pub addr: SocketAddr,
    pub backends: Arc<BackendManager>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let server = HttpServer::new(config).unwrap();
    let backends = server.backends().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    RunningGateway {
        addr,
        backends,
        shutdown,
        handle,
    }
}
