//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the backend pools, routes and dispatcher from configuration
//! - Create the Axum router with the gateway's own endpoints
//! - Wire up middleware (request ID, tracing)
//! - Run the health monitor next to the listener
//! - Stop both on the shutdown broadcast

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin;
use crate::config::{ConfigError, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::health::active::HealthMonitor;
use crate::health::passive::PassiveHealth;
use crate::http::orders::{self, OrderService};
use crate::http::proxy::Dispatcher;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::gateway_health;
use crate::lifecycle::Shutdown;
use crate::load_balancer::pool::BackendManager;
use crate::routing::Router as RouteTable;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub dispatcher: Dispatcher,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    backends: Arc<BackendManager>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let backends = Arc::new(BackendManager::new(&config.pools)?);
        Self::with_backends(config, backends)
    }

    /// Create a server over pools that were built elsewhere.
    pub fn with_backends(
        config: GatewayConfig,
        backends: Arc<BackendManager>,
    ) -> Result<Self, ConfigError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes, &backends)?);
        let dispatcher = Dispatcher::new(
            &config.timeouts,
            PassiveHealth::new(config.health_check.passive),
        );

        let state = AppState {
            routes,
            dispatcher: dispatcher.clone(),
        };

        let router = Self::build_router(&config, &backends, state, dispatcher)?;
        Ok(Self {
            router,
            config,
            backends,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        backends: &Arc<BackendManager>,
        state: AppState,
        dispatcher: Dispatcher,
    ) -> Result<Router, ConfigError> {
        let mut router = Router::new()
            .route("/health", get(gateway_health))
            .fallback(dispatch)
            .with_state(state);

        if config.orders.enabled {
            let service = OrderService::from_config(&config.orders, backends, dispatcher)?;
            router = router.merge(orders::router(Arc::new(service), &config.orders.path));
        }

        if config.admin.enabled {
            if config.admin.api_key.is_none() {
                tracing::warn!("Admin API enabled without an api_key; backend details are public");
            }
            router = router.merge(admin::router(backends.clone(), config.admin.api_key.clone()));
        }

        Ok(router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        ))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            pools = self.backends.pools().len(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.backends.clone(), self.config.health_check.clone());
        let monitor_handle = tokio::spawn(monitor.run(shutdown.subscribe()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let mut stop = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        if let Err(e) = monitor_handle.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn backends(&self) -> &Arc<BackendManager> {
        &self.backends
    }

    /// The assembled router, for serving without the health monitor.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Route the request to a pool and forward it.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> GatewayResult<Response> {
    let path = request.uri().path().to_string();

    let Some(route) = state.routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id(&request), path = %path, "No route matched");
        return Err(GatewayError::NoRoute(path));
    };
    let pool = route.pool.clone();

    state.dispatcher.forward(&pool, request).await
}
