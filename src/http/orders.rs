//! Order placement endpoint.
//!
//! # Responsibilities
//! - Decode the client's order document
//! - Post it to an instance of the order pool
//! - Relay the downstream JSON answer
//!
//! # Design Decisions
//! - Errors are plain text, not the JSON error body used by the proxy path
//! - A decode failure is the client's fault (400); everything after it is 500

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::validation::check_orders_path;
use crate::config::{ConfigError, OrdersConfig};
use crate::http::proxy::Dispatcher;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::load_balancer::pool::{BackendManager, BackendPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub restaurant_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub menu_item_id: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("{0}")]
    Downstream(String),
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Malformed(_) | OrderError::Body(_) => StatusCode::BAD_REQUEST,
            OrderError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Places orders on the order pool.
pub struct OrderService {
    pool: Arc<BackendPool>,
    upstream_path: String,
    dispatcher: Dispatcher,
    max_body_bytes: usize,
}

impl OrderService {
    pub fn new(
        pool: Arc<BackendPool>,
        upstream_path: impl Into<String>,
        dispatcher: Dispatcher,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            pool,
            upstream_path: upstream_path.into(),
            dispatcher,
            max_body_bytes,
        }
    }

    pub fn from_config(
        config: &OrdersConfig,
        backends: &BackendManager,
        dispatcher: Dispatcher,
    ) -> Result<Self, ConfigError> {
        check_orders_path(&config.path).map_err(|e| ConfigError::Validation(vec![e]))?;
        let pool = backends.get(&config.pool).ok_or_else(|| ConfigError::UnknownPool {
            route: config.path.clone(),
            pool: config.pool.clone(),
        })?;
        Ok(Self::new(pool, config.upstream_path.as_str(), dispatcher, config.max_body_bytes))
    }

    /// Decode a raw order body.
    pub fn decode(body: &[u8]) -> Result<OrderRequest, OrderError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Post an order to the next live order instance and return its JSON answer.
    ///
    /// The answer is held to the same size limit as inbound order bodies.
    pub async fn place(
        &self,
        order: &OrderRequest,
        request_id: &str,
    ) -> Result<serde_json::Value, OrderError> {
        let backend = self.pool.select_next().ok_or_else(|| {
            OrderError::Downstream(format!("No available {} services", self.pool.name()))
        })?;

        let payload = serde_json::to_vec(order).map_err(|e| OrderError::Downstream(e.to_string()))?;
        let uri = backend
            .uri_for(&self.upstream_path, None)
            .map_err(|e| OrderError::Downstream(e.to_string()))?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Ok(id) = HeaderValue::from_str(request_id) {
            builder = builder.header(X_REQUEST_ID, id);
        }
        let request = builder
            .body(Body::from(payload))
            .map_err(|e| OrderError::Downstream(e.to_string()))?;

        tracing::info!(
            request_id = %request_id,
            pool = %self.pool.name(),
            backend = %backend,
            user_id = %order.user_id,
            items = order.items.len(),
            "Placing order"
        );

        let response = self
            .dispatcher
            .send(self.pool.name(), &backend, request)
            .await
            .map_err(|e| OrderError::Downstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            return Err(OrderError::Downstream(format!("Error: {}", reason)));
        }

        let body = axum::body::to_bytes(Body::new(response.into_body()), self.max_body_bytes)
            .await
            .map_err(|e| OrderError::Downstream(format!("Failed to read order response: {}", e)))?;
        serde_json::from_slice(&body).map_err(|e| OrderError::Downstream(e.to_string()))
    }
}

async fn place_order(
    State(service): State<Arc<OrderService>>,
    request: Request<Body>,
) -> Result<Json<serde_json::Value>, OrderError> {
    let request_id = request_id(&request).to_string();
    let body: Bytes = axum::body::to_bytes(request.into_body(), service.max_body_bytes)
        .await
        .map_err(|e| OrderError::Body(e.to_string()))?;

    let order = OrderService::decode(&body).inspect_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Rejected malformed order");
    })?;

    match service.place(&order, &request_id).await {
        Ok(confirmation) => Ok(Json(confirmation)),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Order placement failed");
            Err(e)
        }
    }
}

/// Router serving the order endpoint at `path`.
pub fn router(service: Arc<OrderService>, path: &str) -> axum::Router {
    axum::Router::new()
        .route(path, post(place_order))
        .with_state(service)
}
