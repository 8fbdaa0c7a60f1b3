//! Response handling.
//!
//! # Responsibilities
//! - Map gateway errors to status codes and JSON error bodies
//! - Serve the gateway's own liveness document
//!
//! # Design Decisions
//! - Pool exhaustion and transport failures both surface as 503
//! - Upstream timeouts surface as 504
//! - Error bodies are always `{"error": "..."}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::GatewayError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Liveness document of the gateway itself.
#[derive(Debug, Serialize)]
pub struct GatewayHealth {
    pub status: &'static str,
    pub service: &'static str,
}

pub async fn gateway_health() -> Json<GatewayHealth> {
    Json(GatewayHealth {
        status: "healthy",
        service: "gateway-server",
    })
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NoHealthyBackend(_) | GatewayError::Upstream { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::NoRoute(_) => StatusCode::NOT_FOUND,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to clients. Transport details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            GatewayError::Upstream { .. } => "Service temporarily unavailable".to_string(),
            GatewayError::UpstreamTimeout { .. } => "Upstream request timed out".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn exhausted_pool_is_503_json() {
        let response = GatewayError::NoHealthyBackend("order".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "No available order services" })
        );
    }

    #[tokio::test]
    async fn timeout_hides_backend() {
        let response = GatewayError::UpstreamTimeout {
            backend: "http://10.0.0.1:6001".into(),
            timeout: Duration::from_secs(1),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Upstream request timed out" })
        );
    }

    #[tokio::test]
    async fn gateway_health_body() {
        let response = gateway_health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "status": "healthy", "service": "gateway-server" })
        );
    }
}
