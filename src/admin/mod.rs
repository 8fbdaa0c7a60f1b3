//! Read-only admin API.
//!
//! # Endpoints
//! - `GET /admin/status`: version and per-pool health counts
//! - `GET /admin/backends`: every backend with its liveness
//!
//! Both sit behind an optional bearer key.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::load_balancer::pool::BackendManager;
use self::auth::admin_auth_middleware;
use self::handlers::{get_backends, get_status};

pub fn router(backends: Arc<BackendManager>, api_key: Option<String>) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .layer(middleware::from_fn_with_state(api_key, admin_auth_middleware))
        .with_state(backends)
}
