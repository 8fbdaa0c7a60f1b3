//! HTTP gateway that spreads requests over pools of backend services.
//!
//! Requests are matched by path prefix to a pool, a live backend is picked
//! round robin, and the request is proxied to it. A background monitor probes
//! every backend's health endpoint and flips its liveness.

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
