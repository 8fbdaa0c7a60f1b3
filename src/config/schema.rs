//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend pools, one per logical service.
    pub pools: Vec<PoolConfig>,

    /// Path prefix routes mapping requests to pools.
    pub routes: Vec<RouteConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Order placement endpoint.
    pub orders: OrdersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Read-only admin endpoints.
    pub admin: AdminConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            pools: vec![
                PoolConfig {
                    name: "restaurant".to_string(),
                    backends: vec![
                        "http://localhost:5001".to_string(),
                        "http://localhost:5002".to_string(),
                    ],
                },
                PoolConfig {
                    name: "order".to_string(),
                    backends: vec![
                        "http://localhost:6001".to_string(),
                        "http://localhost:6002".to_string(),
                    ],
                },
            ],
            routes: vec![
                RouteConfig {
                    name: "restaurants".to_string(),
                    path_prefix: "/restaurants".to_string(),
                    pool: "restaurant".to_string(),
                },
                RouteConfig {
                    name: "orders".to_string(),
                    path_prefix: "/orders".to_string(),
                    pool: "order".to_string(),
                },
            ],
            health_check: HealthCheckConfig::default(),
            timeouts: TimeoutConfig::default(),
            orders: OrdersConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8001".to_string(),
        }
    }
}

/// A pool of interchangeable backends.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Pool name referenced by routes (e.g. "restaurant").
    pub name: String,

    /// Backend base URLs, in rotation order.
    pub backends: Vec<String>,
}

/// Route configuration mapping a path prefix to a pool.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Path prefix to match ("/orders" matches "/orders" and "/orders/...").
    pub path_prefix: String,

    /// Pool to forward to.
    pub pool: String,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,

    /// Path to probe on every backend.
    pub path: String,

    /// Number of consecutive failures before marking dead.
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking alive.
    pub healthy_threshold: u32,

    /// Mark a backend dead as soon as forwarding to it fails.
    pub passive: bool,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 2,
            path: "/health".to_string(),
            unhealthy_threshold: 1,
            healthy_threshold: 1,
            passive: false,
        }
    }
}

/// Timeout configuration for upstream traffic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for a backend to start responding, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Order placement endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Enable the order placement endpoint.
    pub enabled: bool,

    /// Gateway path accepting `POST` order requests.
    pub path: String,

    /// Pool that processes orders.
    pub pool: String,

    /// Path on the order backend receiving the order.
    pub upstream_path: String,

    /// Maximum order body in bytes, for both the client request and the order service answer.
    pub max_body_bytes: usize,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/api/orders".to_string(),
            pool: "order".to_string(),
            upstream_path: "/orders".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Expose `/admin/*` on the gateway listener. Off unless asked for.
    pub enabled: bool,

    /// Bearer token required by admin endpoints, if set.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_local_deployment() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8001");
        assert_eq!(config.pools.len(), 2);
        assert_eq!(config.pools[0].backends[1], "http://localhost:5002");
        assert_eq!(config.health_check.interval_secs, 10);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert_eq!(config.health_check.unhealthy_threshold, 1);
        assert!(!config.admin.enabled);
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [health_check]
            interval_secs = 3
            passive = true

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.health_check.interval_secs, 3);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert!(config.health_check.passive);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn explicit_pools_replace_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[pools]]
            name = "menu"
            backends = ["http://10.0.0.1:8080"]

            [[routes]]
            name = "menu"
            path_prefix = "/menu"
            pool = "menu"
            "#,
        )
        .unwrap();

        assert_eq!(config.pools.len(), 1);
        assert_eq!(config.pools[0].name, "menu");
        assert_eq!(config.routes[0].pool, "menu");
    }
}
