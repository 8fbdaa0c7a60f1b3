//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing pools)
//! - Validate backend addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::load_balancer::backend::Backend;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid listener bind address {0:?}")]
    BindAddress(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("pool name must not be empty")]
    EmptyPoolName,

    #[error("pool {0:?} is defined more than once")]
    DuplicatePool(String),

    #[error("pool {0:?} has no backends")]
    EmptyPool(String),

    #[error("pool {pool:?}: {reason}")]
    BackendAddress { pool: String, reason: String },

    #[error("route {route:?} references unknown pool {pool:?}")]
    UnknownPool { route: String, pool: String },

    #[error("route {route:?} path prefix {prefix:?} must start with '/'")]
    PathPrefix { route: String, prefix: String },

    #[error("orders endpoint references unknown pool {0:?}")]
    UnknownOrdersPool(String),

    #[error("orders path {path:?} {reason}")]
    OrdersPath { path: String, reason: &'static str },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut pool_names = HashSet::new();
    for pool in &config.pools {
        if pool.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPoolName);
        }
        if !pool_names.insert(pool.name.as_str()) {
            errors.push(ValidationError::DuplicatePool(pool.name.clone()));
        }
        if pool.backends.is_empty() {
            errors.push(ValidationError::EmptyPool(pool.name.clone()));
        }
        for address in &pool.backends {
            if let Err(e) = Backend::parse(address) {
                errors.push(ValidationError::BackendAddress {
                    pool: pool.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    for route in &config.routes {
        if !pool_names.contains(route.pool.as_str()) {
            errors.push(ValidationError::UnknownPool {
                route: route.name.clone(),
                pool: route.pool.clone(),
            });
        }
        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::PathPrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }
    }

    if config.orders.enabled {
        if !pool_names.contains(config.orders.pool.as_str()) {
            errors.push(ValidationError::UnknownOrdersPool(config.orders.pool.clone()));
        }
        if let Err(e) = check_orders_path(&config.orders.path) {
            errors.push(e);
        }
    }

    let hc = &config.health_check;
    if hc.interval_secs == 0 {
        errors.push(ValidationError::Zero("health_check.interval_secs"));
    }
    if hc.timeout_secs == 0 {
        errors.push(ValidationError::Zero("health_check.timeout_secs"));
    }
    if hc.unhealthy_threshold == 0 {
        errors.push(ValidationError::Zero("health_check.unhealthy_threshold"));
    }
    if hc.healthy_threshold == 0 {
        errors.push(ValidationError::Zero("health_check.healthy_threshold"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The order endpoint is mounted as a literal axum route next to `/health`
/// and `/admin/*`, so it must be absolute, capture-free and clear of both.
pub fn check_orders_path(path: &str) -> Result<(), ValidationError> {
    let reason = if !path.starts_with('/') {
        Some("must start with '/'")
    } else if path.contains(['{', '}', '*']) {
        Some("must not contain path captures")
    } else if path == "/health" || path == "/admin" || path.starts_with("/admin/") {
        Some("collides with a built-in endpoint")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::OrdersPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PoolConfig, RouteConfig};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.pools[0].backends.push("localhost:5003".into());
        config.routes.push(RouteConfig {
            name: "payments".into(),
            path_prefix: "payments".into(),
            pool: "payment".into(),
        });
        config.health_check.interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{:?}", errors);
        assert!(errors.contains(&ValidationError::BindAddress("nowhere".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::BackendAddress { .. })));
        assert!(errors.contains(&ValidationError::UnknownPool {
            route: "payments".into(),
            pool: "payment".into(),
        }));
        assert!(errors.contains(&ValidationError::Zero("health_check.interval_secs")));
    }

    #[test]
    fn empty_and_duplicate_pools() {
        let mut config = GatewayConfig::default();
        config.pools.push(PoolConfig {
            name: "order".into(),
            backends: vec![],
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicatePool("order".into())));
        assert!(errors.contains(&ValidationError::EmptyPool("order".into())));
    }

    #[test]
    fn orders_pool_must_exist_when_enabled() {
        let mut config = GatewayConfig::default();
        config.orders.pool = "checkout".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::UnknownOrdersPool("checkout".into())])
        );

        config.orders.enabled = false;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn orders_path_must_be_a_free_absolute_path() {
        let mut config = GatewayConfig::default();
        for path in ["api/orders", "", "/health", "/admin", "/admin/orders", "/api/{id}"] {
            config.orders.path = path.into();
            let errors = validate_config(&config).unwrap_err();
            assert!(
                matches!(errors.as_slice(), [ValidationError::OrdersPath { .. }]),
                "{path:?}: {errors:?}"
            );
        }

        config.orders.path = "/api/v2/orders".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.orders.path = "api/orders".into();
        config.orders.enabled = false;
        assert_eq!(validate_config(&config), Ok(()));
    }
}
