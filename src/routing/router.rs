//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes bound to their pools
//! - Look up the matching route for a request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins; ties keep configuration order
//! - Explicit no-match rather than silent default

use std::sync::Arc;

use crate::config::{ConfigError, RouteConfig};
use crate::load_balancer::pool::{BackendManager, BackendPool};
use crate::routing::matcher::PathPrefixMatcher;

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub matcher: PathPrefixMatcher,
    pub pool: Arc<BackendPool>,
}

/// Maps request paths to pools.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(mut routes: Vec<Route>) -> Self {
        routes.sort_by(|a, b| b.matcher.prefix().len().cmp(&a.matcher.prefix().len()));
        Self { routes }
    }

    /// Compile routes, resolving each pool name against the backend manager.
    pub fn from_config(configs: &[RouteConfig], backends: &BackendManager) -> Result<Self, ConfigError> {
        let routes = configs
            .iter()
            .map(|config| {
                let pool = backends.get(&config.pool).ok_or_else(|| ConfigError::UnknownPool {
                    route: config.name.clone(),
                    pool: config.pool.clone(),
                })?;
                Ok(Route {
                    name: config.name.clone(),
                    matcher: PathPrefixMatcher::new(config.path_prefix.as_str()),
                    pool,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        for route in &routes {
            tracing::debug!(route = %route.name, prefix = %route.matcher.prefix(), pool = %route.pool.name(), "Route compiled");
        }
        Ok(Self::new(routes))
    }

    /// Find the route for a path.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn router(routes: &[RouteConfig]) -> Router {
        let config = GatewayConfig::default();
        let backends = BackendManager::new(&config.pools).unwrap();
        Router::from_config(routes, &backends).unwrap()
    }

    #[test]
    fn default_routes_pick_pools() {
        let router = router(&GatewayConfig::default().routes);

        assert_eq!(router.match_path("/restaurants").unwrap().pool.name(), "restaurant");
        assert_eq!(router.match_path("/restaurants/3/menu").unwrap().pool.name(), "restaurant");
        assert_eq!(router.match_path("/orders/ORD-000001").unwrap().pool.name(), "order");
        assert!(router.match_path("/health").is_none());
        assert!(router.match_path("/").is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let router = router(&[
            RouteConfig {
                name: "catch-all".into(),
                path_prefix: "/".into(),
                pool: "restaurant".into(),
            },
            RouteConfig {
                name: "orders".into(),
                path_prefix: "/orders".into(),
                pool: "order".into(),
            },
        ]);

        assert_eq!(router.match_path("/orders/1").unwrap().name, "orders");
        assert_eq!(router.match_path("/menu").unwrap().name, "catch-all");
    }

    #[test]
    fn unknown_pool_is_a_config_error() {
        let backends = BackendManager::new(&GatewayConfig::default().pools).unwrap();
        let result = Router::from_config(
            &[RouteConfig {
                name: "payments".into(),
                path_prefix: "/payments".into(),
                pool: "payment".into(),
            }],
            &backends,
        );
        assert!(matches!(result, Err(ConfigError::UnknownPool { .. })));
    }
}
