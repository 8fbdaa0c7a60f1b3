//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered backend list of each service pool
//! - Apply the load balancing strategy to select a backend
//! - Expose every pool to the health monitor and admin views

use std::sync::Arc;

use crate::config::PoolConfig;
use crate::load_balancer::{
    backend::{AddressError, Backend},
    round_robin::RoundRobin,
    LoadBalancer,
};

/// A named group of interchangeable backends.
#[derive(Debug)]
pub struct BackendPool {
    name: String,
    backends: Vec<Arc<Backend>>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Create a round-robin pool.
    pub fn new(name: impl Into<String>, backends: Vec<Arc<Backend>>) -> Self {
        Self::with_balancer(name, backends, Box::new(RoundRobin::new()))
    }

    pub fn with_balancer(
        name: impl Into<String>,
        backends: Vec<Arc<Backend>>,
        balancer: Box<dyn LoadBalancer>,
    ) -> Self {
        Self {
            name: name.into(),
            backends,
            balancer,
        }
    }

    /// Build a pool from raw backend addresses, in order.
    pub fn from_addresses<S: AsRef<str>>(
        name: impl Into<String>,
        addresses: &[S],
    ) -> Result<Self, AddressError> {
        let backends = addresses
            .iter()
            .map(|a| Backend::parse(a.as_ref()).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, backends))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Select the next live backend, or `None` when every backend is dead.
    pub fn select_next(&self) -> Option<Arc<Backend>> {
        let selected = self.balancer.next_server(&self.backends);
        match &selected {
            Some(backend) => {
                tracing::debug!(pool = %self.name, backend = %backend, "Selected backend");
            }
            None => {
                tracing::debug!(pool = %self.name, backend_count = self.backends.len(), "No healthy backends in pool");
            }
        }
        selected
    }

    /// Number of backends currently alive.
    pub fn healthy_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}

/// Owns every pool, in configuration order.
#[derive(Debug, Default)]
pub struct BackendManager {
    pools: Vec<Arc<BackendPool>>,
}

impl BackendManager {
    /// Create a backend manager from configuration.
    pub fn new(configs: &[PoolConfig]) -> Result<Self, AddressError> {
        let pools = configs
            .iter()
            .map(|c| BackendPool::from_addresses(c.name.clone(), &c.backends).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pools })
    }

    pub fn from_pools(pools: Vec<Arc<BackendPool>>) -> Self {
        Self { pools }
    }

    /// Look up a pool by name.
    pub fn get(&self, name: &str) -> Option<Arc<BackendPool>> {
        self.pools.iter().find(|p| p.name() == name).cloned()
    }

    pub fn pools(&self) -> &[Arc<BackendPool>] {
        &self.pools
    }

    /// Every backend with the pool it belongs to (for health checking).
    pub fn all_backends(&self) -> Vec<(Arc<BackendPool>, Arc<Backend>)> {
        self.pools
            .iter()
            .flat_map(|pool| pool.backends().iter().map(move |b| (pool.clone(), b.clone())))
            .collect()
    }
}
