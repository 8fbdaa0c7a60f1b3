//! Backend health state machine.
//!
//! # States
//! - Alive: backend receives traffic
//! - Dead: backend skipped by selection
//!
//! # State Transitions
//! ```text
//! Alive → Dead: consecutive failures >= unhealthy_threshold
//! Dead → Alive: consecutive successes >= healthy_threshold
//! ```
//!
//! With both thresholds at 1 the latest probe alone decides the state.

use crate::config::HealthCheckConfig;
use crate::load_balancer::backend::{Backend, Liveness};

/// Consecutive-outcome thresholds applied to probe results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub unhealthy_threshold: u32,
    pub healthy_threshold: u32,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            unhealthy_threshold: 1,
            healthy_threshold: 1,
        }
    }
}

impl From<&HealthCheckConfig> for HealthPolicy {
    fn from(config: &HealthCheckConfig) -> Self {
        Self {
            unhealthy_threshold: config.unhealthy_threshold.max(1),
            healthy_threshold: config.healthy_threshold.max(1),
        }
    }
}

impl HealthPolicy {
    /// Apply one check outcome. Returns the new state if it changed.
    pub fn observe(&self, backend: &Backend, success: bool) -> Option<Liveness> {
        if success {
            let successes = backend.record_success();
            if !backend.is_alive() && successes >= self.healthy_threshold {
                backend.set_alive(true);
                return Some(Liveness::Alive);
            }
        } else {
            let failures = backend.record_failure();
            if backend.is_alive() && failures >= self.unhealthy_threshold {
                backend.set_alive(false);
                return Some(Liveness::Dead);
            }
        }
        None
    }
}
