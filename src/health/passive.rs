//! Passive health checking (failure detection).
//!
//! # Responsibilities
//! - Observe forwarding failures reported by the dispatcher
//! - Optionally mark the failing backend dead without waiting for a probe
//!
//! # Design Decisions
//! - Disabled by default: liveness then changes only through active probes
//! - Only transport errors and timeouts count; any HTTP status is a response
//! - Recovery is always left to active probes

use crate::load_balancer::backend::Backend;

/// Reaction to forwarding failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveHealth {
    enabled: bool,
}

impl PassiveHealth {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Report a failed forward. Returns true if the backend was marked dead.
    pub fn report_failure(&self, pool: &str, backend: &Backend) -> bool {
        if !self.enabled || !backend.is_alive() {
            return false;
        }
        // Counts as a failure so recovery needs a fresh success streak.
        backend.record_failure();
        backend.set_alive(false);
        tracing::warn!(pool = %pool, backend = %backend, "Backend marked DOWN after forwarding failure");
        true
    }
}
