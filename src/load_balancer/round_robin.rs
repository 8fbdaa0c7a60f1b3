//! Round-robin load balancing strategy.

use std::sync::{Arc, Mutex, PoisonError};

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector.
///
/// The cursor advances once per scanned candidate, so dead backends are
/// skipped without shifting the rotation of the live ones.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<u64>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor value.
    pub fn cursor(&self) -> u64 {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let len = backends.len() as u64;
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);

        // At most one full rotation; gives up instead of spinning when all are dead.
        for _ in 0..len {
            let index = (*cursor % len) as usize;
            *cursor = cursor.wrapping_add(1);

            let backend = &backends[index];
            if backend.is_alive() {
                return Some(backend.clone());
            }
        }
        None
    }
}
