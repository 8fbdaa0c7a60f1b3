//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → pool identified
//!     → pool.rs (pool owns its backends + strategy)
//!     → round_robin.rs (rotate, skipping dead backends)
//!     → backend.rs (liveness read)
//!     → Return backend or None (pool exhausted)
//! ```
//!
//! # Design Decisions
//! - Pools are built once from config and never resized
//! - Selection is serialized per pool; the lock never spans I/O
//! - Dead backends are excluded from selection

pub mod backend;
pub mod pool;
pub mod round_robin;

use std::sync::Arc;

use self::backend::Backend;

pub use self::backend::{AddressError, Liveness};
pub use self::pool::{BackendManager, BackendPool};
pub use self::round_robin::RoundRobin;

/// Strategy that picks one backend out of a pool.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Returns the next backend to use, or `None` when no backend is usable.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
