//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe every backend of every pool concurrently
//!     → Apply state.rs policy
//!
//! Passive health checks (passive.rs, opt-in):
//!     Forwarding failure observed
//!     → Mark backend dead immediately
//!
//! State machine (state.rs):
//!     Alive ←→ Dead
//!     Optional thresholds against flapping
//! ```
//!
//! # Design Decisions
//! - Probing never blocks request selection; it only writes liveness flags
//! - One slow or failing backend never delays probes of the others
//! - Health state is per-backend, not per-pool

pub mod active;
pub mod passive;
pub mod state;

pub use active::{HealthMonitor, ProbeOutcome};
pub use passive::PassiveHealth;
pub use state::HealthPolicy;
