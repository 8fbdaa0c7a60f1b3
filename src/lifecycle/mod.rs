//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast to HTTP server and health monitor
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel shared by every long-running task
//! - The HTTP server drains in-flight requests before returning

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
