//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (segment-aware prefix match)
//!     → Return: matched Route (with its pool) or no match
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Resolve pool names to pools
//!     → Sort by prefix length
//!     → Freeze as immutable Router
//! ```

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
