//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing (path prefix → pool)
//!     → proxy.rs (select backend, rewrite, forward)
//!     → response.rs (errors as JSON)
//!     → Send to client
//!
//! POST /api/orders
//!     → orders.rs (decode, post to order pool, relay JSON)
//! ```

pub mod headers;
pub mod orders;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::Dispatcher;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
