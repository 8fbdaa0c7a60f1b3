//! Request-path errors of the gateway.
//!
//! Every variant is recoverable and is turned into an HTTP response by
//! `http::response`; none of them may terminate the process.

use std::time::Duration;

/// Failure while dispatching a request to a pool.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Every backend of the pool is dead.
    #[error("No available {0} services")]
    NoHealthyBackend(String),

    /// The selected backend failed at the transport level.
    #[error("upstream request to {backend} failed: {source}")]
    Upstream {
        backend: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The selected backend did not answer in time.
    #[error("upstream request to {backend} timed out after {timeout:?}")]
    UpstreamTimeout { backend: String, timeout: Duration },

    /// No route matches the request path.
    #[error("No route for {0}")]
    NoRoute(String),

    /// The forwarded request could not be built.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::NoHealthyBackend("restaurant".to_string());
        assert_eq!(err.to_string(), "No available restaurant services");

        let err = GatewayError::UpstreamTimeout {
            backend: "http://localhost:5001".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "upstream request to http://localhost:5001 timed out after 30s"
        );
    }
}
