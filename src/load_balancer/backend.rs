//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend instance of a pool
//! - Hold its immutable base URL and pre-computed authority
//! - Track liveness (Alive/Dead) safely under concurrent access
//! - Keep consecutive probe outcomes for the health policy

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use url::Url;

/// Liveness of a backend as seen by selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Liveness::Alive => write!(f, "UP"),
            Liveness::Dead => write!(f, "DOWN"),
        }
    }
}

/// Reasons a backend address is rejected.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("invalid backend address {address:?}: {source}")]
    Parse {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {scheme:?} in backend address {address:?} (only http is supported)")]
    UnsupportedScheme { address: String, scheme: String },

    #[error("backend address {0:?} has no host")]
    MissingHost(String),

    #[error("backend address {0:?} does not form a valid authority")]
    InvalidAuthority(String),
}

/// A single backend instance.
#[derive(Debug)]
pub struct Backend {
    /// Base URL of the backend. Never changes after construction.
    address: Url,
    /// `host:port` used when rewriting forwarded URIs.
    authority: Authority,
    /// Current liveness flag.
    alive: AtomicBool,
    /// Consecutive failure count.
    consecutive_failures: AtomicU32,
    /// Consecutive success count.
    consecutive_successes: AtomicU32,
}

impl Backend {
    /// Parse a backend from its configured base URL.
    ///
    /// New backends start alive so traffic flows before the first probe completes.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let address = Url::parse(raw.trim()).map_err(|source| AddressError::Parse {
            address: raw.to_string(),
            source,
        })?;

        if address.scheme() != "http" {
            return Err(AddressError::UnsupportedScheme {
                address: raw.to_string(),
                scheme: address.scheme().to_string(),
            });
        }

        let host = address
            .host_str()
            .ok_or_else(|| AddressError::MissingHost(raw.to_string()))?;
        let port = address.port_or_known_default().unwrap_or(80);
        let authority = format!("{}:{}", host, port)
            .parse::<Authority>()
            .map_err(|_| AddressError::InvalidAuthority(raw.to_string()))?;

        Ok(Self {
            address,
            authority,
            alive: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            consecutive_successes: AtomicU32::new(0),
        })
    }

    /// The configured base URL.
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// `host:port` of the backend.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Path component of the base URL without a trailing slash ("" for a bare host).
    pub fn base_path(&self) -> &str {
        self.address.path().trim_end_matches('/')
    }

    /// Absolute URI on this backend for `path` (joined to the base path) and `query`.
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let path_and_query = match query {
            Some(query) => format!("{}{}{}?{}", self.base_path(), separator, path, query),
            None => format!("{}{}{}", self.base_path(), separator, path),
        };
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub fn liveness(&self) -> Liveness {
        if self.is_alive() {
            Liveness::Alive
        } else {
            Liveness::Dead
        }
    }

    /// Record a successful check. Returns the new consecutive success count.
    pub(crate) fn record_success(&self) -> u32 {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.consecutive_successes.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    /// Record a failed check. Returns the new consecutive failure count.
    pub(crate) fn record_failure(&self) -> u32 {
        self.consecutive_successes.store(0, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Url always renders a trailing slash for bare hosts; drop it for logs.
        write!(f, "{}", self.address.as_str().trim_end_matches('/'))
    }
}
