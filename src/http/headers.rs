//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Append X-Forwarded-For, set X-Forwarded-Host and X-Forwarded-Proto

use std::net::SocketAddr;

use axum::http::{header, uri::Authority, HeaderMap, HeaderName, HeaderValue};

static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Record the original client and host for the backend.
///
/// The host comes from `Host`, or from the request target's authority when
/// there is no `Host` header (HTTP/2).
pub fn add_forwarded(
    headers: &mut HeaderMap,
    authority: Option<&Authority>,
    client: Option<SocketAddr>,
) {
    if let Some(client) = client {
        let ip = client.ip().to_string();
        let value = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{}, {}", prior, ip),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    let host = headers.get(header::HOST).cloned().or_else(|| {
        authority.and_then(|a| HeaderValue::from_str(a.as_str()).ok())
    });
    if let Some(host) = host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_standard_and_listed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace-hop", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn appends_client_to_forwarded_chain() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("gateway.local:8001"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.1.1.1"));

        let authority = Authority::from_static("ignored.example:443");
        add_forwarded(&mut headers, Some(&authority), Some("192.168.0.7:51000".parse().unwrap()));

        assert_eq!(headers[X_FORWARDED_FOR], "10.1.1.1, 192.168.0.7");
        assert_eq!(headers[X_FORWARDED_HOST], "gateway.local:8001");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
    }

    #[test]
    fn forwarded_host_falls_back_to_authority() {
        let mut headers = HeaderMap::new();
        let authority = Authority::from_static("gateway.local:8443");

        add_forwarded(&mut headers, Some(&authority), None);

        assert_eq!(headers[X_FORWARDED_HOST], "gateway.local:8443");
        assert!(!headers.contains_key(X_FORWARDED_FOR));
    }
}
