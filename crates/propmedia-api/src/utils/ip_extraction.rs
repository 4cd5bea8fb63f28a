//! Client IP extraction for the share access log.
//!
//! Deployments sit behind a reverse proxy, so the socket peer is usually the
//! proxy. `X-Forwarded-For` is checked first (leftmost valid entry), then
//! `X-Real-IP`, then the socket address.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

pub fn extract_client_ip(headers: &HeaderMap, socket: Option<&SocketAddr>) -> Option<String> {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(first_valid_ip)
    {
        return Some(ip);
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| is_valid_ip(s))
    {
        return Some(ip.to_string());
    }

    socket.map(|addr| addr.ip().to_string())
}

/// Leftmost syntactically valid address in a comma-separated chain.
fn first_valid_ip(chain: &str) -> Option<String> {
    chain
        .split(',')
        .map(str::trim)
        .find(|candidate| is_valid_ip(candidate))
        .map(String::from)
}

fn is_valid_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}
