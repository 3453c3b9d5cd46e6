//! Caller identification for rate limiting.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Key identifying the caller of `request`.
///
/// The socket peer address is the key. `X-Forwarded-For` is client-supplied,
/// so its first hop is used only when `trust_forwarded_for` is set, i.e. the
/// service sits behind a proxy that overwrites the header. Requests with no
/// usable source share the key `"unknown"`.
pub fn caller_key(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(hop) = first_forwarded_hop(request.headers()) {
            return hop;
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn first_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn from_peer(peer: &str, forwarded: Option<&str>) -> Request {
        let mut builder = Request::builder();
        if let Some(value) = forwarded {
            builder = builder.header(FORWARDED_FOR, value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[test]
    fn peer_address_wins_over_forwarded_header_by_default() {
        let request = from_peer("192.0.2.4:5555", Some("203.0.113.7"));
        assert_eq!(caller_key(&request, false), "192.0.2.4");
    }

    #[test]
    fn trusted_forwarded_header_takes_first_hop() {
        let request = from_peer("10.0.0.1:5555", Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(caller_key(&request, true), "203.0.113.7");
    }

    #[test]
    fn blank_trusted_header_falls_back_to_peer() {
        let request = from_peer("192.0.2.4:5555", Some(" "));
        assert_eq!(caller_key(&request, true), "192.0.2.4");
    }

    #[test]
    fn no_source_is_unknown() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(caller_key(&request, true), "unknown");
    }
}
