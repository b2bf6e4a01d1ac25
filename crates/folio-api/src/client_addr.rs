use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

/// What the request says about where it came from.
///
/// `origin` is the client-reported address (`CF-Connecting-IP`, else the first
/// `X-Forwarded-For` hop) and only feeds the abuse-tracing hash; clients can
/// forge it. `proxy_hop` is the last `X-Forwarded-For` entry, the one a
/// single trusted reverse proxy appends. `peer` is the TCP peer, present when
/// the server runs with connect info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAddr {
    pub origin: Option<String>,
    pub proxy_hop: Option<String>,
    pub peer: Option<String>,
}

impl ClientAddr {
    /// A caller connecting straight to the server with no proxy headers.
    pub fn direct(addr: &str) -> Self {
        Self {
            origin: Some(addr.to_string()),
            proxy_hop: None,
            peer: Some(addr.to_string()),
        }
    }

    /// Address to hash for abuse tracing: the reported origin, else the peer.
    pub fn hash_source(&self) -> Option<&str> {
        self.origin.as_deref().or(self.peer.as_deref())
    }

    /// Address to rate limit on. Only values the client can't choose freely:
    /// the proxy-appended hop when one proxy is trusted, else the TCP peer.
    pub fn rate_key(&self, trust_proxy: bool) -> Option<&str> {
        let hop = if trust_proxy { self.proxy_hop.as_deref() } else { None };
        hop.or(self.peer.as_deref())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(resolve(&parts.headers, peer))
    }
}

fn resolve(headers: &HeaderMap, peer: Option<String>) -> ClientAddr {
    let hops = |name: &str| -> Vec<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    };

    let forwarded = hops("x-forwarded-for");
    let origin = hops("cf-connecting-ip")
        .into_iter()
        .next()
        .or_else(|| forwarded.first().cloned());

    ClientAddr {
        origin,
        proxy_hop: forwarded.last().cloned(),
        peer: peer.filter(|p| !p.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_origin_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let addr = resolve(&headers, Some("127.0.0.1".into()));
        assert_eq!(addr.hash_source(), Some("203.0.113.7"));
        assert_eq!(addr.proxy_hop.as_deref(), Some("10.0.0.1"));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.2"));
        let addr = resolve(&headers, Some("127.0.0.1".into()));
        assert_eq!(addr.hash_source(), Some("198.51.100.2"));
    }

    #[test]
    fn test_rate_key_ignores_client_supplied_hops() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.1.1.1, 10.0.0.1"));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("2.2.2.2"));
        let addr = resolve(&headers, Some("127.0.0.1".into()));

        assert_eq!(addr.rate_key(true), Some("10.0.0.1"));
        assert_eq!(addr.rate_key(false), Some("127.0.0.1"));
    }

    #[test]
    fn test_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        let addr = resolve(&headers, Some("127.0.0.1".into()));
        assert_eq!(addr.hash_source(), Some("127.0.0.1"));
        assert_eq!(addr.rate_key(true), Some("127.0.0.1"));

        let addr = resolve(&HeaderMap::new(), None);
        assert_eq!(addr, ClientAddr::default());
        assert_eq!(addr.rate_key(true), None);
    }
}
