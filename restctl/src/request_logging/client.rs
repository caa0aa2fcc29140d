//! Client details of a request, as stored in the audit logs.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{
        HeaderMap,
        header::{HOST, USER_AGENT},
        request::Parts,
    },
};

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_ip: String,
    pub http_host: String,
    pub agent: String,
}

impl ClientInfo {
    /// The first `X-Forwarded-For` hop wins over the peer address.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let client_ip = header(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            client_ip,
            http_host: header(headers, HOST.as_str()).unwrap_or(UNKNOWN).to_string(),
            agent: header(headers, USER_AGENT.as_str()).unwrap_or_default().to_string(),
        }
    }
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 192.168.0.1"));
        headers.insert(HOST, HeaderValue::from_static("api.example.com"));
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let info = ClientInfo::from_parts(&headers, Some("127.0.0.1:4000".parse().unwrap()));

        assert_eq!(info.client_ip, "10.0.0.1");
        assert_eq!(info.http_host, "api.example.com");
        assert_eq!(info.agent, "curl/8.0");
    }

    #[test]
    fn test_fallbacks() {
        let info = ClientInfo::from_parts(&HeaderMap::new(), Some("127.0.0.1:4000".parse().unwrap()));
        assert_eq!(info.client_ip, "127.0.0.1");
        assert_eq!(info.http_host, "unknown");
        assert_eq!(info.agent, "");

        assert_eq!(ClientInfo::from_parts(&HeaderMap::new(), None).client_ip, "unknown");
    }
}
