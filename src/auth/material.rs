//! Per-request authentication material.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};

/// Cookie carrying the session token.
const SESSION_COOKIE: &str = "sessiontoken";
/// Header carrying a station API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// Credentials and peer identity attached to a single request.
#[derive(Debug, Clone)]
pub struct AuthMaterial {
    pub session_token: Option<String>,
    pub api_key: Option<String>,
    pub peer_ip: String,
    pub user_agent: Option<String>,
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    let raw = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// Peer address as a string, with IPv4-mapped IPv6 unwrapped to plain IPv4.
fn canonical_ip(addr: SocketAddr) -> String {
    match addr.ip() {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
    }
}

impl<S> FromRequestParts<S> for AuthMaterial
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| canonical_ip(*addr))
            .unwrap_or_else(|| "0.0.0.0".to_owned());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(Self {
            session_token: cookie_value(parts, SESSION_COOKIE),
            api_key,
            peer_ip,
            user_agent,
        })
    }
}
