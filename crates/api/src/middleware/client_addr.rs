//! Client address extractor.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// The IP address a request came from, rendered without a port.
///
/// Taken from the TCP peer recorded by
/// `into_make_service_with_connect_info::<SocketAddr>()`. When
/// `TRUST_FORWARDED_FOR` is enabled, the first `X-Forwarded-For` entry wins
/// if it parses as an IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.trust_forwarded_for {
            if let Some(ip) = forwarded_ip(parts) {
                return Ok(ClientAddr(ip.to_string()));
            }
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientAddr(addr.ip().to_string()))
            .ok_or_else(|| {
                AppError::InternalError("Peer address unavailable for request".into())
            })
    }
}

fn forwarded_ip(parts: &Parts) -> Option<IpAddr> {
    parts
        .headers
        .get(FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}
