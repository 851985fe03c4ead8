//! Route handlers, one module per audience.

pub mod certificates;
pub mod contracts;
pub mod signing;

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};

use crate::AppState;

/// Network metadata recorded with a signature. Never supplied in the body.
#[derive(Debug, Clone)]
pub struct ClientMeta {
  pub ip_address: String,
  pub user_agent: String,
}

const UNKNOWN: &str = "unknown";

impl ClientMeta {
  /// `X-Forwarded-For` is honoured only behind a trusted proxy. Otherwise any
  /// client could choose the IP bound into its own signature.
  pub fn from_parts(parts: &Parts, trusted_proxy: bool) -> Self {
    let forwarded = trusted_proxy
      .then(|| forwarded_for(&parts.headers))
      .flatten();

    let ip_address = forwarded
      .or_else(|| {
        parts
          .extensions
          .get::<ConnectInfo<SocketAddr>>()
          .map(|ConnectInfo(addr)| addr.ip().to_string())
      })
      .unwrap_or_else(|| UNKNOWN.to_owned());

    let user_agent = parts
      .headers
      .get(header::USER_AGENT)
      .and_then(|v| v.to_str().ok())
      .unwrap_or(UNKNOWN)
      .to_owned();

    ClientMeta { ip_address, user_agent }
  }
}

impl<S> FromRequestParts<AppState<S>> for ClientMeta
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(ClientMeta::from_parts(parts, state.trusted_proxy))
  }
}

/// First hop of `X-Forwarded-For`, i.e. the client as seen by the outermost
/// proxy.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
  headers
    .get("x-forwarded-for")?
    .to_str()
    .ok()?
    .split(',')
    .next()
    .map(str::trim)
    .filter(|hop| !hop.is_empty())
    .map(str::to_owned)
}
