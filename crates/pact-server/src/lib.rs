//! HTTP surface for Pact.
//!
//! Owners manage their contracts under `/api` with HTTP Basic auth. Signers
//! reach `/sign/{id}` through the link they were sent; the token in that link
//! is their only credential. `/certificates/verify` is open to anyone holding
//! a certificate.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod webhook;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use pact_core::store::{ContractStore, EventLedger};
use pact_signing::ContractSigningWorkflow;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{certificates, contracts, signing};
use webhook::{WebhookConfig, WebhookNotifier};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `PACT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// HMAC key for signature hashes. At least 32 bytes; there is no default.
  pub signing_secret:     String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:    u32,
  #[serde(default)]
  pub webhook_url:        Option<String>,
  #[serde(default)]
  pub webhook_secret:     Option<String>,
  /// Take the signer's IP from `X-Forwarded-For`. Enable only when every
  /// request arrives through a proxy that sets that header itself.
  #[serde(default)]
  pub trusted_proxy:      bool,
}

fn default_token_ttl_hours() -> u32 { 168 }

/// Upper bound on a signing link's lifetime, in hours.
pub const MAX_TOKEN_TTL_HOURS: u32 = 24 * 365;

impl ServerConfig {
  pub fn token_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(i64::from(self.token_ttl_hours))
  }

  /// The webhook target, if one is configured. Setting only one of
  /// `webhook_url` and `webhook_secret` is a configuration error.
  pub fn webhook(&self) -> anyhow::Result<Option<WebhookConfig>> {
    match (&self.webhook_url, &self.webhook_secret) {
      (Some(url), Some(secret)) => Ok(Some(WebhookConfig {
        url:    url.clone(),
        secret: secret.clone(),
      })),
      (None, None) => Ok(None),
      _ => anyhow::bail!("webhook_url and webhook_secret must be set together"),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// The workflow as the server runs it: one store serves as both contract
/// store and event ledger, and the webhook is optional.
pub type Workflow<S> = ContractSigningWorkflow<S, S, Option<WebhookNotifier>>;

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub workflow:      Arc<Workflow<S>>,
  pub auth:          Arc<AuthConfig>,
  /// Signing-link lifetime used when `send` names none.
  pub token_ttl:     chrono::Duration,
  pub trusted_proxy: bool,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      workflow:      Arc::clone(&self.workflow),
      auth:          Arc::clone(&self.auth),
      token_ttl:     self.token_ttl,
      trusted_proxy: self.trusted_proxy,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContractStore + EventLedger + 'static,
{
  Router::new()
    // Owner
    .route("/api/contracts", get(contracts::list::<S>).post(contracts::create::<S>))
    .route(
      "/api/contracts/{id}",
      get(contracts::get_one::<S>).put(contracts::update::<S>),
    )
    .route("/api/contracts/{id}/send", post(contracts::send::<S>))
    .route("/api/contracts/{id}/cancel", post(contracts::cancel::<S>))
    .route("/api/contracts/{id}/events", get(contracts::events::<S>))
    .route("/api/contracts/{id}/verification", get(contracts::verification::<S>))
    // Signer
    .route("/sign/{id}", get(signing::view::<S>).post(signing::sign::<S>))
    // Anyone
    .route("/certificates/verify", post(certificates::verify))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
