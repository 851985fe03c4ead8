//! Outbound webhook fired after each signing.
//!
//! The body is the JSON [`SignedNotification`]. Receivers authenticate it by
//! recomputing the hex HMAC-SHA256 of the raw body under the shared secret
//! and comparing it with the [`SIGNATURE_HEADER`] value.

use std::time::Duration;

use hmac::{Hmac, Mac};
use pact_signing::{SignedNotification, SigningNotifier};
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Pact-Signature";

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
  pub url:    String,
  pub secret: String,
}

#[derive(Debug, Error)]
pub enum WebhookError {
  #[error("webhook request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("webhook receiver answered {0}")]
  Status(StatusCode),

  #[error("could not encode webhook payload: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("invalid webhook key: {0}")]
  Key(#[from] hmac::digest::InvalidLength),
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WebhookNotifier {
  client: Client,
  url:    String,
  secret: Vec<u8>,
}

impl WebhookNotifier {
  pub fn new(config: WebhookConfig) -> Result<Self, WebhookError> {
    let client = Client::builder().timeout(TIMEOUT).build()?;
    Ok(Self {
      client,
      url: config.url,
      secret: config.secret.into_bytes(),
    })
  }
}

/// Lowercase hex HMAC-SHA256 of `body` under `secret`.
pub fn sign_body(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
  let mut mac = HmacSha256::new_from_slice(secret)?;
  mac.update(body);
  Ok(hex::encode(mac.finalize().into_bytes()))
}

impl SigningNotifier for WebhookNotifier {
  type Error = WebhookError;

  async fn notify_signed(&self, notification: SignedNotification) -> Result<(), WebhookError> {
    let body = serde_json::to_vec(&notification)?;
    let signature = sign_body(&self.secret, &body)?;

    let resp = self
      .client
      .post(&self.url)
      .header(CONTENT_TYPE, "application/json")
      .header(SIGNATURE_HEADER, signature)
      .body(body)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(WebhookError::Status(resp.status()));
    }
    tracing::debug!(contract_id = %notification.contract_id, "signing webhook delivered");
    Ok(())
  }
}
