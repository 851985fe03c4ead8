//! Outbound notification after a successful signing.
//!
//! Delivery is best-effort: the workflow logs a failed notification and moves
//! on. A notifier can never undo a signing.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Payload sent to downstream systems once a contract is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedNotification {
  pub contract_id:  Uuid,
  pub user_id:      String,
  pub signed_at:    DateTime<Utc>,
  pub signer_name:  String,
  pub signer_email: String,
}

pub trait SigningNotifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify_signed(
    &self,
    notification: SignedNotification,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Notifier for deployments with no downstream integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl SigningNotifier for NoopNotifier {
  type Error = std::convert::Infallible;

  async fn notify_signed(&self, _: SignedNotification) -> Result<(), Self::Error> {
    Ok(())
  }
}

/// An absent notifier is a no-op, so optional integrations need no wrapper.
impl<N: SigningNotifier> SigningNotifier for Option<N> {
  type Error = N::Error;

  async fn notify_signed(&self, notification: SignedNotification) -> Result<(), Self::Error> {
    match self {
      Some(inner) => inner.notify_signed(notification).await,
      None => Ok(()),
    }
  }
}
