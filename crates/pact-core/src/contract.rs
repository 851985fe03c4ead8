//! Contract records and the signature payload embedded in them.
//!
//! A contract moves through `draft → sent → signed | expired`, or is cancelled
//! by its owner before it reaches a terminal state. Once signed, the embedded
//! [`SignatureData`] is never rewritten.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a contract as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
  Draft,
  Sent,
  Signed,
  Expired,
  /// Reachable only through an explicit owner action.
  Cancelled,
}

impl ContractStatus {
  /// The string stored in the `status` column and used in conditional
  /// updates. Must match the serde `rename_all` above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Sent => "sent",
      Self::Signed => "signed",
      Self::Expired => "expired",
      Self::Cancelled => "cancelled",
    }
  }

  /// Terminal states admit no further transition.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Signed | Self::Expired | Self::Cancelled)
  }
}

impl fmt::Display for ContractStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ContractStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "draft" => Ok(Self::Draft),
      "sent" => Ok(Self::Sent),
      "signed" => Ok(Self::Signed),
      "expired" => Ok(Self::Expired),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Signature payload ───────────────────────────────────────────────────────

/// Forensic and cryptographic record of a completed signing.
///
/// The identity fields are attested by the signer, not verified against any
/// registry. The trust model is possession of the token plus the details
/// supplied at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
  pub signer_name:    String,
  pub signer_email:   String,
  /// Server capture time. Never taken from the client.
  pub signed_at:      DateTime<Utc>,
  pub ip_address:     String,
  pub user_agent:     String,
  pub geolocation:    Option<String>,
  /// Lowercase hex HMAC-SHA256; the binding proof.
  pub signature_hash: String,
}

/// What a signer submits alongside the token. Network metadata (`ip_address`,
/// `user_agent`) is filled in by the transport layer, not by the signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerSubmission {
  pub name:        String,
  pub email:       String,
  pub ip_address:  String,
  pub user_agent:  String,
  pub geolocation: Option<String>,
}

// ─── Contract ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
  pub contract_id:     Uuid,
  /// Owning account, as supplied by the identity provider.
  pub user_id:         String,
  pub title:           String,
  /// Frozen once the contract leaves `draft`.
  pub content:         String,
  pub status:          ContractStatus,
  /// Present only while `status == Sent`.
  pub signature_token: Option<String>,
  pub expires_at:      Option<DateTime<Utc>>,
  pub signed_at:       Option<DateTime<Utc>>,
  pub signature_data:  Option<SignatureData>,
  pub created_at:      DateTime<Utc>,
}

impl Contract {
  /// A copy safe to hand to anyone other than the owner: the token is removed.
  pub fn redacted(&self) -> Self {
    Self { signature_token: None, ..self.clone() }
  }
}

/// Input to [`crate::store::ContractStore::create_contract`].
/// `contract_id`, `status`, and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewContract {
  pub user_id: String,
  pub title:   String,
  pub content: String,
}
