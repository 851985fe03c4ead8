//! Append-only lifecycle events.
//!
//! One event is recorded per contract transition. Events are never updated or
//! deleted; the events for a contract, newest first, are its audit trail.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The kind of transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  Created,
  Sent,
  Viewed,
  Signed,
  Expired,
  Cancelled,
}

impl EventType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Sent => "sent",
      Self::Viewed => "viewed",
      Self::Signed => "signed",
      Self::Expired => "expired",
      Self::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EventType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "created" => Ok(Self::Created),
      "sent" => Ok(Self::Sent),
      "viewed" => Ok(Self::Viewed),
      "signed" => Ok(Self::Signed),
      "expired" => Ok(Self::Expired),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::UnknownEventType(other.to_owned())),
    }
  }
}

/// A persisted ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractEvent {
  pub event_id:    Uuid,
  pub contract_id: Uuid,
  pub event_type:  EventType,
  pub description: String,
  /// Free-form payload. Consumers: the audit view (renders it verbatim) and
  /// the `signed` event, which carries signer email, IP, user agent and hash.
  pub metadata:    serde_json::Value,
  /// Server-assigned; never changes.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::EventLedger::append`].
#[derive(Debug, Clone)]
pub struct NewContractEvent {
  pub contract_id: Uuid,
  pub event_type:  EventType,
  pub description: String,
  pub metadata:    serde_json::Value,
}

impl NewContractEvent {
  /// An event with an empty metadata object.
  pub fn new(
    contract_id: Uuid,
    event_type: EventType,
    description: impl Into<String>,
  ) -> Self {
    Self {
      contract_id,
      event_type,
      description: description.into(),
      metadata: serde_json::Value::Object(Default::default()),
    }
  }

  pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
    self.metadata = metadata;
    self
  }
}
