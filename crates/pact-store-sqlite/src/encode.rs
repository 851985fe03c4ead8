//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. Signature data
//! and event metadata are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use pact_core::{
  contract::{Contract, ContractStatus, SignatureData},
  event::{ContractEvent, EventType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SignatureData ───────────────────────────────────────────────────────────

pub fn encode_signature_data(data: &SignatureData) -> Result<String> {
  Ok(serde_json::to_string(data)?)
}

pub fn decode_signature_data(s: &str) -> Result<SignatureData> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `contracts` SELECT; order matches
/// [`RawContract::from_row`].
pub const CONTRACT_COLUMNS: &str = "contract_id, user_id, title, content, status, \
   signature_token, expires_at, signed_at, signature_data, created_at";

/// Raw strings read directly from a `contracts` row.
pub struct RawContract {
  pub contract_id:     String,
  pub user_id:         String,
  pub title:           String,
  pub content:         String,
  pub status:          String,
  pub signature_token: Option<String>,
  pub expires_at:      Option<String>,
  pub signed_at:       Option<String>,
  pub signature_data:  Option<String>,
  pub created_at:      String,
}

impl RawContract {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contract_id:     row.get(0)?,
      user_id:         row.get(1)?,
      title:           row.get(2)?,
      content:         row.get(3)?,
      status:          row.get(4)?,
      signature_token: row.get(5)?,
      expires_at:      row.get(6)?,
      signed_at:       row.get(7)?,
      signature_data:  row.get(8)?,
      created_at:      row.get(9)?,
    })
  }

  pub fn into_contract(self) -> Result<Contract> {
    Ok(Contract {
      contract_id:     decode_uuid(&self.contract_id)?,
      user_id:         self.user_id,
      title:           self.title,
      content:         self.content,
      status:          self.status.parse::<ContractStatus>()?,
      signature_token: self.signature_token,
      expires_at:      self.expires_at.as_deref().map(decode_dt).transpose()?,
      signed_at:       self.signed_at.as_deref().map(decode_dt).transpose()?,
      signature_data:  self
        .signature_data
        .as_deref()
        .map(decode_signature_data)
        .transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `contract_events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub contract_id: String,
  pub event_type:  String,
  pub description: String,
  pub metadata:    String,
  pub created_at:  String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<ContractEvent> {
    Ok(ContractEvent {
      event_id:    decode_uuid(&self.event_id)?,
      contract_id: decode_uuid(&self.contract_id)?,
      event_type:  self.event_type.parse::<EventType>()?,
      description: self.description,
      metadata:    serde_json::from_str(&self.metadata)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
