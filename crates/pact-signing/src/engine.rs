//! HMAC-SHA256 binding of contract, signer, content, and time.
//!
//! The canonical message is the fields below joined by `'|'`, in this order:
//!
//! | # | Field | Encoding |
//! |---|-------|----------|
//! | 1 | contract id | hyphenated lowercase UUID |
//! | 2 | signer name | as submitted |
//! | 3 | signer email | as submitted |
//! | 4 | IP address | as captured |
//! | 5 | timestamp | RFC 3339, UTC, milliseconds, `Z` suffix |
//! | 6 | content | verbatim contract text |
//!
//! The order and separator are part of the stored-signature format; changing
//! either invalidates every existing signature. Content goes last so that a
//! `'|'` inside it cannot shift any other field.
//!
//! The secret key is the root of trust. Anyone holding it can mint signatures;
//! anyone without it cannot, even knowing every other input.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub const FIELD_SEPARATOR: char = '|';

// ─── Secret ──────────────────────────────────────────────────────────────────

/// Server-held HMAC key. There is no default: a missing or short secret is a
/// startup failure.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
  pub const MIN_LEN: usize = 32;

  pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
    let bytes = bytes.into();
    if bytes.len() < Self::MIN_LEN {
      return Err(Error::WeakSecret { len: bytes.len(), min: Self::MIN_LEN });
    }
    Ok(Self(bytes))
  }
}

impl fmt::Debug for SigningSecret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SigningSecret(..)")
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The signer attributes bound into the hash. User agent and geolocation are
/// forensic only and deliberately left out.
#[derive(Debug, Clone, Copy)]
pub struct SignerIdentity<'a> {
  pub name:       &'a str,
  pub email:      &'a str,
  pub ip_address: &'a str,
}

#[derive(Debug, Clone)]
pub struct SignatureEngine {
  secret: SigningSecret,
}

impl SignatureEngine {
  pub fn new(secret: SigningSecret) -> Self { Self { secret } }

  /// Lowercase hex HMAC-SHA256 over the canonical message.
  pub fn generate(
    &self,
    contract_id: Uuid,
    signer: SignerIdentity<'_>,
    content: &str,
    timestamp: DateTime<Utc>,
  ) -> String {
    let mac = self.mac_for(contract_id, signer, content, timestamp);
    hex::encode(mac.finalize().into_bytes())
  }

  /// Recompute and compare in constant time. Malformed hex, a wrong length,
  /// or any differing input yields `false`.
  pub fn verify(
    &self,
    contract_id: Uuid,
    claimed_hash: &str,
    signer: SignerIdentity<'_>,
    content: &str,
    timestamp: DateTime<Utc>,
  ) -> bool {
    let Ok(claimed) = hex::decode(claimed_hash) else {
      return false;
    };
    self
      .mac_for(contract_id, signer, content, timestamp)
      .verify_slice(&claimed)
      .is_ok()
  }

  fn mac_for(
    &self,
    contract_id: Uuid,
    signer: SignerIdentity<'_>,
    content: &str,
    timestamp: DateTime<Utc>,
  ) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(&self.secret.0)
      .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(canonical_message(contract_id, signer, content, timestamp).as_bytes());
    mac
  }
}

/// The exact string that is authenticated. See the module docs for the format.
pub fn canonical_message(
  contract_id: Uuid,
  signer: SignerIdentity<'_>,
  content: &str,
  timestamp: DateTime<Utc>,
) -> String {
  let id = contract_id.hyphenated().to_string();
  let ts = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
  let sep = FIELD_SEPARATOR.to_string();
  [id.as_str(), signer.name, signer.email, signer.ip_address, ts.as_str(), content]
    .join(&sep)
}
