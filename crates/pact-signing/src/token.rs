//! Signature tokens: single-use, time-bounded secrets that let an anonymous
//! signer complete exactly one contract.
//!
//! Issuing and checking are pure. Consuming a token (clearing it from the
//! contract) is the workflow's job.

use chrono::{DateTime, Utc};
use pact_core::contract::{Contract, ContractStatus};
use rand_core::{OsRng, RngCore as _};
use subtle::ConstantTimeEq as _;

/// Bytes of entropy per token; hex-encoded to twice as many characters.
pub const TOKEN_BYTES: usize = 32;

pub struct SignatureToken;

impl SignatureToken {
  /// A fresh 256-bit token from the operating system CSPRNG, as 64 lowercase
  /// hex characters.
  pub fn issue() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
  }

  /// Possession check: the contract is `sent`, carries a token, and `supplied`
  /// equals it. The comparison does not short-circuit on the first differing
  /// byte.
  pub fn matches(contract: &Contract, supplied: &str) -> bool {
    if contract.status != ContractStatus::Sent {
      return false;
    }
    match &contract.signature_token {
      Some(expected) => bool::from(expected.as_bytes().ct_eq(supplied.as_bytes())),
      None => false,
    }
  }

  /// A contract without a recorded expiry is treated as expired: validity is
  /// always time-bounded.
  pub fn is_expired(contract: &Contract, now: DateTime<Utc>) -> bool {
    match contract.expires_at {
      Some(expires_at) => now > expires_at,
      None => true,
    }
  }

  /// Full validity: possession plus `now <= expires_at`.
  pub fn is_valid(contract: &Contract, supplied: &str, now: DateTime<Utc>) -> bool {
    Self::matches(contract, supplied) && !Self::is_expired(contract, now)
  }
}
