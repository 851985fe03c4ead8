//! Portable digital certificates for completed signatures.
//!
//! A certificate is base64-encoded canonical JSON describing the signing, plus
//! a 16-character verification code derived from it. Both can be shared and
//! checked without database access.
//!
//! [`CertificateAuthority::verify`] only proves that a certificate and its
//! verification code belong together. It detects corruption or a mismatched
//! pair. It does **not** prove the embedded signature hash is authentic; that
//! needs [`crate::SignatureEngine::verify`] and the server secret.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::SecondsFormat;
use pact_core::contract::SignatureData;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const ISSUER: &str = "Pact Digital Signature Authority";
pub const VERSION: &str = "1.0";

/// Length of the verification code in hex characters.
pub const CODE_LEN: usize = 16;

/// The record inside a certificate. Field order is the canonical JSON order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBundle {
  pub signer:    String,
  pub email:     String,
  pub timestamp: String,
  pub ip:        String,
  pub signature: String,
  pub issuer:    String,
  pub version:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalCertificate {
  pub certificate:       String,
  #[serde(rename = "verificationCode")]
  pub verification_code: String,
}

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("certificate is not valid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("certificate payload is not a valid bundle: {0}")]
  Json(#[from] serde_json::Error),
}

pub struct CertificateAuthority;

impl CertificateAuthority {
  pub fn issue(data: &SignatureData) -> DigitalCertificate {
    let bundle = CertificateBundle {
      signer:    data.signer_name.clone(),
      email:     data.signer_email.clone(),
      timestamp: data.signed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
      ip:        data.ip_address.clone(),
      signature: data.signature_hash.clone(),
      issuer:    ISSUER.to_owned(),
      version:   VERSION.to_owned(),
    };
    // A struct of plain strings always serialises.
    let json = serde_json::to_vec(&bundle).unwrap_or_default();
    let certificate = B64.encode(json);
    let verification_code = verification_code(&certificate);
    DigitalCertificate { certificate, verification_code }
  }

  /// Plain equality is enough here: both values are public, and the check only
  /// detects accidental corruption.
  pub fn verify(certificate: &str, verification_code: &str) -> bool {
    self::verification_code(certificate) == verification_code
  }

  pub fn decode(certificate: &str) -> Result<CertificateBundle, DecodeError> {
    let bytes = B64.decode(certificate)?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

/// First [`CODE_LEN`] hex characters of SHA-256 over the certificate string,
/// uppercased.
fn verification_code(certificate: &str) -> String {
  let digest = Sha256::digest(certificate.as_bytes());
  let mut code = hex::encode_upper(digest);
  code.truncate(CODE_LEN);
  code
}
