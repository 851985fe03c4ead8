//! `POST /certificates/verify`: offline consistency check for a certificate and
//! its verification code. Needs no state and no credentials.

use axum::Json;
use pact_signing::{CertificateAuthority, CertificateBundle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub certificate:       String,
  #[serde(rename = "verificationCode")]
  pub verification_code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResult {
  pub valid:  bool,
  /// The decoded contents, present only when `valid`.
  pub bundle: Option<CertificateBundle>,
}

pub async fn verify(Json(body): Json<VerifyBody>) -> Json<VerifyResult> {
  if !CertificateAuthority::verify(&body.certificate, &body.verification_code) {
    return Json(VerifyResult { valid: false, bundle: None });
  }
  match CertificateAuthority::decode(&body.certificate) {
    Ok(bundle) => Json(VerifyResult { valid: true, bundle: Some(bundle) }),
    Err(e) => {
      tracing::debug!(error = %e, "certificate with matching code failed to decode");
      Json(VerifyResult { valid: false, bundle: None })
    }
  }
}
