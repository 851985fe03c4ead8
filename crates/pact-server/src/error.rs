//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use pact_signing::Error as SigningError;
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Signing(#[from] SigningError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"pact\""),
        );
        return res;
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Signing(e) => signing_status(e),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal storage error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn signing_status(e: &SigningError) -> (StatusCode, String) {
  match e {
    // Signers learn nothing about why a link failed.
    SigningError::InvalidTokenOrState => {
      (StatusCode::NOT_FOUND, "link invalid or already used".to_owned())
    }
    SigningError::Expired => (StatusCode::GONE, e.to_string()),
    SigningError::InvalidSubmission(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    SigningError::InvalidTransition { .. } => (StatusCode::CONFLICT, e.to_string()),
    SigningError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
    SigningError::PersistenceFailure(_)
    | SigningError::LedgerAppendFailure(_)
    | SigningError::WeakSecret { .. }
    | SigningError::AlreadyInitialized
    | SigningError::NotInitialized => {
      tracing::error!(error = %e, "signing workflow failure");
      (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
    }
  }
}
