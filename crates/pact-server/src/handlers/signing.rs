//! Signer handlers for `/sign/{id}`. The token is the only credential.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use pact_core::{
  contract::{Contract, SignerSubmission},
  store::{ContractStore, EventLedger},
};
use pact_signing::DigitalCertificate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, handlers::ClientMeta};

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewParams {
  pub token: String,
}

/// What the signer sees before signing.
#[derive(Debug, Serialize)]
pub struct SigningPage {
  pub contract_id: Uuid,
  pub title:       String,
  pub content:     String,
  pub expires_at:  Option<DateTime<Utc>>,
}

/// `GET /sign/{id}?token=<token>`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ViewParams>,
) -> Result<Json<SigningPage>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let contract = state.workflow.record_view(id, &params.token).await?;
  Ok(Json(SigningPage {
    contract_id: contract.contract_id,
    title:       contract.title,
    content:     contract.content,
    expires_at:  contract.expires_at,
  }))
}

// ─── Sign ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignBody {
  pub token:       String,
  pub name:        String,
  pub email:       String,
  #[serde(default)]
  pub geolocation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignedReceipt {
  pub contract:    Contract,
  pub certificate: Option<DigitalCertificate>,
}

/// `POST /sign/{id}`
pub async fn sign<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  meta: ClientMeta,
  Json(body): Json<SignBody>,
) -> Result<Json<SignedReceipt>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let submission = SignerSubmission {
    name:        body.name,
    email:       body.email,
    ip_address:  meta.ip_address,
    user_agent:  meta.user_agent,
    geolocation: body.geolocation,
  };

  let contract = state.workflow.sign(id, &body.token, submission).await?;
  let certificate = state.workflow.certificate(&contract);
  Ok(Json(SignedReceipt { contract: contract.redacted(), certificate }))
}
