//! Owner handlers for `/api/contracts`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/contracts` | The caller's contracts, newest first |
//! | `POST` | `/api/contracts` | Body: `{"title":..,"content":..}` |
//! | `GET`  | `/api/contracts/{id}` | 404 unless owned by the caller |
//! | `PUT`  | `/api/contracts/{id}` | Body: `{"content":..}`, drafts only |
//! | `POST` | `/api/contracts/{id}/send` | Body: `{"ttl_hours":72}`, field optional |
//! | `POST` | `/api/contracts/{id}/cancel` | Body: `{"reason":..}`, field optional |
//! | `GET`  | `/api/contracts/{id}/events` | Audit trail, newest first |
//! | `GET`  | `/api/contracts/{id}/verification` | Signature check and certificate |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pact_core::{
  contract::{Contract, NewContract},
  event::ContractEvent,
  store::{ContractStore, EventLedger},
};
use pact_signing::DigitalCertificate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, MAX_TOKEN_TTL_HOURS, Workflow, auth::Authenticated, error::ApiError};

/// The contract, if it exists and belongs to `user_id`. Someone else's
/// contract is reported exactly like a missing one.
async fn owned<S>(workflow: &Workflow<S>, id: Uuid, user_id: &str) -> Result<Contract, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  workflow
    .store()
    .get_contract(id)
    .await
    .map_err(ApiError::store)?
    .filter(|c| c.user_id == user_id)
    .ok_or_else(|| ApiError::NotFound(format!("contract {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/contracts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
) -> Result<Json<Vec<Contract>>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let contracts = state
    .workflow
    .store()
    .list_contracts(&user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contracts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:   String,
  pub content: String,
}

/// `POST /api/contracts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let title = body.title.trim();
  if title.is_empty() {
    return Err(ApiError::BadRequest("title is required".into()));
  }
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("content is required".into()));
  }

  let contract = state
    .workflow
    .create(NewContract {
      user_id,
      title: title.to_owned(),
      content: body.content,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(contract)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/contracts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  Ok(Json(owned(&state.workflow, id, &user_id).await?))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub content: String,
}

/// `PUT /api/contracts/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("content is required".into()));
  }
  owned(&state.workflow, id, &user_id).await?;
  Ok(Json(state.workflow.update_content(id, body.content).await?))
}

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SendBody {
  #[serde(default)]
  pub ttl_hours: Option<u32>,
}

/// `POST /api/contracts/{id}/send`
///
/// The response is the only place the signing token is ever returned.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<SendBody>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let ttl = match body.ttl_hours {
    None => state.token_ttl,
    Some(hours @ 1..=MAX_TOKEN_TTL_HOURS) => chrono::Duration::hours(i64::from(hours)),
    Some(_) => {
      return Err(ApiError::BadRequest(format!(
        "ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}"
      )));
    }
  };

  owned(&state.workflow, id, &user_id).await?;
  Ok(Json(state.workflow.send(id, ttl).await?))
}

// ─── Cancel ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
  #[serde(default)]
  pub reason: Option<String>,
}

/// `POST /api/contracts/{id}/cancel`
pub async fn cancel<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<CancelBody>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  owned(&state.workflow, id, &user_id).await?;
  let reason = body.reason.filter(|r| !r.trim().is_empty());
  Ok(Json(state.workflow.cancel(id, reason).await?))
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// `GET /api/contracts/{id}/events`
pub async fn events<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ContractEvent>>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  owned(&state.workflow, id, &user_id).await?;
  Ok(Json(state.workflow.events(id).await?))
}

// ─── Verification ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Verification {
  /// Whether the stored signature still matches the contract as it is now.
  pub signature_valid: bool,
  pub certificate:     Option<DigitalCertificate>,
}

/// `GET /api/contracts/{id}/verification`
pub async fn verification<S>(
  State(state): State<AppState<S>>,
  Authenticated(user_id): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Verification>, ApiError>
where
  S: ContractStore + EventLedger + 'static,
{
  let contract = owned(&state.workflow, id, &user_id).await?;
  let signature_valid = state.workflow.verify_signature(&contract);
  if !signature_valid && contract.signature_data.is_some() {
    tracing::warn!(contract_id = %id, "stored signature no longer verifies");
  }
  Ok(Json(Verification {
    signature_valid,
    certificate: state.workflow.certificate(&contract),
  }))
}
