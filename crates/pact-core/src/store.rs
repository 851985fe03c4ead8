//! The `ContractStore` and `EventLedger` traits.
//!
//! Both are implemented by storage backends (e.g. `pact-store-sqlite`).
//! The signing workflow and the HTTP layer depend on these abstractions, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  contract::{Contract, NewContract, SignatureData},
  event::{ContractEvent, NewContractEvent},
};

// ─── Contracts ───────────────────────────────────────────────────────────────

/// Abstraction over contract persistence.
///
/// Every status transition is a conditional update guarded on the current
/// status, and reports whether a row changed. A `false` return means another
/// writer got there first (or the contract does not exist); callers re-read
/// rather than retrying the update blindly.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContractStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new contract in `draft` status.
  fn create_contract(
    &self,
    input: NewContract,
  ) -> impl Future<Output = Result<Contract, Self::Error>> + Send + '_;

  /// Retrieve a contract by id. Returns `None` if not found.
  fn get_contract(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contract>, Self::Error>> + Send + '_;

  /// All contracts owned by `user_id`, newest first.
  fn list_contracts<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + 'a;

  /// Replace the content of a `draft` contract.
  fn update_content(
    &self,
    id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `draft → sent`: store the token and expiry.
  fn mark_sent(
    &self,
    id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `sent → signed`: store `signature`, set `signed_at` from it, and clear
  /// the token, all in one statement guarded by `status = 'sent'`.
  fn mark_signed(
    &self,
    id: Uuid,
    signature: SignatureData,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `sent → expired`, clearing the token.
  fn mark_expired(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `draft | sent → cancelled`, clearing the token.
  fn mark_cancelled(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Append-only audit trail of contract lifecycle events.
///
/// Access control is the caller's concern; implementations assume every call
/// is authorised.
pub trait EventLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record one immutable event. `event_id` and `created_at` are assigned by
  /// the ledger. Storage failures must be returned, never swallowed.
  fn append(
    &self,
    event: NewContractEvent,
  ) -> impl Future<Output = Result<ContractEvent, Self::Error>> + Send + '_;

  /// Every event for `contract_id`, newest first. Empty if there are none.
  fn list_for(
    &self,
    contract_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ContractEvent>, Self::Error>> + Send + '_;
}
