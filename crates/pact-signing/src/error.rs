//! Error type for `pact-signing`.
//!
//! The workflow is the single place that turns store, ledger, and validation
//! failures into these variants. A verification check that fails is a `false`,
//! never an error.

use pact_core::contract::ContractStatus;
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Wrong or missing token, unknown contract, or contract not in `sent`.
  /// Shown to signers as "link invalid or already used".
  #[error("signing link is invalid or already used")]
  InvalidTokenOrState,

  /// The token matched but the contract is past `expires_at`. The contract has
  /// been moved to `expired` as part of producing this error.
  #[error("signing link has expired")]
  Expired,

  #[error("invalid signer submission: {0}")]
  InvalidSubmission(String),

  #[error("cannot {action} a contract in status {from}")]
  InvalidTransition {
    from:   ContractStatus,
    action: &'static str,
  },

  #[error("contract not found: {0}")]
  NotFound(Uuid),

  /// A read or conditional write did not complete. Retrying the whole
  /// operation from the start is safe.
  #[error("persistence failure: {0}")]
  PersistenceFailure(#[source] BoxError),

  /// The audit trail write failed. Only surfaced by operations whose sole
  /// effect is the ledger write.
  #[error("ledger append failure: {0}")]
  LedgerAppendFailure(#[source] BoxError),

  #[error("signing secret must be at least {min} bytes, got {len}")]
  WeakSecret { len: usize, min: usize },

  #[error("signing keyring is already initialised")]
  AlreadyInitialized,

  #[error("signing keyring has not been initialised")]
  NotInitialized,
}

impl Error {
  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::PersistenceFailure(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
