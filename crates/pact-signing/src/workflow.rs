//! [`ContractSigningWorkflow`], the orchestrator for every contract
//! transition.
//!
//! Signing runs as a short pipeline that can stop at any stage:
//!
//! ```text
//! token check → expiry check → submission check → HMAC → conditional write → ledger → notify
//! ```
//!
//! Only the conditional write decides the outcome. It is guarded on
//! `status = 'sent'`, so of several concurrent attempts exactly one commits
//! and the rest see `InvalidTokenOrState`. Everything after the commit is
//! best-effort: a failed ledger append or notification is logged, and the
//! contract stays signed.
//!
//! A write and its ledger entry run together on their own task. Dropping the
//! caller's future (a client hanging up mid-request) cannot strand a commit
//! without its event.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Duration, SubsecRound as _, Utc};
use pact_core::{
  contract::{Contract, ContractStatus, NewContract, SignatureData, SignerSubmission},
  event::{ContractEvent, EventType, NewContractEvent},
  store::{ContractStore, EventLedger},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
  CertificateAuthority, DigitalCertificate, Error, NoopNotifier, Result,
  SignatureEngine, SignatureToken, SignedNotification, SignerIdentity,
  SigningNotifier, engine::FIELD_SEPARATOR,
};

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

pub struct ContractSigningWorkflow<S, L, N = NoopNotifier> {
  store:    Arc<S>,
  ledger:   Arc<L>,
  engine:   SignatureEngine,
  notifier: Arc<N>,
}

impl<S, L> ContractSigningWorkflow<S, L> {
  pub fn new(store: S, ledger: L, engine: SignatureEngine) -> Self {
    Self {
      store:    Arc::new(store),
      ledger:   Arc::new(ledger),
      engine,
      notifier: Arc::new(NoopNotifier),
    }
  }
}

impl<S, L, N> ContractSigningWorkflow<S, L, N> {
  /// Replace the notifier called after each successful signing.
  pub fn with_notifier<M>(self, notifier: M) -> ContractSigningWorkflow<S, L, M> {
    ContractSigningWorkflow {
      store: self.store,
      ledger: self.ledger,
      engine: self.engine,
      notifier: Arc::new(notifier),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn engine(&self) -> &SignatureEngine { &self.engine }
}

/// A conditional status change, applied by [`ContractSigningWorkflow::commit`].
enum Transition {
  Sent { token: String, expires_at: DateTime<Utc> },
  Signed(SignatureData),
  Expired,
  Cancelled,
}

impl Transition {
  async fn apply<S: ContractStore>(self, store: &S, id: Uuid) -> Result<bool, S::Error> {
    match self {
      Self::Sent { token, expires_at } => store.mark_sent(id, token, expires_at).await,
      Self::Signed(data) => store.mark_signed(id, data).await,
      Self::Expired => store.mark_expired(id).await,
      Self::Cancelled => store.mark_cancelled(id).await,
    }
  }
}

impl<S, L, N> ContractSigningWorkflow<S, L, N>
where
  S: ContractStore + 'static,
  L: EventLedger + 'static,
  N: SigningNotifier + 'static,
{
  // ── Owner-side transitions ────────────────────────────────────────────────

  /// Create a `draft` contract.
  pub async fn create(&self, input: NewContract) -> Result<Contract> {
    let store = Arc::clone(&self.store);
    let ledger = Arc::clone(&self.ledger);

    detached(async move {
      let contract = store
        .create_contract(input)
        .await
        .map_err(Error::persistence)?;

      tracing::info!(contract_id = %contract.contract_id, "contract created");
      record(
        &*ledger,
        NewContractEvent::new(
          contract.contract_id,
          EventType::Created,
          format!("Contract \"{}\" created", contract.title),
        ),
      )
      .await;

      Ok(contract)
    })
    .await
  }

  /// Replace the text of a `draft`. Content is frozen from `send` on, which
  /// is what keeps a signature bound to what the signer saw.
  pub async fn update_content(&self, id: Uuid, content: String) -> Result<Contract> {
    let contract = self.fetch(id).await?.ok_or(Error::NotFound(id))?;
    if contract.status != ContractStatus::Draft {
      return Err(Error::InvalidTransition { from: contract.status, action: "edit" });
    }

    let committed = self
      .store
      .update_content(id, content.clone())
      .await
      .map_err(Error::persistence)?;
    if !committed {
      return Err(self.transition_conflict(id, "edit").await);
    }

    tracing::info!(contract_id = %id, "draft content updated");
    Ok(Contract { content, ..contract })
  }

  /// `draft → sent`: mint a token valid for `ttl` from now.
  pub async fn send(&self, id: Uuid, ttl: Duration) -> Result<Contract> {
    let contract = self.fetch(id).await?.ok_or(Error::NotFound(id))?;
    if contract.status != ContractStatus::Draft {
      return Err(Error::InvalidTransition { from: contract.status, action: "send" });
    }

    let token = SignatureToken::issue();
    let expires_at = now() + ttl;

    let event = NewContractEvent::new(id, EventType::Sent, "Contract sent for signature")
      .with_metadata(json!({ "expires_at": expires_at }));
    let transition = Transition::Sent { token: token.clone(), expires_at };
    if !self.commit(id, transition, event, None).await? {
      return Err(self.transition_conflict(id, "send").await);
    }

    tracing::info!(contract_id = %id, %expires_at, "contract sent for signature");
    Ok(Contract {
      status: ContractStatus::Sent,
      signature_token: Some(token),
      expires_at: Some(expires_at),
      ..contract
    })
  }

  /// `draft | sent → cancelled`. Invalidates any outstanding token.
  pub async fn cancel(&self, id: Uuid, reason: Option<String>) -> Result<Contract> {
    let contract = self.fetch(id).await?.ok_or(Error::NotFound(id))?;
    if contract.status.is_terminal() {
      return Err(Error::InvalidTransition { from: contract.status, action: "cancel" });
    }

    let event = NewContractEvent::new(id, EventType::Cancelled, "Contract cancelled by owner")
      .with_metadata(json!({ "reason": reason }));
    if !self.commit(id, Transition::Cancelled, event, None).await? {
      return Err(self.transition_conflict(id, "cancel").await);
    }

    tracing::info!(contract_id = %id, "contract cancelled");
    Ok(Contract {
      status: ContractStatus::Cancelled,
      signature_token: None,
      ..contract
    })
  }

  // ── Signer-side operations ────────────────────────────────────────────────

  /// Record that the signer opened the signing page. The token must match
  /// and be unexpired. Viewing never changes the contract: a past deadline is
  /// reported as [`Error::Expired`] and the contract stays `sent` until a
  /// signing attempt expires it.
  ///
  /// The returned contract never carries the token.
  pub async fn record_view(&self, id: Uuid, supplied_token: &str) -> Result<Contract> {
    let contract = self.token_holder(id, supplied_token).await?;
    if SignatureToken::is_expired(&contract, now()) {
      tracing::info!(contract_id = %id, "signing page opened after expiry");
      return Err(Error::Expired);
    }

    let event = NewContractEvent::new(id, EventType::Viewed, "Signing page viewed");
    self
      .ledger
      .append(event)
      .await
      .map_err(|e| Error::LedgerAppendFailure(Box::new(e)))?;

    Ok(contract.redacted())
  }

  /// Sign a `sent` contract on behalf of whoever holds its token.
  pub async fn sign(
    &self,
    id: Uuid,
    supplied_token: &str,
    submission: SignerSubmission,
  ) -> Result<Contract> {
    let contract = self.token_holder(id, supplied_token).await?;
    if SignatureToken::is_expired(&contract, now()) {
      return Err(self.expire(&contract).await);
    }
    let submission = validate_submission(submission)?;

    let signed_at = now();
    let signature_hash = self.engine.generate(
      id,
      SignerIdentity {
        name:       &submission.name,
        email:      &submission.email,
        ip_address: &submission.ip_address,
      },
      &contract.content,
      signed_at,
    );

    let data = SignatureData {
      signer_name: submission.name,
      signer_email: submission.email,
      signed_at,
      ip_address: submission.ip_address,
      user_agent: submission.user_agent,
      geolocation: submission.geolocation,
      signature_hash,
    };

    let event = NewContractEvent::new(
      id,
      EventType::Signed,
      format!("Contract signed by {}", data.signer_name),
    )
    .with_metadata(json!({
      "signer_name":    data.signer_name,
      "signer_email":   data.signer_email,
      "ip_address":     data.ip_address,
      "user_agent":     data.user_agent,
      "signature_hash": data.signature_hash,
    }));
    let notification = SignedNotification {
      contract_id:  id,
      user_id:      contract.user_id.clone(),
      signed_at,
      signer_name:  data.signer_name.clone(),
      signer_email: data.signer_email.clone(),
    };

    let committed = self
      .commit(id, Transition::Signed(data.clone()), event, Some(notification))
      .await?;
    if !committed {
      tracing::warn!(contract_id = %id, "signing lost a race with another transition");
      return Err(Error::InvalidTokenOrState);
    }

    tracing::info!(contract_id = %id, signer_email = %data.signer_email, "contract signed");
    Ok(Contract {
      status: ContractStatus::Signed,
      signature_token: None,
      signed_at: Some(signed_at),
      signature_data: Some(data),
      ..contract
    })
  }

  // ── Read path ─────────────────────────────────────────────────────────────

  /// The contract's audit trail, newest first.
  pub async fn events(&self, id: Uuid) -> Result<Vec<ContractEvent>> {
    self.ledger.list_for(id).await.map_err(Error::persistence)
  }

  /// Re-derive the HMAC from the stored signature and the contract's current
  /// content. `false` means "not authentic": unsigned, edited after signing,
  /// or signed under another key.
  pub fn verify_signature(&self, contract: &Contract) -> bool {
    let Some(data) = signed_payload(contract) else {
      return false;
    };
    self.engine.verify(
      contract.contract_id,
      &data.signature_hash,
      SignerIdentity {
        name:       &data.signer_name,
        email:      &data.signer_email,
        ip_address: &data.ip_address,
      },
      &contract.content,
      data.signed_at,
    )
  }

  /// The portable certificate for a signed contract.
  pub fn certificate(&self, contract: &Contract) -> Option<DigitalCertificate> {
    signed_payload(contract).map(CertificateAuthority::issue)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn fetch(&self, id: Uuid) -> Result<Option<Contract>> {
    self.store.get_contract(id).await.map_err(Error::persistence)
  }

  /// The contract, if it exists, is `sent`, and `supplied_token` is its token.
  /// Every failure looks the same to the caller.
  async fn token_holder(&self, id: Uuid, supplied_token: &str) -> Result<Contract> {
    let Some(contract) = self.fetch(id).await? else {
      tracing::warn!(contract_id = %id, "signing attempt for unknown contract");
      return Err(Error::InvalidTokenOrState);
    };
    if !SignatureToken::matches(&contract, supplied_token) {
      tracing::warn!(
        contract_id = %id,
        status = %contract.status,
        "signing attempt with invalid token or state"
      );
      return Err(Error::InvalidTokenOrState);
    }
    Ok(contract)
  }

  /// Lazily expire a `sent` contract whose deadline has passed and return the
  /// error the caller should see.
  async fn expire(&self, contract: &Contract) -> Error {
    let id = contract.contract_id;
    let event = NewContractEvent::new(
      id,
      EventType::Expired,
      "Signing link expired before the contract was signed",
    )
    .with_metadata(json!({ "expires_at": contract.expires_at }));

    match self.commit(id, Transition::Expired, event, None).await {
      Ok(true) => {
        tracing::info!(contract_id = %id, "contract expired on signing attempt");
        Error::Expired
      }
      // Someone else moved the contract on first.
      Ok(false) => Error::InvalidTokenOrState,
      Err(e) => e,
    }
  }

  /// Apply `transition`; if it wins, append `event` and send `notification`.
  /// Returns whether the transition committed.
  async fn commit(
    &self,
    id: Uuid,
    transition: Transition,
    event: NewContractEvent,
    notification: Option<SignedNotification>,
  ) -> Result<bool> {
    let store = Arc::clone(&self.store);
    let ledger = Arc::clone(&self.ledger);
    let notifier = Arc::clone(&self.notifier);

    detached(async move {
      let committed = transition
        .apply(&*store, id)
        .await
        .map_err(Error::persistence)?;
      if !committed {
        return Ok(false);
      }

      record(&*ledger, event).await;
      if let Some(notification) = notification
        && let Err(e) = notifier.notify_signed(notification).await
      {
        tracing::warn!(contract_id = %id, error = %e, "signing notification failed");
      }
      Ok(true)
    })
    .await
  }

  /// A conditional update matched no row: report what the contract is now.
  async fn transition_conflict(&self, id: Uuid, action: &'static str) -> Error {
    match self.fetch(id).await {
      Ok(Some(current)) => Error::InvalidTransition { from: current.status, action },
      Ok(None) => Error::NotFound(id),
      Err(e) => e,
    }
  }
}

/// Run `work` to completion on its own task, whatever happens to the caller.
async fn detached<T, F>(work: F) -> Result<T>
where
  F: Future<Output = Result<T>> + Send + 'static,
  T: Send + 'static,
{
  tokio::spawn(work).await.map_err(Error::persistence)?
}

/// Append to the ledger after a committed transition. The transition stands
/// regardless; a failure is logged for out-of-band repair of the trail.
async fn record<L: EventLedger>(ledger: &L, event: NewContractEvent) {
  let contract_id = event.contract_id;
  let event_type = event.event_type;
  if let Err(e) = ledger.append(event).await {
    tracing::error!(
      %contract_id,
      %event_type,
      error = %e,
      "ledger append failed; audit trail needs manual repair"
    );
  }
}

/// Server time at the precision the signature format records.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

fn signed_payload(contract: &Contract) -> Option<&SignatureData> {
  match contract.status {
    ContractStatus::Signed => contract.signature_data.as_ref(),
    _ => None,
  }
}

/// Trim and check what the signer typed. Name, email, and IP are bound into the
/// canonical message, so they may not contain its separator.
fn validate_submission(mut submission: SignerSubmission) -> Result<SignerSubmission> {
  submission.name = submission.name.trim().to_owned();
  submission.email = submission.email.trim().to_owned();
  submission.ip_address = submission.ip_address.trim().to_owned();

  let invalid = |msg: &str| Err(Error::InvalidSubmission(msg.to_owned()));

  if submission.name.is_empty() {
    return invalid("name is required");
  }
  if submission.name.chars().count() > MAX_NAME_LEN {
    return invalid("name is too long");
  }
  if submission.email.len() > MAX_EMAIL_LEN {
    return invalid("email is too long");
  }
  match submission.email.split_once('@') {
    Some((local, domain))
      if !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !submission.email.contains(char::is_whitespace) => {}
    _ => return invalid("email is not a valid address"),
  }
  if submission.ip_address.is_empty() {
    return invalid("ip address is required");
  }

  for (field, value) in [
    ("name", &submission.name),
    ("email", &submission.email),
    ("ip address", &submission.ip_address),
  ] {
    if value.contains(FIELD_SEPARATOR) || value.chars().any(char::is_control) {
      return Err(Error::InvalidSubmission(format!(
        "{field} contains a reserved character"
      )));
    }
  }

  Ok(submission)
}
