//! Workflow tests against an in-memory SQLite store.

use std::{
  io,
  sync::{Arc, Mutex},
  time::Duration as StdDuration,
};

use chrono::{Duration, Utc};
use pact_core::{
  contract::{Contract, ContractStatus, NewContract, SignatureData, SignerSubmission},
  event::{ContractEvent, EventType, NewContractEvent},
  store::{ContractStore, EventLedger},
};
use pact_store_sqlite::SqliteStore;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
  CertificateAuthority, ContractSigningWorkflow, Error, SignatureEngine,
  SignedNotification, SigningNotifier, SigningSecret,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn engine() -> SignatureEngine {
  SignatureEngine::new(SigningSecret::new(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap())
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn workflow() -> ContractSigningWorkflow<SqliteStore, SqliteStore> {
  let s = store().await;
  ContractSigningWorkflow::new(s.clone(), s, engine())
}

fn ana() -> SignerSubmission {
  SignerSubmission {
    name:        "Ana".into(),
    email:       "ana@x.com".into(),
    ip_address:  "1.2.3.4".into(),
    user_agent:  "UA".into(),
    geolocation: None,
  }
}

/// A `sent` contract with a known token, bypassing `send` so the token and
/// expiry are under the test's control.
async fn sent_contract<S: ContractStore>(store: &S, token: &str, expires_in: Duration) -> Contract {
  let contract = store
    .create_contract(NewContract {
      user_id: "owner".into(),
      title:   "Logo design".into(),
      content: "The designer delivers two logo concepts.".into(),
    })
    .await
    .unwrap();
  assert!(
    store
      .mark_sent(contract.contract_id, token.into(), Utc::now() + expires_in)
      .await
      .unwrap()
  );
  store.get_contract(contract.contract_id).await.unwrap().unwrap()
}

struct FailingLedger;

impl EventLedger for FailingLedger {
  type Error = io::Error;

  async fn append(&self, _: NewContractEvent) -> Result<ContractEvent, io::Error> {
    Err(io::Error::other("ledger offline"))
  }

  async fn list_for(&self, _: Uuid) -> Result<Vec<ContractEvent>, io::Error> {
    Ok(Vec::new())
  }
}

#[derive(Default)]
struct RecordingNotifier {
  sent: Mutex<Vec<SignedNotification>>,
}

impl SigningNotifier for Arc<RecordingNotifier> {
  type Error = std::convert::Infallible;

  async fn notify_signed(&self, n: SignedNotification) -> Result<(), Self::Error> {
    self.sent.lock().unwrap().push(n);
    Ok(())
  }
}

struct FailingNotifier;

impl SigningNotifier for FailingNotifier {
  type Error = io::Error;

  async fn notify_signed(&self, _: SignedNotification) -> Result<(), io::Error> {
    Err(io::Error::other("webhook unreachable"))
  }
}

/// What [`ScriptedStore`] does when asked to commit a signature.
enum OnSign {
  Fail,
  /// Another transition lands between the token check and the write.
  LoseRace,
  /// Commit, signal `committed`, then hold the call open until `release`.
  Pause { committed: Arc<Notify>, release: Arc<Notify> },
}

/// SQLite underneath, with a scripted `mark_signed`.
struct ScriptedStore {
  inner:   SqliteStore,
  on_sign: OnSign,
}

impl ContractStore for ScriptedStore {
  type Error = io::Error;

  async fn create_contract(&self, input: NewContract) -> Result<Contract, io::Error> {
    self.inner.create_contract(input).await.map_err(io::Error::other)
  }

  async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>, io::Error> {
    self.inner.get_contract(id).await.map_err(io::Error::other)
  }

  async fn list_contracts(&self, user_id: &str) -> Result<Vec<Contract>, io::Error> {
    self.inner.list_contracts(user_id).await.map_err(io::Error::other)
  }

  async fn update_content(&self, id: Uuid, content: String) -> Result<bool, io::Error> {
    self.inner.update_content(id, content).await.map_err(io::Error::other)
  }

  async fn mark_sent(
    &self,
    id: Uuid,
    token: String,
    expires_at: chrono::DateTime<Utc>,
  ) -> Result<bool, io::Error> {
    self.inner.mark_sent(id, token, expires_at).await.map_err(io::Error::other)
  }

  async fn mark_signed(&self, id: Uuid, signature: SignatureData) -> Result<bool, io::Error> {
    match &self.on_sign {
      OnSign::Fail => Err(io::Error::other("disk I/O error")),
      OnSign::LoseRace => {
        self.inner.mark_cancelled(id).await.map_err(io::Error::other)?;
        self.inner.mark_signed(id, signature).await.map_err(io::Error::other)
      }
      OnSign::Pause { committed, release } => {
        let won = self
          .inner
          .mark_signed(id, signature)
          .await
          .map_err(io::Error::other)?;
        committed.notify_one();
        release.notified().await;
        Ok(won)
      }
    }
  }

  async fn mark_expired(&self, id: Uuid) -> Result<bool, io::Error> {
    self.inner.mark_expired(id).await.map_err(io::Error::other)
  }

  async fn mark_cancelled(&self, id: Uuid) -> Result<bool, io::Error> {
    self.inner.mark_cancelled(id).await.map_err(io::Error::other)
  }
}

async fn event_kinds<L: EventLedger>(ledger: &L, id: Uuid) -> Vec<EventType> {
  ledger
    .list_for(id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.event_type)
    .collect()
}

// ─── Signing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signing_with_correct_token_signs_and_records_event() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let signed = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();

  assert_eq!(signed.status, ContractStatus::Signed);
  assert!(signed.signature_token.is_none());
  let data = signed.signature_data.as_ref().unwrap();
  assert_eq!(data.signer_name, "Ana");
  assert_eq!(data.signature_hash.len(), 64);
  assert!(data.signature_hash.chars().all(|c| c.is_ascii_hexdigit()));
  assert_eq!(signed.signed_at, Some(data.signed_at));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Signed);
  assert_eq!(stored.signature_data.as_ref(), Some(data));

  let events = wf.events(c1.contract_id).await.unwrap();
  assert_eq!(events[0].event_type, EventType::Signed);
  assert_eq!(events[0].metadata["signature_hash"], data.signature_hash.as_str());
}

#[tokio::test]
async fn wrong_token_changes_nothing() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;
  let events_before = wf.events(c1.contract_id).await.unwrap().len();

  let result = wf.sign(c1.contract_id, "wrong", ana()).await;
  assert!(matches!(result, Err(Error::InvalidTokenOrState)));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Sent);
  assert_eq!(stored.signature_token.as_deref(), Some("abc123"));
  assert_eq!(wf.events(c1.contract_id).await.unwrap().len(), events_before);
}

#[tokio::test]
async fn unknown_or_unsent_contracts_are_rejected_alike() {
  let wf = workflow().await;
  assert!(matches!(
    wf.sign(Uuid::new_v4(), "abc123", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));

  let draft = wf
    .create(NewContract {
      user_id: "owner".into(),
      title:   "Draft".into(),
      content: "Not sent yet.".into(),
    })
    .await
    .unwrap();
  assert!(matches!(
    wf.sign(draft.contract_id, "", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));
}

#[tokio::test]
async fn expired_token_expires_the_contract() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::minutes(-1)).await;

  let result = wf.sign(c1.contract_id, "abc123", ana()).await;
  assert!(matches!(result, Err(Error::Expired)));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Expired);
  assert!(stored.signature_token.is_none());
  assert!(stored.signature_data.is_none());

  let kinds: Vec<_> = wf
    .events(c1.contract_id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.event_type)
    .collect();
  assert!(kinds.contains(&EventType::Expired));
  assert!(!kinds.contains(&EventType::Signed));

  // The contract is terminal now; the same token is simply invalid.
  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));
}

#[tokio::test]
async fn wrong_token_on_expired_contract_does_not_expire_it() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::minutes(-1)).await;

  assert!(matches!(
    wf.sign(c1.contract_id, "wrong", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));
  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Sent);
}

#[tokio::test]
async fn replayed_signing_is_rejected() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let first = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();
  let mallory = SignerSubmission { name: "Mallory".into(), ..ana() };
  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", mallory).await,
    Err(Error::InvalidTokenOrState)
  ));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.signature_data, first.signature_data);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signings_have_exactly_one_winner() {
  let wf = Arc::new(workflow().await);
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let handles: Vec<_> = (0..16)
    .map(|i| {
      let wf = Arc::clone(&wf);
      let id = c1.contract_id;
      tokio::spawn(async move {
        let who = SignerSubmission { name: format!("Signer {i}"), ..ana() };
        wf.sign(id, "abc123", who).await
      })
    })
    .collect();

  let mut winners = Vec::new();
  for handle in handles {
    match handle.await.unwrap() {
      Ok(contract) => winners.push(contract),
      Err(Error::InvalidTokenOrState) => {}
      Err(other) => panic!("unexpected error: {other}"),
    }
  }

  assert_eq!(winners.len(), 1);
  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.signature_data, winners[0].signature_data);

  let signed_events = wf
    .events(c1.contract_id)
    .await
    .unwrap()
    .into_iter()
    .filter(|e| e.event_type == EventType::Signed)
    .count();
  assert_eq!(signed_events, 1);
}

#[tokio::test]
async fn invalid_submission_leaves_contract_sent() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let bad = SignerSubmission { email: "not-an-email".into(), ..ana() };
  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", bad).await,
    Err(Error::InvalidSubmission(_))
  ));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Sent);
  assert!(wf.sign(c1.contract_id, "abc123", ana()).await.is_ok());
}

#[tokio::test]
async fn ledger_failure_does_not_undo_signing() {
  let s = store().await;
  let wf = ContractSigningWorkflow::new(s.clone(), FailingLedger, engine());
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  let signed = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();
  assert_eq!(signed.status, ContractStatus::Signed);

  let stored = s.get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Signed);
}

#[tokio::test]
async fn notifier_receives_signing_details() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let wf = ContractSigningWorkflow::new(s.clone(), s.clone(), engine())
    .with_notifier(Arc::clone(&notifier));
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  let signed = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();

  let sent = notifier.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].contract_id, c1.contract_id);
  assert_eq!(sent[0].user_id, "owner");
  assert_eq!(sent[0].signer_email, "ana@x.com");
  assert_eq!(Some(sent[0].signed_at), signed.signed_at);
}

#[tokio::test]
async fn notifier_failure_does_not_undo_signing() {
  let s = store().await;
  let wf = ContractSigningWorkflow::new(s.clone(), s.clone(), engine())
    .with_notifier(FailingNotifier);
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  assert!(wf.sign(c1.contract_id, "abc123", ana()).await.is_ok());
  let stored = s.get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Signed);
}

#[tokio::test]
async fn store_failure_on_commit_signs_nothing() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let scripted = ScriptedStore { inner: s.clone(), on_sign: OnSign::Fail };
  let wf = ContractSigningWorkflow::new(scripted, s.clone(), engine())
    .with_notifier(Arc::clone(&notifier));
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", ana()).await,
    Err(Error::PersistenceFailure(_))
  ));

  let stored = s.get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Sent);
  assert!(stored.signature_data.is_none());
  assert!(!event_kinds(&s, c1.contract_id).await.contains(&EventType::Signed));
  assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn losing_the_commit_race_is_invalid_token() {
  let s = store().await;
  let notifier = Arc::new(RecordingNotifier::default());
  let scripted = ScriptedStore { inner: s.clone(), on_sign: OnSign::LoseRace };
  let wf = ContractSigningWorkflow::new(scripted, s.clone(), engine())
    .with_notifier(Arc::clone(&notifier));
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));

  let stored = s.get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Cancelled);
  assert!(stored.signature_data.is_none());
  assert!(!event_kinds(&s, c1.contract_id).await.contains(&EventType::Signed));
  assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn signing_dropped_mid_commit_still_records_and_notifies() {
  let s = store().await;
  let committed = Arc::new(Notify::new());
  let release = Arc::new(Notify::new());
  let notifier = Arc::new(RecordingNotifier::default());
  let scripted = ScriptedStore {
    inner:   s.clone(),
    on_sign: OnSign::Pause {
      committed: Arc::clone(&committed),
      release:   Arc::clone(&release),
    },
  };
  let wf = ContractSigningWorkflow::new(scripted, s.clone(), engine())
    .with_notifier(Arc::clone(&notifier));
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  {
    let signing = wf.sign(c1.contract_id, "abc123", ana());
    tokio::pin!(signing);
    tokio::select! {
      _ = &mut signing => panic!("signing returned while the store was paused"),
      _ = committed.notified() => {}
    }
    // The caller goes away here, with the row already written.
  }
  release.notify_one();

  tokio::time::timeout(StdDuration::from_secs(5), async {
    while notifier.sent.lock().unwrap().is_empty() {
      tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
  })
  .await
  .expect("notification never sent after the caller dropped");

  let stored = s.get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Signed);
  assert_eq!(event_kinds(&s, c1.contract_id).await[0], EventType::Signed);
}

// ─── Verification ────────────────────────────────────────────────────────────

#[tokio::test]
async fn stored_signature_verifies_until_content_drifts() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;
  wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert!(wf.verify_signature(&stored));

  let mut tampered = stored.clone();
  tampered.content.push_str(" Payment terms: net 90.");
  assert!(!wf.verify_signature(&tampered));

  let mut forged_signer = stored;
  if let Some(data) = forged_signer.signature_data.as_mut() {
    data.signer_email = "someone@else.com".into();
  }
  assert!(!wf.verify_signature(&forged_signer));
}

#[tokio::test]
async fn signature_from_another_key_does_not_verify() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;
  let signed = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();

  let other_key = SignatureEngine::new(SigningSecret::new(vec![9u8; 48]).unwrap());
  let other = ContractSigningWorkflow::new(wf.store().clone(), wf.store().clone(), other_key);
  assert!(!other.verify_signature(&signed));
}

#[tokio::test]
async fn certificate_is_issued_only_for_signed_contracts() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;
  assert!(wf.certificate(&c1).is_none());
  assert!(!wf.verify_signature(&c1));

  let signed = wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();
  let cert = wf.certificate(&signed).unwrap();
  assert!(CertificateAuthority::verify(&cert.certificate, &cert.verification_code));

  let bundle = CertificateAuthority::decode(&cert.certificate).unwrap();
  assert_eq!(
    Some(bundle.signature.as_str()),
    signed.signature_data.as_ref().map(|d| d.signature_hash.as_str())
  );
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_send_mints_a_fresh_token() {
  let wf = workflow().await;
  let draft = wf
    .create(NewContract {
      user_id: "owner".into(),
      title:   "Retainer".into(),
      content: "Monthly retainer of 20 hours.".into(),
    })
    .await
    .unwrap();
  assert_eq!(draft.status, ContractStatus::Draft);

  let sent = wf.send(draft.contract_id, Duration::days(7)).await.unwrap();
  assert_eq!(sent.status, ContractStatus::Sent);
  let token = sent.signature_token.clone().unwrap();
  assert_eq!(token.len(), 64);
  assert!(sent.expires_at.unwrap() > Utc::now() + Duration::days(6));

  let stored = wf.store().get_contract(draft.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.signature_token.as_deref(), Some(token.as_str()));

  let kinds: Vec<_> = wf
    .events(draft.contract_id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.event_type)
    .collect();
  assert_eq!(kinds, vec![EventType::Sent, EventType::Created]);

  assert!(matches!(
    wf.send(draft.contract_id, Duration::days(7)).await,
    Err(Error::InvalidTransition { from: ContractStatus::Sent, action: "send" })
  ));

  assert!(wf.sign(draft.contract_id, &token, ana()).await.is_ok());
}

#[tokio::test]
async fn send_unknown_contract_is_not_found() {
  let wf = workflow().await;
  let id = Uuid::new_v4();
  assert!(matches!(
    wf.send(id, Duration::days(1)).await,
    Err(Error::NotFound(missing)) if missing == id
  ));
}

#[tokio::test]
async fn cancelled_contract_token_no_longer_validates() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let cancelled = wf
    .cancel(c1.contract_id, Some("client withdrew".into()))
    .await
    .unwrap();
  assert_eq!(cancelled.status, ContractStatus::Cancelled);
  assert!(cancelled.signature_token.is_none());

  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", ana()).await,
    Err(Error::InvalidTokenOrState)
  ));

  let events = wf.events(c1.contract_id).await.unwrap();
  assert_eq!(events[0].event_type, EventType::Cancelled);
  assert_eq!(events[0].metadata["reason"], "client withdrew");
}

#[tokio::test]
async fn signed_contract_cannot_be_cancelled() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;
  wf.sign(c1.contract_id, "abc123", ana()).await.unwrap();

  assert!(matches!(
    wf.cancel(c1.contract_id, None).await,
    Err(Error::InvalidTransition { from: ContractStatus::Signed, action: "cancel" })
  ));
}

#[tokio::test]
async fn viewing_records_an_event_and_hides_the_token() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::hours(1)).await;

  let viewed = wf.record_view(c1.contract_id, "abc123").await.unwrap();
  assert!(viewed.signature_token.is_none());
  assert_eq!(viewed.content, c1.content);

  let events = wf.events(c1.contract_id).await.unwrap();
  assert_eq!(events[0].event_type, EventType::Viewed);

  assert!(matches!(
    wf.record_view(c1.contract_id, "wrong").await,
    Err(Error::InvalidTokenOrState)
  ));
}

#[tokio::test]
async fn viewing_an_expired_link_leaves_the_contract_alone() {
  let wf = workflow().await;
  let c1 = sent_contract(wf.store(), "abc123", Duration::minutes(-1)).await;

  assert!(matches!(
    wf.record_view(c1.contract_id, "abc123").await,
    Err(Error::Expired)
  ));

  let stored = wf.store().get_contract(c1.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.status, ContractStatus::Sent);
  let kinds = event_kinds(wf.store(), c1.contract_id).await;
  assert!(!kinds.contains(&EventType::Expired));
  assert!(!kinds.contains(&EventType::Viewed));

  // A signing attempt is what moves it on.
  assert!(matches!(
    wf.sign(c1.contract_id, "abc123", ana()).await,
    Err(Error::Expired)
  ));
}

#[tokio::test]
async fn drafts_can_be_edited_until_sent() {
  let wf = workflow().await;
  let draft = wf
    .create(NewContract {
      user_id: "owner".into(),
      title:   "Retainer".into(),
      content: "Ten hours a month.".into(),
    })
    .await
    .unwrap();

  let edited = wf
    .update_content(draft.contract_id, "Twenty hours a month.".into())
    .await
    .unwrap();
  assert_eq!(edited.content, "Twenty hours a month.");
  let stored = wf.store().get_contract(draft.contract_id).await.unwrap().unwrap();
  assert_eq!(stored.content, "Twenty hours a month.");

  wf.send(draft.contract_id, Duration::days(1)).await.unwrap();
  assert!(matches!(
    wf.update_content(draft.contract_id, "Forty hours.".into()).await,
    Err(Error::InvalidTransition { from: ContractStatus::Sent, action: "edit" })
  ));
  assert!(matches!(
    wf.update_content(Uuid::new_v4(), "x".into()).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn viewing_surfaces_ledger_failures() {
  let s = store().await;
  let wf = ContractSigningWorkflow::new(s.clone(), FailingLedger, engine());
  let c1 = sent_contract(&s, "abc123", Duration::hours(1)).await;

  assert!(matches!(
    wf.record_view(c1.contract_id, "abc123").await,
    Err(Error::LedgerAppendFailure(_))
  ));
}
