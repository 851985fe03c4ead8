//! [`SqliteStore`], the SQLite implementation of [`ContractStore`] and
//! [`EventLedger`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pact_core::{
  contract::{Contract, ContractStatus, NewContract, SignatureData},
  event::{ContractEvent, NewContractEvent},
  store::{ContractStore, EventLedger},
};

use crate::{
  Error, Result,
  encode::{
    CONTRACT_COLUMNS, RawContract, RawEvent, encode_dt, encode_signature_data,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Contracts and their event ledger, backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single conditional `UPDATE` and report whether it touched a row.
  async fn execute_transition(
    &self,
    sql: &'static str,
    params: Vec<Option<String>>,
  ) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(n)
      })
      .await?;
    Ok(changed == 1)
  }
}

// ─── ContractStore impl ──────────────────────────────────────────────────────

impl ContractStore for SqliteStore {
  type Error = Error;

  async fn create_contract(&self, input: NewContract) -> Result<Contract> {
    let contract = Contract {
      contract_id:     Uuid::new_v4(),
      user_id:         input.user_id,
      title:           input.title,
      content:         input.content,
      status:          ContractStatus::Draft,
      signature_token: None,
      expires_at:      None,
      signed_at:       None,
      signature_data:  None,
      created_at:      Utc::now(),
    };

    let id_str     = encode_uuid(contract.contract_id);
    let user_id    = contract.user_id.clone();
    let title      = contract.title.clone();
    let content    = contract.content.clone();
    let status_str = contract.status.as_str();
    let at_str     = encode_dt(contract.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contracts (contract_id, user_id, title, content, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_id, title, content, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(contract)
  }

  async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContract> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE contract_id = ?1"),
              rusqlite::params![id_str],
              RawContract::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContract::into_contract).transpose()
  }

  async fn list_contracts(&self, user_id: &str) -> Result<Vec<Contract>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawContract> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE user_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawContract::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContract::into_contract).collect()
  }

  async fn update_content(&self, id: Uuid, content: String) -> Result<bool> {
    self
      .execute_transition(
        "UPDATE contracts SET content = ?2
         WHERE contract_id = ?1 AND status = 'draft'",
        vec![Some(encode_uuid(id)), Some(content)],
      )
      .await
  }

  async fn mark_sent(
    &self,
    id:         Uuid,
    token:      String,
    expires_at: DateTime<Utc>,
  ) -> Result<bool> {
    self
      .execute_transition(
        "UPDATE contracts
         SET status = 'sent', signature_token = ?2, expires_at = ?3
         WHERE contract_id = ?1 AND status = 'draft'",
        vec![Some(encode_uuid(id)), Some(token), Some(encode_dt(expires_at))],
      )
      .await
  }

  async fn mark_signed(&self, id: Uuid, signature: SignatureData) -> Result<bool> {
    let signed_at = encode_dt(signature.signed_at);
    let data_json = encode_signature_data(&signature)?;

    self
      .execute_transition(
        "UPDATE contracts
         SET status = 'signed', signed_at = ?2, signature_data = ?3,
             signature_token = NULL
         WHERE contract_id = ?1 AND status = 'sent'",
        vec![Some(encode_uuid(id)), Some(signed_at), Some(data_json)],
      )
      .await
  }

  async fn mark_expired(&self, id: Uuid) -> Result<bool> {
    self
      .execute_transition(
        "UPDATE contracts SET status = 'expired', signature_token = NULL
         WHERE contract_id = ?1 AND status = 'sent'",
        vec![Some(encode_uuid(id))],
      )
      .await
  }

  async fn mark_cancelled(&self, id: Uuid) -> Result<bool> {
    self
      .execute_transition(
        "UPDATE contracts SET status = 'cancelled', signature_token = NULL
         WHERE contract_id = ?1 AND status IN ('draft', 'sent')",
        vec![Some(encode_uuid(id))],
      )
      .await
  }
}

// ─── EventLedger impl ────────────────────────────────────────────────────────

impl EventLedger for SqliteStore {
  type Error = Error;

  async fn append(&self, input: NewContractEvent) -> Result<ContractEvent> {
    let event = ContractEvent {
      event_id:    Uuid::new_v4(),
      contract_id: input.contract_id,
      event_type:  input.event_type,
      description: input.description,
      metadata:    input.metadata,
      created_at:  Utc::now(),
    };

    let event_id_str    = encode_uuid(event.event_id);
    let contract_id_str = encode_uuid(event.contract_id);
    let type_str        = event.event_type.as_str();
    let description     = event.description.clone();
    let metadata_str    = event.metadata.to_string();
    let at_str          = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contract_events (
             event_id, contract_id, event_type, description, metadata, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            event_id_str,
            contract_id_str,
            type_str,
            description,
            metadata_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_for(&self, contract_id: Uuid) -> Result<Vec<ContractEvent>> {
    let id_str = encode_uuid(contract_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        // rowid breaks ties between events recorded within the same microsecond.
        let mut stmt = conn.prepare(
          "SELECT event_id, contract_id, event_type, description, metadata, created_at
           FROM contract_events
           WHERE contract_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawEvent {
              event_id:    row.get(0)?,
              contract_id: row.get(1)?,
              event_type:  row.get(2)?,
              description: row.get(3)?,
              metadata:    row.get(4)?,
              created_at:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
