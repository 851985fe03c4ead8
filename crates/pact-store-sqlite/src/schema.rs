//! SQL schema for the Pact SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contracts (
    contract_id     TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'draft',  -- draft | sent | signed | expired | cancelled
    signature_token TEXT,                           -- set only while status = 'sent'
    expires_at      TEXT,                           -- RFC 3339 UTC
    signed_at       TEXT,                           -- RFC 3339 UTC; written once
    signature_data  TEXT,                           -- JSON SignatureData; written once
    created_at      TEXT NOT NULL,
    CHECK (signature_token IS NULL OR status = 'sent')
);

-- The ledger is strictly append-only.
CREATE TABLE IF NOT EXISTS contract_events (
    event_id    TEXT PRIMARY KEY,
    contract_id TEXT NOT NULL REFERENCES contracts(contract_id),
    event_type  TEXT NOT NULL,   -- created | sent | viewed | signed | expired | cancelled
    description TEXT NOT NULL,
    metadata    TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, fixed width; server-assigned
);

CREATE TRIGGER IF NOT EXISTS contract_events_no_update
BEFORE UPDATE ON contract_events
BEGIN
    SELECT RAISE(ABORT, 'contract_events is append-only');
END;

CREATE TRIGGER IF NOT EXISTS contract_events_no_delete
BEFORE DELETE ON contract_events
BEGIN
    SELECT RAISE(ABORT, 'contract_events is append-only');
END;

CREATE INDEX IF NOT EXISTS contracts_user_idx   ON contracts(user_id);
CREATE INDEX IF NOT EXISTS events_contract_idx  ON contract_events(contract_id, created_at);

PRAGMA user_version = 1;
";
