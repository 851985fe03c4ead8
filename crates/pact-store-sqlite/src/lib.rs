//! SQLite backend for Pact contracts and the event ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The single connection serialises
//! writers, and every status transition is a conditional `UPDATE`, so
//! concurrent signers race on the row rather than on in-process state.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
