//! Core types and trait definitions for the Pact contract-signing service.
//!
//! This crate is deliberately free of HTTP, database, and cryptographic
//! dependencies. Every other crate depends on it.

// Native `async fn` in traits; futures carry explicit `Send` bounds below.
#![allow(async_fn_in_trait)]

pub mod contract;
pub mod error;
pub mod event;
pub mod store;

pub use error::{Error, Result};
