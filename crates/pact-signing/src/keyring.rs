//! The process-wide signing engine.
//!
//! The HMAC secret is read-only after startup and shared by every request, so
//! it lives in a [`OnceLock`]. Initialisation happens exactly once, from
//! configuration, before the server accepts traffic; a second attempt is an
//! error rather than a silent overwrite.

use std::sync::OnceLock;

use crate::{Error, Result, SignatureEngine, SigningSecret};

static ENGINE: OnceLock<SignatureEngine> = OnceLock::new();

/// Install the process-wide engine. Fails with
/// [`Error::AlreadyInitialized`] if called more than once.
pub fn initialize(secret: SigningSecret) -> Result<&'static SignatureEngine> {
  ENGINE
    .set(SignatureEngine::new(secret))
    .map_err(|_| Error::AlreadyInitialized)?;
  engine()
}

pub fn is_initialized() -> bool { ENGINE.get().is_some() }

/// The installed engine, for read-path verification outside the workflow.
pub fn engine() -> Result<&'static SignatureEngine> {
  ENGINE.get().ok_or(Error::NotInitialized)
}
