//! Signing and signature-integrity logic for Pact contracts.
//!
//! - [`token`]: possession-proof tokens handed to signers.
//! - [`engine`]: keyed HMAC binding signer, content, and time.
//! - [`certificate`]: portable certificates with a short verification code.
//! - [`keyring`]: the process-wide signing engine, initialised once.
//! - [`workflow`]: the orchestrator every caller goes through to move a
//!   contract along its lifecycle.

pub mod certificate;
pub mod engine;
pub mod error;
pub mod keyring;
pub mod notify;
pub mod token;
pub mod workflow;

pub use certificate::{CertificateAuthority, CertificateBundle, DigitalCertificate};
pub use engine::{SignatureEngine, SignerIdentity, SigningSecret};
pub use error::{Error, Result};
pub use notify::{NoopNotifier, SignedNotification, SigningNotifier};
pub use token::SignatureToken;
pub use workflow::ContractSigningWorkflow;

#[cfg(test)]
mod tests;
