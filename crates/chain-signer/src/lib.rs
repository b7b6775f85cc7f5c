#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Reference signer and approval capabilities
//!
//! Demonstration implementations of `chain-api`'s `Signer` and `ApprovalHandler`
//! seams: an in-process Ed25519 keypair signer, and a stdio approval prompt. Neither
//! is meant for production custody — a real host is expected to delegate signing to a
//! hardware wallet or browser extension, and approval to its own UI.

/// The stdio `ApprovalHandler`.
pub mod approval;
/// The Ed25519 keypair `Signer`.
pub mod keypair;

pub use approval::StdioApprovalHandler;
pub use keypair::KeypairSigner;
