#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Chainwright test support
//!
//! Mock implementations of every host-supplied trait (`ChainApi`, `Signer`,
//! `ApprovalHandler`, `LlmAdapter`) plus a deterministic fake clock, so the rest of
//! the workspace can test against realistic-but-controllable fixtures instead of
//! opening real sockets or waiting on wall-clock time.

/// Deterministic, checksum-valid SS58 test addresses.
pub mod addresses;
/// A deterministic, manually-advanced clock.
pub mod clock;
/// A configurable fake `ChainApi`.
pub mod mock_chain;
/// A scripted `LlmAdapter`.
pub mod mock_llm;
/// Fake `Signer`/`ApprovalHandler` implementations.
pub mod mock_signer;
/// Builds an `ExecutionSession` over a mock chain in one call.
pub mod session;

pub use addresses::{sample_address, sample_address_with_prefix};
pub use clock::FakeClock;
pub use mock_chain::{MockChainApi, MockChainApiBuilder, TxOutcome};
pub use mock_llm::{FailingLlmAdapter, ScriptedLlmAdapter};
pub use mock_signer::{assert_registry, FixedApprovalHandler, RecordingSigner, RefusingSigner};
pub use session::{mock_session, mock_session_with};
