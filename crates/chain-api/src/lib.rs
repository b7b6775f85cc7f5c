#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Execution engine core traits
//!
//! The seams every other crate in the workspace is built against: the low-level
//! `ChainApi` a connected endpoint exposes, the immutable `ExecutionSession` wrapping
//! one, the `Signer` and `ApprovalHandler` capabilities a host supplies, and the
//! `LlmAdapter` the orchestrator treats as a pure `(message, prompt, context) -> text`
//! function. Concrete transports, wallets, and model clients live outside this
//! workspace; this crate only fixes the contracts.

/// The low-level chain RPC surface a connected endpoint exposes.
pub mod chain;
/// The immutable execution session wrapping one connected `ChainApi`.
pub mod session;
/// The `Signer` and `ApprovalHandler` capabilities.
pub mod signer;
/// The `LlmAdapter` contract and conversation context it is given.
pub mod llm;
/// The `Simulator` capability.
pub mod simulator;

pub use chain::{AccountBalance, CallArgs, ChainApi, ChainError, SignedExtrinsic, TxStatus, TxStatusStream};
pub use session::{ExecutionSession, SessionError};
pub use signer::{ApprovalHandler, BatchSigningRequest, Signer, SignerError, SigningRequest};
pub use llm::{ConversationTurn, LlmAdapter, LlmContext, LlmError, Role};
pub use simulator::{ProgressObserver, SimulationOutcome, SimulationPhase, SimulationProgress, Simulator, SimulatorError};
