//! The agent registry and the built-in native-token transfer agent.
//!
//! An agent is a stateless unit of work invoked by name: the orchestrator resolves an
//! [`registry::Agent`] from an [`registry::AgentRegistry`] and dispatches a step's
//! function name and parameters to it, getting back an `AgentResult` describing either
//! a prepared transaction or a data read.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod params;
pub mod registry;
pub mod transfer;

pub use error::AgentError;
pub use params::{BatchTransferAgentParams, BatchTransferElement, TransferAgentParams};
pub use registry::{Agent, AgentRegistry};
pub use transfer::AssetTransferAgent;
