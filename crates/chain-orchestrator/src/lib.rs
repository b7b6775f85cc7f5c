#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Orchestrator
//!
//! Recovers an `ExecutionPlan` from raw LLM text and resolves it, step by step,
//! against an agent registry into an `ExecutionArray`. The orchestrator never signs
//! or broadcasts anything — that is `chain-executioner`'s job once the array exists.

/// Errors resolving a plan.
pub mod error;
/// Recovering a plan from raw LLM text.
pub mod extract;
/// Resolving a plan into an execution array.
pub mod orchestrator;
/// Session selection by chain role.
pub mod sessions;

pub use error::OrchestratorError;
pub use extract::{extract_json_object, extract_plan, PlanError};
pub use orchestrator::{OrchestrateOptions, Orchestrator};
pub use sessions::{step_chain_role, SessionSet};
