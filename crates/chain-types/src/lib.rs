#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Execution engine core types
//!
//! This crate is the foundational library for the execution engine: natural-language
//! requests in, signed-and-finalized extrinsics out. It holds the data structures and
//! error vocabulary shared by every other crate in the workspace — `ExecutionPlan`,
//! `ChainCapabilities`, the normalized `Amount`, SS58 address codec, and the status
//! machine for queued work — so that no two crates invent their own copy.
//!
//! As the base crate, `chain-types` has minimal dependencies and must stay that way:
//! it is a dependency of almost everything else.

/// Arbitrary-precision on-chain amount normalization.
pub mod amount;
/// SS58 address decoding and re-encoding.
pub mod address;
/// The shared `ErrorCode` trait and top-level error taxonomy.
pub mod error;
/// Stable identifiers for plans, steps, and queued items.
pub mod ids;
/// The `ChainCapabilities` snapshot produced by capability detection.
pub mod capabilities;
/// The declarative `ExecutionPlan` / `ExecutionStep` wire shapes.
pub mod plan;
/// `AgentResult`, execution types, and warnings.
pub mod agent;
/// The `ExecutionItem` status machine.
pub mod status;

pub use amount::Amount;
pub use error::ErrorCode;
pub use ids::{ItemId, PlanId, StepId};
