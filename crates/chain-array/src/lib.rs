#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Execution array
//!
//! A pure in-memory queue of [`array::ExecutionItem`]s, each wrapping one agent's
//! result and its execution-lifecycle status. The array itself never drives a
//! transaction; it only records state transitions and notifies observers — driving
//! items to a terminal state is `chain-executioner`'s job.

/// `ExecutionArray`, `ExecutionItem`, and the observer/subscription types.
pub mod array;
/// Errors mutating or querying an array.
pub mod error;

pub use array::{ArrayState, ExecutionArray, ExecutionItem, ItemError, ItemObserver, SubscriptionId};
pub use error::ArrayError;
