#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Executioner
//!
//! Drives an `ExecutionArray`'s pending items to a terminal state: optional
//! pre-approval simulation, an approval callback, signing, broadcast, and finality
//! tracking — one item at a time, or a batched suffix of transactions wrapped into a
//! single `utility.batch`/`batch_all` call.

/// Errors raised while executing one item.
pub mod error;
/// The `Executioner` and its per-session bookkeeping.
pub mod executioner;
/// Knobs controlling one pass.
pub mod options;

pub use error::ExecutionError;
pub use executioner::{Executioner, SessionEntry};
pub use options::ExecutorOptions;
