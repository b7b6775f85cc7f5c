//! Errors driving one item through signing, broadcast, and finality tracking.

use chain_types::ErrorCode;

/// Errors raised while executing a single transaction item. Every variant becomes an
/// `ItemError` recorded on the array; none of them propagate out of a pass.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// The agent result carries no prepared transaction for an `extrinsic` item.
    #[error("agent result carries no prepared transaction")]
    NoExtrinsic,
    /// The transaction's registry does not match any session the executioner knows.
    #[error("transaction registry does not match a known session")]
    CrossRegistry,
    /// Pre-approval simulation failed.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    /// The approval callback declined the transaction.
    #[error("approval was declined")]
    ApprovalDeclined,
    /// The signer could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),
    /// Submitting the signed extrinsic failed at the transport layer.
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
    /// The extrinsic was included in a finalized block but its dispatch failed.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
    /// The node rejected the extrinsic outright.
    #[error("rejected by the node: {0}")]
    Invalid(String),
    /// The extrinsic was evicted from the pool before inclusion.
    #[error("dropped from the pool: {0}")]
    Dropped(String),
    /// A conflicting extrinsic replaced this one.
    #[error("usurped: {0}")]
    Usurped(String),
    /// The observation window elapsed with no terminal status.
    #[error("observation timed out")]
    Timeout,
    /// Wrapping a batchable suffix into a single transaction failed.
    #[error("batch construction failed: {0}")]
    BatchFailed(String),
}

impl ErrorCode for ExecutionError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoExtrinsic => "NO_EXTRINSIC",
            Self::CrossRegistry => "CROSS_REGISTRY",
            Self::SimulationFailed(_) => "SIMULATION_FAILED",
            Self::ApprovalDeclined => "APPROVAL_DECLINED",
            Self::SigningFailed(_) => "SIGNING_FAILED",
            Self::BroadcastFailed(_) => "BROADCAST_FAILED",
            Self::DispatchFailed(_) => "DISPATCH_FAILED",
            Self::Invalid(_) => "INVALID",
            Self::Dropped(_) => "DROPPED",
            Self::Usurped(_) => "USURPED",
            Self::Timeout => "TIMEOUT",
            Self::BatchFailed(_) => "BATCH_FAILED",
        }
    }
}
