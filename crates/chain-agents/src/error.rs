//! Errors raised dispatching or running an agent operation.

use chain_types::address::AddressError;
use chain_types::amount::{Amount, AmountError};
use chain_types::ErrorCode;

/// Errors raised validating parameters, dispatching by name, or running the
/// asset-transfer agent's operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A sender or recipient address failed to decode.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    /// The sender and recipient decode to the same public key.
    #[error("sender and recipient are the same account")]
    SameSenderRecipient,
    /// The normalized amount was zero.
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// The sender's spendable balance is less than the requested amount.
    #[error("insufficient balance: free {free}, required {required}")]
    InsufficientBalance {
        /// The sender's spendable balance at the time of the check.
        free: Amount,
        /// The amount requested.
        required: Amount,
    },
    /// The batch size was outside `[1, 100]`.
    #[error("batch size {0} outside the allowed range of 1 to 100")]
    BatchSizeOutOfRange(usize),
    /// The session was inactive when the agent began work.
    #[error("session inactive")]
    SessionInactive,
    /// The agent does not expose a function of this name.
    #[error("no such function: {0}")]
    UnknownFunction(String),
    /// The step's parameters did not deserialize into this function's expected shape.
    #[error("bad parameters: {0}")]
    BadParameters(String),
    /// The amount could not be normalized.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    /// Capability detection failed.
    #[error(transparent)]
    Capability(#[from] chain_capability::DetectError),
    /// Building the transaction failed.
    #[error(transparent)]
    Build(#[from] chain_builder::BuildError),
    /// The underlying chain API call failed.
    #[error(transparent)]
    Chain(#[from] chain_api::ChainError),
}

impl ErrorCode for AgentError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(e) => e.code(),
            Self::SameSenderRecipient => "SENDER_EQUALS_RECIPIENT",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::BatchSizeOutOfRange(_) => "INVALID_BATCH_SIZE",
            Self::SessionInactive => "SESSION_INACTIVE",
            Self::UnknownFunction(_) => "BAD_FUNCTION_CALL",
            Self::BadParameters(_) => "BAD_FUNCTION_CALL",
            Self::InvalidAmount(e) => e.code(),
            Self::Capability(e) => e.code(),
            Self::Build(e) => e.code(),
            Self::Chain(e) => e.code(),
        }
    }
}
