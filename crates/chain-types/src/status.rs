//! The status machine for a queued `ExecutionItem`.

use serde::{Deserialize, Serialize};

/// The lifecycle state of one queued item.
///
/// Legal transitions: `Pending -> Ready -> (Signing -> Broadcasting -> InBlock ->
/// Finalized) | Completed`, and any non-terminal state may transition to `Failed` or
/// `Cancelled`. `Finalized`, `Completed`, `Failed`, and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Queued, not yet picked up by the executioner.
    Pending,
    /// Picked up; about to be simulated/approved.
    Ready,
    /// Approval was granted; the signer has been invoked but has not yet returned.
    Signing,
    /// Signed; the signed extrinsic has been submitted and is awaiting inclusion.
    Broadcasting,
    /// Included in a block that has not yet been finalized.
    InBlock,
    /// Included in a finalized block with a successful dispatch outcome.
    Finalized,
    /// A non-transaction item (data-read, validation) completed successfully.
    Completed,
    /// Terminated with an error.
    Failed,
    /// Terminated by user rejection or external cancellation.
    Cancelled,
}

impl ExecutionStatus {
    /// True for any of the four terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Finalized | Self::Completed | Self::Failed | Self::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Signing => "signing",
            Self::Broadcasting => "broadcasting",
            Self::InBlock => "in_block",
            Self::Finalized => "finalized",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A decoded runtime event attached to a terminal `ExecutionResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// The pallet the event was emitted from, e.g. `"balances"`.
    pub pallet: String,
    /// The event's variant name, e.g. `"Transfer"`.
    pub name: String,
    /// A JSON-encoded rendering of the event's fields.
    pub data: serde_json::Value,
}

/// The terminal outcome of one item's execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the dispatch ultimately succeeded.
    pub success: bool,
    /// The extrinsic hash, present once the item has been broadcast.
    pub tx_hash: Option<String>,
    /// The block hash the extrinsic was finalized in, present on finality.
    pub block_hash: Option<String>,
    /// Decoded events emitted by the dispatch.
    pub events: Vec<ChainEvent>,
    /// A machine-readable error code, present only on failure.
    pub error_code: Option<String>,
    /// A human-readable error message, present only on failure. Never embeds transport
    /// details for validation/execution failures.
    pub error_message: Option<String>,
}

impl ExecutionResult {
    /// Builds a successful result.
    pub fn success(tx_hash: String, block_hash: Option<String>, events: Vec<ChainEvent>) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            block_hash,
            events,
            error_code: None,
            error_message: None,
        }
    }

    /// Builds a failed result carrying a machine-readable code and message.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: None,
            block_hash: None,
            events: Vec::new(),
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }
}
