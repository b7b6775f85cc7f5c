//! Errors mutating or querying an `ExecutionArray`.

use chain_types::ids::ItemId;
use chain_types::ErrorCode;

/// Errors raised by `ExecutionArray` operations.
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    /// `update_status` or `unsubscribe` referenced an id the array does not hold.
    #[error("no such item: {0}")]
    UnknownItem(ItemId),
}

impl ErrorCode for ArrayError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownItem(_) => "UNKNOWN_ITEM",
        }
    }
}
