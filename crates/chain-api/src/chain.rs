//! The low-level chain RPC surface a connected endpoint exposes.

use async_trait::async_trait;
use chain_types::agent::{PreparedTransaction, RegistryId};
use chain_types::amount::Amount;
use std::collections::HashMap;

/// Errors talking to a connected chain endpoint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// The runtime does not expose the requested call (`section.method`).
    #[error("runtime does not expose {0}.{1}")]
    UnknownCall(String, String),
    /// The constructed call's decoded section/method did not match what was requested.
    #[error("metadata mismatch: expected {expected}, got {got}")]
    MetadataMismatch {
        /// The section/method that was requested.
        expected: String,
        /// The section/method the constructed extrinsic actually decoded to.
        got: String,
    },
    /// The underlying transport returned an error.
    #[error("transport error: {0}")]
    Transport(String),
    /// The connection was lost or was never established.
    #[error("not connected")]
    NotConnected,
}

impl chain_types::ErrorCode for ChainError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownCall(..) => "UNKNOWN_CALL",
            Self::MetadataMismatch { .. } => "METADATA_MISMATCH",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::NotConnected => "NOT_CONNECTED",
        }
    }
}

/// A sender's on-chain balance, as returned by `system.account`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    /// Spendable balance.
    pub free: Amount,
    /// Balance reserved by another pallet (staking, proxies, ...).
    pub reserved: Amount,
    /// Balance frozen by a lock and unusable even though still "free".
    pub frozen: Amount,
}

impl AccountBalance {
    /// The balance actually available to pay a transfer plus its fee:
    /// `free - frozen`, floored at zero.
    pub fn spendable(&self) -> Amount {
        (&self.free - &self.frozen).unwrap_or_else(Amount::zero)
    }
}

/// Named, JSON-valued arguments to a runtime call, used to construct a
/// [`chain_types::agent::PreparedTransaction`] without the caller needing to know the
/// call's SCALE encoding.
#[derive(Debug, Clone, Default)]
pub struct CallArgs(pub HashMap<String, serde_json::Value>);

impl CallArgs {
    /// An empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one named argument, builder-style.
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }
}

/// A transaction that has been signed and is ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedExtrinsic {
    /// The registry the originating `PreparedTransaction` was built against.
    pub registry: RegistryId,
    /// The fully encoded, signed extrinsic bytes.
    pub bytes: Vec<u8>,
}

/// One status update observed while watching a submitted extrinsic.
#[derive(Debug, Clone, PartialEq)]
pub enum TxStatus {
    /// Included in a non-finalized block.
    InBlock {
        /// The including block's hash.
        block_hash: String,
        /// The extrinsic's hash.
        tx_hash: String,
    },
    /// Included in a finalized block; `dispatch_error` is `Some` if the pallet call
    /// itself failed (`ExtrinsicFailed`) even though the block finalized successfully.
    Finalized {
        /// The finalizing block's hash.
        block_hash: String,
        /// The extrinsic's hash.
        tx_hash: String,
        /// The decoded dispatch error, if the call failed.
        dispatch_error: Option<String>,
        /// Decoded events emitted by the dispatch.
        events: Vec<chain_types::status::ChainEvent>,
    },
    /// The node rejected the extrinsic outright (bad signature, stale nonce, ...).
    Invalid(String),
    /// The extrinsic was evicted from the pool before inclusion.
    Dropped(String),
    /// A conflicting extrinsic from the same account replaced this one in the pool.
    Usurped(String),
}

/// A stream of status updates for one submitted extrinsic. Boxed so transports can
/// back it with whatever async primitive they like without leaking the type.
pub type TxStatusStream = std::pin::Pin<Box<dyn futures::Stream<Item = TxStatus> + Send>>;

/// The low-level surface one connected endpoint exposes. Implementations wrap a
/// concrete transport (a websocket JSON-RPC client); this subsystem only depends on
/// the trait.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// The runtime's `system_chain` value.
    async fn system_chain(&self) -> Result<String, ChainError>;

    /// The runtime's `specName` and `specVersion`.
    async fn runtime_spec(&self) -> Result<(String, u32), ChainError>;

    /// Whether the connected runtime's metadata exposes `section.method`.
    async fn has_call(&self, section: &str, method: &str) -> Result<bool, ChainError>;

    /// The chain's configured SS58 address prefix, if advertised.
    async fn ss58_prefix(&self) -> Result<Option<u16>, ChainError>;

    /// The native token's decimal places, if advertised.
    async fn token_decimals(&self) -> Result<Option<u32>, ChainError>;

    /// The native token's ticker symbol, if advertised.
    async fn token_symbol(&self) -> Result<Option<String>, ChainError>;

    /// The `balances` pallet's existential deposit constant, if advertised.
    async fn existential_deposit(&self) -> Result<Option<Amount>, ChainError>;

    /// Reads one account's free/reserved/frozen balance.
    async fn account_balance(&self, address: &str) -> Result<AccountBalance, ChainError>;

    /// Encodes a call against this session's metadata registry. The returned
    /// transaction's `section`/`method` are asserted by the caller (the safe builder)
    /// to match what was requested; a mismatch means metadata decoded differently
    /// than expected and is a bug in the caller, not a recoverable condition.
    fn construct_call(
        &self,
        section: &str,
        method: &str,
        args: CallArgs,
    ) -> Result<PreparedTransaction, ChainError>;

    /// A best-effort fee estimate for an unsigned call, used when no simulator is
    /// configured (a structural `paymentInfo`-style query, not a dispatch dry-run).
    async fn query_fee(&self, tx: &PreparedTransaction) -> Result<Amount, ChainError>;

    /// Submits a signed extrinsic and returns a stream of status updates.
    async fn submit_and_watch(&self, signed: SignedExtrinsic) -> Result<TxStatusStream, ChainError>;

    /// This endpoint's metadata registry identity.
    fn registry(&self) -> RegistryId;
}
