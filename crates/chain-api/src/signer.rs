//! Host-supplied signing and approval capabilities.

use crate::chain::SignedExtrinsic;
use async_trait::async_trait;
use chain_types::agent::PreparedTransaction;
use chain_types::amount::Amount;
use chain_types::error::Warning;

/// Errors signing a prepared transaction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignerError {
    /// The user or approval policy declined to sign.
    #[error("signing was declined")]
    Declined,
    /// The signing key or wallet extension could not produce a signature.
    #[error("signing failed: {0}")]
    Failed(String),
    /// The sending account address was malformed or unknown to this signer.
    #[error("unknown account: {0}")]
    UnknownAccount(String),
}

impl chain_types::ErrorCode for SignerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Declined => "SIGNING_DECLINED",
            Self::Failed(_) => "SIGNING_FAILED",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
        }
    }
}

/// Everything an approval prompt needs to describe one transaction to its signer.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// The execution item this request corresponds to.
    pub item_id: String,
    /// The unsigned call to be signed.
    pub transaction: PreparedTransaction,
    /// A human-readable description of what this transaction does.
    pub description: String,
    /// The fee estimate shown to the approver.
    pub estimated_fee: Amount,
    /// Non-fatal warnings (e.g. reaping risk) shown alongside the request.
    pub warnings: Vec<Warning>,
    /// The account address that will sign and send.
    pub sender: String,
}

/// Everything an approval prompt needs to describe a batch of transactions at once.
#[derive(Debug, Clone)]
pub struct BatchSigningRequest {
    /// The execution item ids bundled into this batch, in submission order.
    pub item_ids: Vec<String>,
    /// The unsigned batch call to be signed.
    pub transaction: PreparedTransaction,
    /// Human-readable descriptions of each bundled transaction, in the same order as
    /// `item_ids`.
    pub descriptions: Vec<String>,
    /// The aggregated fee estimate shown to the approver.
    pub estimated_fee: Amount,
    /// Non-fatal warnings accumulated across the batch.
    pub warnings: Vec<Warning>,
    /// The account address that will sign and send.
    pub sender: String,
}

/// A host-supplied capability that turns a prepared transaction into a signed one.
/// Implementations might hold a raw keypair, delegate to a browser extension, or
/// forward to a hardware wallet; this subsystem only depends on the trait.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `tx` on behalf of `sender`, returning the bytes ready for broadcast.
    async fn sign(&self, tx: &PreparedTransaction, sender: &str) -> Result<SignedExtrinsic, SignerError>;
}

/// A host-supplied capability that decides whether a pending transaction may proceed.
/// The default, conservative policy is "ask the user"; a host may instead implement
/// an automated policy (spending limits, allowlists) as long as it still satisfies
/// the trait.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    /// Asks whether a single transaction may be signed and sent.
    async fn request_approval(&self, request: &SigningRequest) -> bool;

    /// Asks whether a bundled batch of transactions may be signed and sent.
    async fn request_batch_approval(&self, request: &BatchSigningRequest) -> bool;
}
