//! Wire-shaped parameters for the asset-transfer agent's operations, deserialized
//! directly from an `ExecutionStep`'s JSON parameter object.

use chain_builder::ChainRole;
use serde::Deserialize;

fn default_chain_role() -> ChainRole {
    ChainRole::AssetHub
}

fn default_true() -> bool {
    true
}

/// Parameters for `AssetTransferAgent::transfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferAgentParams {
    /// The sending address.
    pub address: String,
    /// The recipient address, any SS58 prefix.
    pub recipient: String,
    /// The amount, as a decimal or integer string interpreted against the session's
    /// detected decimals.
    pub amount: String,
    /// Which chain role to transfer on. Defaults to `asset_hub`.
    #[serde(default = "default_chain_role")]
    pub chain: ChainRole,
    /// Whether the keep-alive variant is preferred when available.
    #[serde(default)]
    pub keep_alive: bool,
    /// Whether to fail fast if the sender's balance cannot cover the amount.
    #[serde(default = "default_true")]
    pub validate_balance: bool,
    /// Whether the agent should attempt its own pre-return validation dry-run for the
    /// fee estimate. Independent of the executioner's own simulation option.
    #[serde(default)]
    pub enable_simulation: bool,
}

/// One element of a batch transfer: a recipient, amount, and chain role.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchTransferElement {
    /// The recipient address, any SS58 prefix.
    pub recipient: String,
    /// The amount, as a decimal or integer string.
    pub amount: String,
    /// Which chain role this element targets. Defaults to `asset_hub`.
    #[serde(default = "default_chain_role")]
    pub chain: ChainRole,
    /// Whether the keep-alive variant is preferred for this element when available.
    #[serde(default)]
    pub keep_alive: bool,
}

/// Parameters for `AssetTransferAgent::batch_transfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchTransferAgentParams {
    /// The sending address, shared by every element.
    pub address: String,
    /// The individual transfers to wrap into one batch.
    pub transfers: Vec<BatchTransferElement>,
    /// Whether the batch must succeed or fail as one unit (`utility.batch_all`)
    /// rather than allowing independent per-element failures (`utility.batch`).
    #[serde(default)]
    pub atomic: bool,
    /// Whether to fail fast if the sender's balance cannot cover the total amount.
    #[serde(default = "default_true")]
    pub validate_balance: bool,
    /// Whether the agent should attempt its own pre-return validation dry-run.
    #[serde(default)]
    pub enable_simulation: bool,
}
