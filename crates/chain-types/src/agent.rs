//! `AgentResult`, execution types, and the prepared-transaction carrier.

use crate::amount::Amount;
use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The registry identity a session's metadata was decoded against. Two handles
/// connected to different runtime versions have distinct registries; an extrinsic
/// built against one registry cannot be submitted through another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub String);

/// An unsigned call, constructed against one session's metadata registry, ready to be
/// simulated, approved, and signed. Construction is not execution: building one makes
/// no network call beyond the session's own metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedTransaction {
    /// The registry this call was built against; must match the executing session's.
    pub registry: RegistryId,
    /// The pallet the call targets, e.g. `"balances"`.
    pub section: String,
    /// The call's method name, e.g. `"transfer_allow_death"`.
    pub method: String,
    /// The SCALE-encoded call arguments.
    pub call_bytes: Vec<u8>,
    /// A human-readable summary of what this call does, for approval prompts.
    pub summary: String,
}

/// What kind of work an `ExecutionStep` / `ExecutionItem` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionType {
    /// Builds, signs, and broadcasts an extrinsic. Spelled `"extrinsic"` on the wire,
    /// matching the LLM plan schema in §6 of the specification.
    #[serde(rename = "extrinsic")]
    Transaction,
    /// Reads data from the chain without submitting anything. Spelled `"data_fetch"`
    /// on the wire.
    #[serde(rename = "data_fetch")]
    DataRead,
    /// Validates input without touching the chain.
    #[serde(rename = "validation")]
    Validation,
    /// Awaits an external input event not specified by this subsystem.
    #[serde(rename = "user_input")]
    UserInput,
}

/// Chain-identifying metadata attached to an `AgentResult` so downstream consumers
/// (the executioner, a UI) can describe the operation without re-deriving it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMetadata {
    /// A human-readable chain name, e.g. `"Polkadot Asset Hub"`.
    pub chain_name: Option<String>,
    /// Native token decimals, echoed from `ChainCapabilities`.
    pub decimals: Option<u32>,
    /// Native token symbol, echoed from `ChainCapabilities`.
    pub symbol: Option<String>,
    /// The transfer/batch method ultimately selected by the safe builder.
    pub method: Option<String>,
    /// The account address that will sign and send this transaction, needed by the
    /// executioner to request approval and invoke the signer. Absent for data-read
    /// and validation results, which never reach the signing pipeline.
    pub sender: Option<String>,
    /// The validation method used if the agent ran a simulation dry-run
    /// (`"simulated"`, `"fee_query"`), absent if no validation ran.
    pub validation_method: Option<String>,
    /// Free-form extra fields, preserved for forward compatibility.
    pub extra: HashMap<String, serde_json::Value>,
}

/// The typed result of dispatching one agent operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// A human-readable description of what this operation will do.
    pub description: String,
    /// What kind of work this result represents.
    pub execution_type: ExecutionType,
    /// The prepared transaction, present for `ExecutionType::Transaction`.
    pub transaction: Option<PreparedTransaction>,
    /// The payload produced by a data-read or validation step.
    pub data: Option<serde_json::Value>,
    /// The estimated fee, in the smallest unit. From simulation if available, else a
    /// conservative constant.
    pub estimated_fee: Amount,
    /// Non-fatal warnings accumulated while building this result.
    pub warnings: Vec<Warning>,
    /// Chain metadata sufficient to re-describe the transaction on demand.
    pub metadata: AgentMetadata,
}

impl AgentResult {
    /// Builds a transaction-carrying result.
    pub fn transaction(
        description: impl Into<String>,
        transaction: PreparedTransaction,
        estimated_fee: Amount,
        warnings: Vec<Warning>,
        metadata: AgentMetadata,
    ) -> Self {
        Self {
            description: description.into(),
            execution_type: ExecutionType::Transaction,
            transaction: Some(transaction),
            data: None,
            estimated_fee,
            warnings,
            metadata,
        }
    }

    /// Builds a data-read or validation result carrying a JSON payload and no
    /// transaction.
    pub fn data(execution_type: ExecutionType, description: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            description: description.into(),
            execution_type,
            transaction: None,
            data: Some(data),
            estimated_fee: Amount::zero(),
            warnings: Vec::new(),
            metadata: AgentMetadata::default(),
        }
    }
}
