//! Session selection by chain role.

use chain_api::ExecutionSession;
use chain_builder::ChainRole;

/// The set of sessions an orchestrator run has available, one per chain role. A
/// step selects between them via its own `chain` parameter, falling back to
/// `asset_hub` when absent or unparseable — the same default the transfer agent
/// parameters use.
pub struct SessionSet {
    /// The relay-chain session.
    pub relay: ExecutionSession,
    /// The asset-hub (or other system parachain) session.
    pub asset_hub: ExecutionSession,
}

impl SessionSet {
    /// Builds a session set from its two roles.
    pub fn new(relay: ExecutionSession, asset_hub: ExecutionSession) -> Self {
        Self { relay, asset_hub }
    }

    /// The session for the given role.
    pub fn get(&self, role: ChainRole) -> &ExecutionSession {
        match role {
            ChainRole::Relay => &self.relay,
            ChainRole::AssetHub => &self.asset_hub,
        }
    }
}

/// Reads a step's `chain` parameter (`"relay"` or `"asset_hub"`), defaulting to
/// `asset_hub` when absent or unrecognized rather than failing the step — chain
/// selection errors surface later, from the agent or builder, with a specific code.
pub fn step_chain_role(parameters: &std::collections::HashMap<String, serde_json::Value>) -> ChainRole {
    parameters
        .get("chain")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(ChainRole::AssetHub)
}
