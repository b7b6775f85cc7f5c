//! The name-keyed agent registry and the `Agent` dispatch capability.
//!
//! An orchestrator step names an agent and a function by string; rather than runtime
//! attribute lookup, each agent implements [`Agent::dispatch`], matching the function
//! name exhaustively and decoding its parameters into a typed struct before doing any
//! work (see the "Dynamic dispatch to agent methods by string name" design note).

use crate::error::AgentError;
use crate::params::{BatchTransferAgentParams, TransferAgentParams};
use crate::transfer::AssetTransferAgent;
use async_trait::async_trait;
use chain_api::ExecutionSession;
use chain_types::agent::AgentResult;
use std::collections::HashMap;
use std::sync::Arc;

/// A stateless unit of work, invocable by name. Implementations must not retain any
/// state between calls to [`Agent::dispatch`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// The name this agent is registered under.
    fn name(&self) -> &'static str;

    /// Invokes `function_name` with `parameters`, decoded into whatever typed shape
    /// that function expects. Unknown function names and parameters that fail to
    /// deserialize both fail with `BAD_FUNCTION_CALL`.
    async fn dispatch(
        &self,
        session: &ExecutionSession,
        function_name: &str,
        parameters: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentResult, AgentError>;
}

fn decode<T: serde::de::DeserializeOwned>(parameters: &HashMap<String, serde_json::Value>) -> Result<T, AgentError> {
    let object: serde_json::Map<String, serde_json::Value> = parameters.clone().into_iter().collect();
    serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| AgentError::BadParameters(e.to_string()))
}

#[async_trait]
impl Agent for AssetTransferAgent {
    fn name(&self) -> &'static str {
        "AssetTransferAgent"
    }

    async fn dispatch(
        &self,
        session: &ExecutionSession,
        function_name: &str,
        parameters: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentResult, AgentError> {
        match function_name {
            "transfer" => {
                let params: TransferAgentParams = decode(parameters)?;
                self.transfer(session, &params).await
            }
            "batch_transfer" => {
                let params: BatchTransferAgentParams = decode(parameters)?;
                self.batch_transfer(session, &params).await
            }
            other => Err(AgentError::UnknownFunction(other.to_string())),
        }
    }
}

/// A name-keyed mapping from agent-class-name to an `Agent` instance, queried by the
/// orchestrator while resolving an `ExecutionPlan`'s steps.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { agents: HashMap::new() }
    }

    /// A registry pre-populated with the built-in `AssetTransferAgent`.
    pub fn with_builtin_agents() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AssetTransferAgent::new()));
        registry
    }

    /// Registers an agent under its own reported name, replacing any prior
    /// registration under that name.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    /// Looks up an agent by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_support::mock_session_with;
    use chain_types::ErrorCode;

    #[test]
    fn builtin_registry_resolves_the_asset_transfer_agent() {
        let registry = AgentRegistry::with_builtin_agents();
        assert!(registry.get("AssetTransferAgent").is_some());
        assert!(registry.get("NoSuchAgent").is_none());
    }

    #[tokio::test]
    async fn dispatching_an_unknown_function_fails() {
        let session = mock_session_with(|b| b);
        let agent = AssetTransferAgent::new();
        let err = agent.dispatch(&session, "self_destruct", &HashMap::new()).await.expect_err("should fail");
        assert_eq!(err.code(), "BAD_FUNCTION_CALL");
    }

    #[tokio::test]
    async fn dispatching_with_missing_required_parameters_fails() {
        let session = mock_session_with(|b| b);
        let agent = AssetTransferAgent::new();
        let err = agent.dispatch(&session, "transfer", &HashMap::new()).await.expect_err("should fail");
        assert_eq!(err.code(), "BAD_FUNCTION_CALL");
    }
}
