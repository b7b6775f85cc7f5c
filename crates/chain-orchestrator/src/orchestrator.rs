//! Resolving an `ExecutionPlan` into an `ExecutionArray`.

use crate::error::OrchestratorError;
use crate::sessions::{step_chain_role, SessionSet};
use chain_agents::AgentRegistry;
use chain_array::{ExecutionArray, ItemError};
use chain_types::agent::AgentResult;
use chain_types::plan::{ExecutionPlan, ExecutionStep};
use chain_types::status::ExecutionStatus;
use chain_types::ErrorCode;

/// Options governing how a plan tolerates per-step failures. Distinct from the
/// executioner's own options (§4.7); this only governs whether *building* items
/// stops at the first failure.
#[derive(Debug, Clone, Copy)]
pub struct OrchestrateOptions {
    /// If true, a step that fails with a non-fatal agent error is recorded as a
    /// failed item and resolution continues with the next step. If false (the
    /// default), resolution stops at the first such failure and every remaining
    /// step is recorded as a cancelled item.
    pub best_effort: bool,
}

impl Default for OrchestrateOptions {
    fn default() -> Self {
        Self { best_effort: false }
    }
}

fn placeholder_result(step: &ExecutionStep) -> AgentResult {
    AgentResult::data(step.execution_type, step.description.clone(), serde_json::Value::Null)
}

/// Resolves a plan's steps in declaration order against an agent registry, building
/// an `ExecutionArray`. Never signs or broadcasts anything; an item's status never
/// advances past `pending` (on success) or `failed`/`cancelled` here.
pub struct Orchestrator {
    registry: AgentRegistry,
}

impl Orchestrator {
    /// Builds an orchestrator over the given registry.
    pub fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }

    /// Resolves `plan` into a freshly built `ExecutionArray`.
    ///
    /// An unknown agent name aborts the entire call with `Err` before any item is
    /// added. Any other per-step failure is recorded as a failed item in the
    /// returned array; whether resolution then continues or cancels the remaining
    /// steps is governed by `options.best_effort`.
    pub async fn orchestrate(
        &self,
        plan: &ExecutionPlan,
        sessions: &SessionSet,
        options: OrchestrateOptions,
    ) -> Result<ExecutionArray, OrchestratorError> {
        let array = ExecutionArray::new();
        let mut aborted = false;

        for step in &plan.steps {
            if aborted {
                let id = array.add(placeholder_result(step));
                let _ = array.update_status(
                    &id,
                    ExecutionStatus::Cancelled,
                    Some(ItemError::new("ABORTED", "plan aborted before this step ran")),
                    None,
                );
                continue;
            }

            let agent = self
                .registry
                .get(&step.agent_class_name)
                .ok_or_else(|| OrchestratorError::UnknownAgent(step.agent_class_name.clone()))?;

            let role = step_chain_role(&step.parameters);
            let session = sessions.get(role);

            match agent.dispatch(session, &step.function_name, &step.parameters).await {
                Ok(result) => {
                    array.add(result);
                }
                Err(err) => {
                    tracing::warn!(step = %step.id, code = err.code(), "step failed during orchestration");
                    let id = array.add(placeholder_result(step));
                    let _ = array.update_status(
                        &id,
                        ExecutionStatus::Failed,
                        Some(ItemError::new(err.code(), err.to_string())),
                        None,
                    );
                    if !options.best_effort {
                        aborted = true;
                    }
                }
            }
        }

        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_support::{mock_session, sample_address};
    use chain_types::agent::ExecutionType;
    use chain_types::plan::ExecutionPlan;
    use std::collections::HashMap;

    fn step(id: &str, agent_class_name: &str, function_name: &str, parameters: HashMap<String, serde_json::Value>) -> ExecutionStep {
        ExecutionStep {
            id: id.to_string(),
            step_number: 1,
            agent_class_name: agent_class_name.to_string(),
            function_name: function_name.to_string(),
            parameters,
            execution_type: ExecutionType::Transaction,
            description: "a step".to_string(),
            requires_confirmation: false,
            depends_on: Vec::new(),
            created_at: 0,
        }
    }

    fn plan(steps: Vec<ExecutionStep>) -> ExecutionPlan {
        ExecutionPlan {
            id: "p1".to_string(),
            original_request: "send some tokens".to_string(),
            steps,
            status: "pending".to_string(),
            requires_approval: true,
            created_at: 0,
        }
    }

    fn transfer_params(address: &str, recipient: &str, amount: &str) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("address".to_string(), serde_json::Value::String(address.to_string()));
        map.insert("recipient".to_string(), serde_json::Value::String(recipient.to_string()));
        map.insert("amount".to_string(), serde_json::Value::String(amount.to_string()));
        map.insert("validate_balance".to_string(), serde_json::Value::Bool(false));
        map
    }

    fn sessions() -> SessionSet {
        SessionSet::new(mock_session(), mock_session())
    }

    #[tokio::test]
    async fn unknown_agent_aborts_the_whole_plan() {
        let orchestrator = Orchestrator::new(AgentRegistry::with_builtin_agents());
        let steps = vec![step("s1", "NoSuchAgent", "transfer", HashMap::new())];
        let err = orchestrator.orchestrate(&plan(steps), &sessions(), OrchestrateOptions::default()).await.expect_err("should fail");
        assert!(matches!(err, OrchestratorError::UnknownAgent(name) if name == "NoSuchAgent"));
    }

    #[tokio::test]
    async fn unknown_function_name_is_recorded_as_a_failed_item() {
        let orchestrator = Orchestrator::new(AgentRegistry::with_builtin_agents());
        let steps = vec![step("s1", "AssetTransferAgent", "nonexistent", HashMap::new())];
        let array = orchestrator.orchestrate(&plan(steps), &sessions(), OrchestrateOptions::default()).await.expect("should not abort the call");
        let state = array.get_state();
        assert_eq!(state.total, 1);
        assert_eq!(state.failed, 1);
    }

    #[tokio::test]
    async fn non_best_effort_cancels_remaining_steps_after_a_failure() {
        let orchestrator = Orchestrator::new(AgentRegistry::with_builtin_agents());
        let steps = vec![
            step("s1", "AssetTransferAgent", "nonexistent", HashMap::new()),
            step("s2", "AssetTransferAgent", "transfer", transfer_params(&sample_address(1), &sample_address(2), "1.0")),
        ];
        let array = orchestrator.orchestrate(&plan(steps), &sessions(), OrchestrateOptions { best_effort: false }).await.expect("should not abort the call");
        let state = array.get_state();
        assert_eq!(state.total, 2);
        assert_eq!(state.failed, 1);
        assert_eq!(state.cancelled, 1);
    }

    #[tokio::test]
    async fn best_effort_continues_past_a_failure() {
        let orchestrator = Orchestrator::new(AgentRegistry::with_builtin_agents());
        let steps = vec![
            step("s1", "AssetTransferAgent", "nonexistent", HashMap::new()),
            step("s2", "AssetTransferAgent", "transfer", transfer_params(&sample_address(1), &sample_address(2), "1.0")),
        ];
        let array = orchestrator.orchestrate(&plan(steps), &sessions(), OrchestrateOptions { best_effort: true }).await.expect("should not abort the call");
        let state = array.get_state();
        assert_eq!(state.total, 2);
        assert_eq!(state.failed, 1);
        assert_eq!(state.pending, 1);
    }

    #[tokio::test]
    async fn a_successful_step_adds_a_pending_item() {
        let orchestrator = Orchestrator::new(AgentRegistry::with_builtin_agents());
        let steps = vec![step(
            "s1",
            "AssetTransferAgent",
            "transfer",
            transfer_params(&sample_address(1), &sample_address(2), "1.0"),
        )];
        let array = orchestrator.orchestrate(&plan(steps), &sessions(), OrchestrateOptions::default()).await.expect("should succeed");
        let state = array.get_state();
        assert_eq!(state.total, 1);
        assert_eq!(state.pending, 1);
    }
}
