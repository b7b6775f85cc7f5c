//! The declarative `ExecutionPlan` wire shape produced by an external LLM adapter.

use crate::agent::ExecutionType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One step of a plan: an agent to invoke, a function on it, and its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// The step's own identifier, unique within its plan.
    pub id: String,
    /// 1-based position within the plan, for display only.
    #[serde(rename = "stepNumber")]
    pub step_number: u32,
    /// The name under which the target agent is registered.
    #[serde(rename = "agentClassName")]
    pub agent_class_name: String,
    /// The operation to call on that agent.
    #[serde(rename = "functionName")]
    pub function_name: String,
    /// The call's parameters, as a string-keyed JSON object.
    pub parameters: HashMap<String, serde_json::Value>,
    /// What kind of work this step performs.
    #[serde(rename = "executionType")]
    pub execution_type: ExecutionType,
    /// A human-readable description shown to the user before approval.
    pub description: String,
    /// Whether this step requires explicit user confirmation before executing.
    #[serde(rename = "requiresConfirmation")]
    pub requires_confirmation: bool,
    /// Earlier step ids this step notionally depends on. Parsed and retained for
    /// forward compatibility; no consumer in this subsystem resolves it (see
    /// Open Questions in the design notes).
    #[serde(rename = "dependsOn", default)]
    pub depends_on: Vec<String>,
    /// Step creation timestamp, milliseconds since epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// A declarative, LLM-proposed sequence of steps, extracted from raw model output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// The plan's own identifier.
    pub id: String,
    /// The user request this plan was derived from, verbatim.
    #[serde(rename = "originalRequest")]
    pub original_request: String,
    /// The ordered steps to resolve, in declaration order.
    pub steps: Vec<ExecutionStep>,
    /// The plan's own status label, as reported by the producer (not driven by this
    /// subsystem's executioner, which tracks per-item status separately).
    pub status: String,
    /// Whether the plan as a whole requires user approval before execution.
    #[serde(rename = "requiresApproval")]
    pub requires_approval: bool,
    /// Plan creation timestamp, milliseconds since epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}
