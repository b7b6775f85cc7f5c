//! Errors resolving a plan into an execution array.

use chain_types::ErrorCode;

/// Errors raised resolving an `ExecutionPlan`. Per-step agent failures are not
/// represented here — a non-fatal agent failure is recorded as a failed item in the
/// resulting array rather than aborting the whole call; only the conditions below
/// fail the entire plan.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A step named an agent the registry has no entry for.
    #[error("no such agent: {0}")]
    UnknownAgent(String),
}

impl ErrorCode for OrchestratorError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownAgent(_) => "UNKNOWN_AGENT",
        }
    }
}
