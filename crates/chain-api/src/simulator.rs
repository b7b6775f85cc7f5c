//! The `Simulator` capability: a host-suppliable dry-run of a prepared transaction
//! against a forked copy of live chain state.

use crate::session::ExecutionSession;
use async_trait::async_trait;
use chain_types::agent::PreparedTransaction;
use chain_types::amount::Amount;
use chain_types::status::ChainEvent;
use std::sync::Arc;

/// Errors running a simulation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimulatorError {
    /// No runtime emulator is available; the caller should fall back to a
    /// structural fee query instead.
    #[error("simulation unavailable: {0}")]
    Unavailable(String),
    /// The emulator ran but the dispatch itself failed for reasons unrelated to the
    /// call's validity (fork setup, state pull, internal panic).
    #[error("simulation failed: {0}")]
    Failed(String),
}

impl chain_types::ErrorCode for SimulatorError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "SIMULATION_UNAVAILABLE",
            Self::Failed(_) => "SIMULATION_FAILED",
        }
    }
}

/// Which stage of a simulation run a [`SimulationProgress`] event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// The emulator is being set up.
    Initializing,
    /// Live chain state is being forked.
    Forking,
    /// The transaction is being applied at the forked head.
    Executing,
    /// The dispatch outcome is being decoded.
    Analyzing,
    /// The run finished successfully.
    Complete,
    /// The run finished with an error.
    Error,
}

/// One progress update emitted while a simulation runs.
#[derive(Debug, Clone)]
pub struct SimulationProgress {
    /// The stage this update reports.
    pub phase: SimulationPhase,
    /// A human-readable status message.
    pub message: String,
    /// An optional completion percentage, when the phase can estimate one.
    pub percent: Option<u8>,
}

/// A callback invoked synchronously for each [`SimulationProgress`] event.
pub type ProgressObserver = Arc<dyn Fn(&SimulationProgress) + Send + Sync>;

/// The result of dry-running a transaction against forked chain state.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Whether the dispatch succeeded against the forked state.
    pub success: bool,
    /// The fee actually charged during the dry-run.
    pub estimated_fee: Amount,
    /// The sender's balance delta observed after dispatch (signed: negative for a
    /// decrease), encoded as a formatted decimal string since `Amount` has no
    /// native signed representation.
    pub sender_balance_delta: String,
    /// The recipient's balance delta observed after dispatch, same encoding.
    pub recipient_balance_delta: String,
    /// Whether the dry-run's structural checks (decoding, dispatch weight) passed,
    /// independent of whether the call itself succeeded.
    pub validated: bool,
    /// Decoded events emitted by the dry-run dispatch.
    pub events: Vec<ChainEvent>,
    /// A human-readable error, present only when `success` is false.
    pub error: Option<String>,
}

/// A host-supplied capability that forks live chain state and dry-runs a prepared
/// transaction against it. Optional: an executioner with no configured simulator
/// simply skips the pre-approval dry-run step.
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Forks state reachable from `session`, applies `tx` as if signed by `sender`,
    /// and reports the outcome. `progress`, if given, is invoked synchronously for
    /// each phase transition in declaration order.
    async fn simulate(
        &self,
        session: &ExecutionSession,
        tx: &PreparedTransaction,
        sender: &str,
        progress: Option<ProgressObserver>,
    ) -> Result<SimulationOutcome, SimulatorError>;
}
