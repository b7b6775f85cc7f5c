#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Runtime-fork simulator
//!
//! Implements `chain-api`'s `Simulator` seam (spec §4.8): dry-runs a prepared
//! transaction against a forked copy of live chain state before it is ever shown to
//! an approver. Forking and re-dispatching a real Substrate runtime requires a WASM
//! executor wired to the chain's own metadata — a hosting concern this crate does not
//! ship a concrete implementation of, the same way `chain-api::LlmAdapter` ships only
//! its contract and not a transport. [`ForkSimulator`] accepts an optional
//! [`RuntimeForkBackend`]; with none configured it degrades to the fee-query fallback
//! the specification calls for, logging a warning rather than blocking the caller.

use async_trait::async_trait;
use chain_api::{ExecutionSession, ProgressObserver, SimulationOutcome, SimulationPhase, SimulationProgress, Simulator, SimulatorError};
use chain_types::agent::PreparedTransaction;
use chain_types::amount::Amount;
use chain_types::status::ChainEvent;
use std::sync::Arc;

/// The outcome a [`RuntimeForkBackend`] reports after dispatching against its fork.
#[derive(Debug, Clone)]
pub struct ForkOutcome {
    /// Whether the dispatch succeeded against the forked state.
    pub success: bool,
    /// The fee actually charged during the dry-run.
    pub fee: Amount,
    /// The sender's balance delta, formatted as a signed decimal string.
    pub sender_balance_delta: String,
    /// The recipient's balance delta, formatted as a signed decimal string.
    pub recipient_balance_delta: String,
    /// Decoded events emitted by the dry-run dispatch.
    pub events: Vec<ChainEvent>,
    /// A human-readable error, present only when `success` is false.
    pub error: Option<String>,
}

/// Errors a [`RuntimeForkBackend`] can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ForkError {
    /// Forking chain state or instantiating the emulator failed.
    #[error("fork setup failed: {0}")]
    SetupFailed(String),
    /// The emulator ran but the dispatch itself errored unexpectedly (not a normal
    /// "the call failed" outcome, which is reported via `ForkOutcome::success`).
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
}

/// A pluggable WASM runtime-fork backend: forks state reachable from a session,
/// forges the sender's signature check so an unsigned call can be dispatched, and
/// reports the outcome. No concrete implementation ships here.
#[async_trait]
pub trait RuntimeForkBackend: Send + Sync {
    /// Forks state and dispatches `tx` as if signed by `sender`.
    async fn fork_and_dispatch(&self, session: &ExecutionSession, tx: &PreparedTransaction, sender: &str) -> Result<ForkOutcome, ForkError>;
}

fn emit(progress: &Option<ProgressObserver>, phase: SimulationPhase, message: impl Into<String>, percent: Option<u8>) {
    if let Some(callback) = progress {
        callback(&SimulationProgress { phase, message: message.into(), percent });
    }
}

/// The `Simulator` implementation: delegates to a configured [`RuntimeForkBackend`]
/// when present, otherwise degrades to a structural fee query.
#[derive(Default)]
pub struct ForkSimulator {
    backend: Option<Arc<dyn RuntimeForkBackend>>,
}

impl ForkSimulator {
    /// A simulator with no backend configured; every call degrades to a fee query.
    pub fn new() -> Self {
        Self::default()
    }

    /// A simulator backed by a real runtime-fork emulator.
    pub fn with_backend(backend: Arc<dyn RuntimeForkBackend>) -> Self {
        Self { backend: Some(backend) }
    }

    async fn degrade(
        &self,
        session: &ExecutionSession,
        tx: &PreparedTransaction,
        progress: &Option<ProgressObserver>,
    ) -> Result<SimulationOutcome, SimulatorError> {
        tracing::warn!("no runtime-fork backend configured; falling back to a structural fee query");
        emit(progress, SimulationPhase::Forking, "no emulator configured, falling back to a fee query", Some(20));

        let api = session.api().map_err(|e| SimulatorError::Unavailable(e.to_string()))?;

        emit(progress, SimulationPhase::Executing, "querying fee", Some(60));
        let fee = api.query_fee(tx).await.map_err(|e| SimulatorError::Unavailable(e.to_string()))?;

        emit(progress, SimulationPhase::Analyzing, "no dispatch outcome available in degraded mode", Some(90));
        emit(progress, SimulationPhase::Complete, "degraded simulation complete", Some(100));

        Ok(SimulationOutcome {
            success: true,
            estimated_fee: fee,
            sender_balance_delta: "unknown".to_string(),
            recipient_balance_delta: "unknown".to_string(),
            validated: true,
            events: Vec::new(),
            error: None,
        })
    }
}

#[async_trait]
impl Simulator for ForkSimulator {
    async fn simulate(
        &self,
        session: &ExecutionSession,
        tx: &PreparedTransaction,
        sender: &str,
        progress: Option<ProgressObserver>,
    ) -> Result<SimulationOutcome, SimulatorError> {
        emit(&progress, SimulationPhase::Initializing, "starting simulation", Some(0));

        let backend = match &self.backend {
            Some(backend) => backend,
            None => return self.degrade(session, tx, &progress).await,
        };

        emit(&progress, SimulationPhase::Forking, "forking live chain state", Some(20));
        emit(&progress, SimulationPhase::Executing, "dispatching against the fork", Some(50));

        match backend.fork_and_dispatch(session, tx, sender).await {
            Ok(outcome) => {
                emit(&progress, SimulationPhase::Analyzing, "decoding dispatch outcome", Some(80));
                emit(&progress, SimulationPhase::Complete, "simulation complete", Some(100));
                Ok(SimulationOutcome {
                    success: outcome.success,
                    estimated_fee: outcome.fee,
                    sender_balance_delta: outcome.sender_balance_delta,
                    recipient_balance_delta: outcome.recipient_balance_delta,
                    validated: true,
                    events: outcome.events,
                    error: outcome.error,
                })
            }
            Err(e) => {
                emit(&progress, SimulationPhase::Error, e.to_string(), None);
                Err(SimulatorError::Failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::agent::RegistryId;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn sample_tx(registry: &str) -> PreparedTransaction {
        PreparedTransaction {
            registry: RegistryId(registry.to_string()),
            section: "balances".to_string(),
            method: "transfer_allow_death".to_string(),
            call_bytes: b"call".to_vec(),
            summary: "balances.transfer_allow_death".to_string(),
        }
    }

    struct SucceedingBackend;

    #[async_trait]
    impl RuntimeForkBackend for SucceedingBackend {
        async fn fork_and_dispatch(&self, _session: &ExecutionSession, _tx: &PreparedTransaction, _sender: &str) -> Result<ForkOutcome, ForkError> {
            Ok(ForkOutcome {
                success: true,
                fee: Amount::from_u128(150_000_000),
                sender_balance_delta: "-5000150000000".to_string(),
                recipient_balance_delta: "5000000000000".to_string(),
                events: Vec::new(),
                error: None,
            })
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl RuntimeForkBackend for FailingBackend {
        async fn fork_and_dispatch(&self, _session: &ExecutionSession, _tx: &PreparedTransaction, _sender: &str) -> Result<ForkOutcome, ForkError> {
            Err(ForkError::DispatchFailed("insufficient balance".to_string()))
        }
    }

    fn collecting_progress() -> (ProgressObserver, Arc<Mutex<Vec<SimulationPhase>>>) {
        let phases = Arc::new(Mutex::new(Vec::new()));
        let recorder = phases.clone();
        let callback: ProgressObserver = Arc::new(move |event: &SimulationProgress| recorder.lock().push(event.phase));
        (callback, phases)
    }

    #[tokio::test]
    async fn no_backend_degrades_to_a_fee_query() {
        let session = chain_test_support::mock_session();
        let simulator = ForkSimulator::new();
        let (callback, phases) = collecting_progress();

        let outcome = simulator.simulate(&session, &sample_tx("mock-registry"), &chain_test_support::sample_address(1), Some(callback)).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.estimated_fee, Amount::from_u128(200_000_000));
        assert_eq!(
            *phases.lock(),
            vec![
                SimulationPhase::Initializing,
                SimulationPhase::Forking,
                SimulationPhase::Executing,
                SimulationPhase::Analyzing,
                SimulationPhase::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn configured_backend_reports_its_own_outcome() {
        let session = chain_test_support::mock_session();
        let simulator = ForkSimulator::with_backend(Arc::new(SucceedingBackend));

        let outcome = simulator.simulate(&session, &sample_tx("mock-registry"), &chain_test_support::sample_address(1), None).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.estimated_fee, Amount::from_u128(150_000_000));
        assert_eq!(outcome.sender_balance_delta, "-5000150000000");
    }

    #[tokio::test]
    async fn backend_dispatch_failure_surfaces_as_simulation_failed() {
        let session = chain_test_support::mock_session();
        let simulator = ForkSimulator::with_backend(Arc::new(FailingBackend));
        let (callback, phases) = collecting_progress();

        let err = simulator.simulate(&session, &sample_tx("mock-registry"), &chain_test_support::sample_address(1), Some(callback)).await.unwrap_err();

        assert!(matches!(err, SimulatorError::Failed(_)));
        assert!(phases.lock().contains(&SimulationPhase::Error));
    }

    #[tokio::test]
    async fn degraded_mode_fails_gracefully_on_an_inactive_session() {
        let session = chain_test_support::mock_session();
        session.deactivate();
        let simulator = ForkSimulator::new();

        let err = simulator.simulate(&session, &sample_tx("mock-registry"), &chain_test_support::sample_address(1), None).await.unwrap_err();

        assert!(matches!(err, SimulatorError::Unavailable(_)));
    }
}
