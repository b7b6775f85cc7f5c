//! Drives an `ExecutionArray`'s pending items to a terminal state.

use crate::error::ExecutionError;
use crate::options::ExecutorOptions;
use chain_api::{ApprovalHandler, BatchSigningRequest, ChainApi, Signer, SigningRequest, Simulator, TxStatus};
use chain_array::{ExecutionArray, ExecutionItem, ItemError};
use chain_types::agent::{ExecutionType, PreparedTransaction, RegistryId};
use chain_types::capabilities::ChainCapabilities;
use chain_types::ids::ItemId;
use chain_types::status::{ExecutionResult, ExecutionStatus};
use chain_types::ErrorCode;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// One registered session plus the capability snapshot detected for it, keyed by
/// registry so `execute_item` can find the right one for a queued transaction.
#[derive(Clone)]
pub struct SessionEntry {
    /// The session this entry executes transactions through.
    pub session: chain_api::ExecutionSession,
    /// The capabilities detected for this session, used for batching eligibility.
    pub capabilities: ChainCapabilities,
}

/// Drives one or more `ExecutionArray`s to completion: approval, signing, broadcast,
/// and finality tracking, against whichever sessions it has been given.
pub struct Executioner {
    sessions: HashMap<RegistryId, SessionEntry>,
    signer: Arc<dyn Signer>,
    approval: Arc<dyn ApprovalHandler>,
    simulator: Option<Arc<dyn Simulator>>,
}

impl Executioner {
    /// An executioner with no registered sessions and no simulator.
    pub fn new(signer: Arc<dyn Signer>, approval: Arc<dyn ApprovalHandler>) -> Self {
        Self { sessions: HashMap::new(), signer, approval, simulator: None }
    }

    /// Registers a session (and its detected capabilities) against its own registry.
    /// Replaces any session previously registered for that registry.
    pub fn with_session(mut self, session: chain_api::ExecutionSession, capabilities: ChainCapabilities) -> Self {
        self.sessions.insert(session.registry().clone(), SessionEntry { session, capabilities });
        self
    }

    /// Attaches a simulator used for pre-approval dry-runs when `enable_simulation`.
    pub fn with_simulator(mut self, simulator: Arc<dyn Simulator>) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Marks a non-terminal item cancelled. A best-effort request: if the item is
    /// mid-flight, a concurrent status write racing this one may still win.
    pub fn cancel_item(&self, array: &ExecutionArray, id: &ItemId) -> Result<(), chain_array::ArrayError> {
        if let Some(item) = array.get_item(id) {
            if !item.status.is_terminal() {
                return array.update_status(
                    id,
                    ExecutionStatus::Cancelled,
                    Some(ItemError::new("CANCELLED", "cancelled by external request")),
                    None,
                );
            }
        }
        Ok(())
    }

    /// Runs one pass over `array`'s pending items per the configured `options`,
    /// returning the array's state once the pass completes. Collects every item
    /// currently pending up front; items added mid-pass are left for the next call.
    pub async fn run_pass(&self, array: &ExecutionArray, options: &ExecutorOptions) -> chain_array::ArrayState {
        let ready = array.get_ready_items();

        let batch_suffix = if options.allow_batching { self.compute_batchable_suffix(&ready) } else { Vec::new() };
        let batch_ids: HashSet<ItemId> = batch_suffix.iter().map(|item| item.id.clone()).collect();
        let individual: Vec<ExecutionItem> = ready.into_iter().filter(|item| !batch_ids.contains(&item.id)).collect();

        if options.sequential {
            self.run_sequential(array, &individual, options).await;
        } else {
            self.run_parallel(array, &individual, options).await;
        }

        if !batch_suffix.is_empty() {
            self.run_batch(array, &batch_suffix, options).await;
        }

        array.get_state()
    }

    /// Finds the longest contiguous run of pending transaction items, counted from
    /// the end of `ready`, that all target the same registry, capped at 100. A run
    /// shorter than two items isn't worth batching and is left for individual
    /// processing.
    fn compute_batchable_suffix(&self, ready: &[ExecutionItem]) -> Vec<ExecutionItem> {
        let mut suffix = Vec::new();
        let mut registry: Option<RegistryId> = None;
        for item in ready.iter().rev() {
            if item.agent_result.execution_type != ExecutionType::Transaction {
                break;
            }
            let tx_registry = match &item.agent_result.transaction {
                Some(tx) => tx.registry.clone(),
                None => break,
            };
            match &registry {
                None => registry = Some(tx_registry),
                Some(r) if *r == tx_registry => {}
                Some(_) => break,
            }
            suffix.push(item.clone());
            if suffix.len() == 100 {
                break;
            }
        }
        suffix.reverse();
        if suffix.len() < 2 {
            Vec::new()
        } else {
            suffix
        }
    }

    async fn run_sequential(&self, array: &ExecutionArray, items: &[ExecutionItem], options: &ExecutorOptions) {
        for item in items {
            let current = match array.get_item(&item.id) {
                Some(current) => current,
                None => continue,
            };
            if current.status != ExecutionStatus::Pending {
                continue;
            }
            self.execute_item(array, &current, options).await;
            if !options.continue_on_error {
                if let Some(updated) = array.get_item(&item.id) {
                    if updated.status == ExecutionStatus::Failed {
                        break;
                    }
                }
            }
        }
    }

    async fn run_parallel(&self, array: &ExecutionArray, items: &[ExecutionItem], options: &ExecutorOptions) {
        let (tx_items, other_items): (Vec<_>, Vec<_>) =
            items.iter().cloned().partition(|item| item.agent_result.execution_type == ExecutionType::Transaction);

        let concurrent = other_items.iter().map(|item| self.execute_item(array, item, options));
        futures::future::join_all(concurrent).await;

        self.run_sequential(array, &tx_items, options).await;
    }

    async fn execute_item(&self, array: &ExecutionArray, item: &ExecutionItem, options: &ExecutorOptions) {
        match item.agent_result.execution_type {
            ExecutionType::Transaction => self.execute_transaction_item(array, item, options).await,
            ExecutionType::DataRead | ExecutionType::Validation => {
                let _ = array.update_status(&item.id, ExecutionStatus::Completed, None, None);
            }
            ExecutionType::UserInput => {
                let _ = array.update_status(&item.id, ExecutionStatus::Ready, None, None);
            }
        }
    }

    async fn execute_transaction_item(&self, array: &ExecutionArray, item: &ExecutionItem, options: &ExecutorOptions) {
        let tx = match &item.agent_result.transaction {
            Some(tx) => tx.clone(),
            None => return self.fail(array, &item.id, ExecutionError::NoExtrinsic),
        };
        let entry = match self.sessions.get(&tx.registry) {
            Some(entry) => entry.clone(),
            None => return self.fail(array, &item.id, ExecutionError::CrossRegistry),
        };
        let sender = match &item.agent_result.metadata.sender {
            Some(sender) => sender.clone(),
            None => return self.fail(array, &item.id, ExecutionError::NoExtrinsic),
        };

        if options.enable_simulation {
            if let Some(simulator) = &self.simulator {
                match simulator.simulate(&entry.session, &tx, &sender, None).await {
                    Ok(outcome) if !outcome.success => {
                        let message = outcome.error.unwrap_or_else(|| "simulated dispatch failed".to_string());
                        return self.fail(array, &item.id, ExecutionError::SimulationFailed(message));
                    }
                    Ok(_) => {}
                    Err(chain_api::SimulatorError::Unavailable(_)) => {}
                    Err(chain_api::SimulatorError::Failed(message)) => {
                        return self.fail(array, &item.id, ExecutionError::SimulationFailed(message));
                    }
                }
            }
        }

        if array.update_status(&item.id, ExecutionStatus::Ready, None, None).is_err() {
            return;
        }

        if !options.auto_approve {
            let request = SigningRequest {
                item_id: item.id.as_str().to_string(),
                transaction: tx.clone(),
                description: item.agent_result.description.clone(),
                estimated_fee: item.agent_result.estimated_fee.clone(),
                warnings: item.agent_result.warnings.clone(),
                sender: sender.clone(),
            };
            if !self.approval.request_approval(&request).await {
                let _ = array.update_status(
                    &item.id,
                    ExecutionStatus::Cancelled,
                    Some(ItemError::new(ExecutionError::ApprovalDeclined.code(), ExecutionError::ApprovalDeclined.to_string())),
                    None,
                );
                return;
            }
        }

        if array.update_status(&item.id, ExecutionStatus::Signing, None, None).is_err() {
            return;
        }

        let signing_sender = match chain_types::address::reencode(&sender, entry.capabilities.ss58_prefix) {
            Ok(address) => address,
            Err(e) => return self.fail(array, &item.id, ExecutionError::SigningFailed(e.to_string())),
        };
        let signed = match self.signer.sign(&tx, &signing_sender).await {
            Ok(signed) => signed,
            Err(e) => return self.fail(array, &item.id, ExecutionError::SigningFailed(e.to_string())),
        };

        if array.update_status(&item.id, ExecutionStatus::Broadcasting, None, None).is_err() {
            return;
        }

        let api = match entry.session.api() {
            Ok(api) => api.clone(),
            Err(e) => return self.fail(array, &item.id, ExecutionError::BroadcastFailed(e.to_string())),
        };
        let stream = match api.submit_and_watch(signed).await {
            Ok(stream) => stream,
            Err(e) => return self.fail(array, &item.id, ExecutionError::BroadcastFailed(e.to_string())),
        };

        match observe(array, std::slice::from_ref(&item.id), stream, options.timeout).await {
            Ok(result) => {
                let _ = array.update_status(&item.id, ExecutionStatus::Finalized, None, Some(result));
            }
            Err(e) => self.fail(array, &item.id, e),
        }
    }

    async fn run_batch(&self, array: &ExecutionArray, suffix: &[ExecutionItem], options: &ExecutorOptions) {
        let ids: Vec<ItemId> = suffix.iter().map(|item| item.id.clone()).collect();

        let calls: Vec<PreparedTransaction> = match suffix.iter().map(|item| item.agent_result.transaction.clone()).collect::<Option<Vec<_>>>() {
            Some(calls) => calls,
            None => return self.fail_all(array, &ids, ExecutionError::NoExtrinsic),
        };
        let registry = calls[0].registry.clone();
        let entry = match self.sessions.get(&registry) {
            Some(entry) => entry.clone(),
            None => return self.fail_all(array, &ids, ExecutionError::CrossRegistry),
        };
        let sender = match &suffix[0].agent_result.metadata.sender {
            Some(sender) => sender.clone(),
            None => return self.fail_all(array, &ids, ExecutionError::NoExtrinsic),
        };

        for id in &ids {
            let _ = array.update_status(id, ExecutionStatus::Ready, None, None);
        }

        let built = match chain_builder::wrap_prepared_batch(&entry.session, &calls, &entry.capabilities, true).await {
            Ok(built) => built,
            Err(e) => return self.fail_all(array, &ids, ExecutionError::BatchFailed(e.to_string())),
        };

        if !options.auto_approve {
            let request = BatchSigningRequest {
                item_ids: ids.iter().map(|id| id.as_str().to_string()).collect(),
                transaction: built.transaction.clone(),
                descriptions: suffix.iter().map(|item| item.agent_result.description.clone()).collect(),
                estimated_fee: built.estimated_fee.clone(),
                warnings: built.warnings.clone(),
                sender: sender.clone(),
            };
            if !self.approval.request_batch_approval(&request).await {
                for id in &ids {
                    let _ = array.update_status(
                        id,
                        ExecutionStatus::Cancelled,
                        Some(ItemError::new(ExecutionError::ApprovalDeclined.code(), ExecutionError::ApprovalDeclined.to_string())),
                        None,
                    );
                }
                return;
            }
        }

        for id in &ids {
            let _ = array.update_status(id, ExecutionStatus::Signing, None, None);
        }

        let signing_sender = match chain_types::address::reencode(&sender, entry.capabilities.ss58_prefix) {
            Ok(address) => address,
            Err(e) => return self.fail_all(array, &ids, ExecutionError::SigningFailed(e.to_string())),
        };
        let signed = match self.signer.sign(&built.transaction, &signing_sender).await {
            Ok(signed) => signed,
            Err(e) => return self.fail_all(array, &ids, ExecutionError::SigningFailed(e.to_string())),
        };

        for id in &ids {
            let _ = array.update_status(id, ExecutionStatus::Broadcasting, None, None);
        }

        let api = match entry.session.api() {
            Ok(api) => api.clone(),
            Err(e) => return self.fail_all(array, &ids, ExecutionError::BroadcastFailed(e.to_string())),
        };
        let stream = match api.submit_and_watch(signed).await {
            Ok(stream) => stream,
            Err(e) => return self.fail_all(array, &ids, ExecutionError::BroadcastFailed(e.to_string())),
        };

        // The whole batch shares one dispatch outcome: every item finalizes or fails
        // together, with no individual retry on batch failure.
        match observe(array, &ids, stream, options.timeout).await {
            Ok(result) => {
                for id in &ids {
                    let _ = array.update_status(id, ExecutionStatus::Finalized, None, Some(result.clone()));
                }
            }
            Err(e) => self.fail_all(array, &ids, e),
        }
    }

    fn fail(&self, array: &ExecutionArray, id: &ItemId, err: ExecutionError) {
        let _ = array.update_status(id, ExecutionStatus::Failed, Some(ItemError::new(err.code(), err.to_string())), None);
    }

    fn fail_all(&self, array: &ExecutionArray, ids: &[ItemId], err: ExecutionError) {
        for id in ids {
            self.fail(array, id, err.clone());
        }
    }
}

/// Consumes a submitted extrinsic's status stream, updating `ids` to `in_block` along
/// the way without treating it as terminal, bounded by `timeout` for the whole
/// observation. `ids` holds more than one entry only for a batch, where every bundled
/// item shares the single underlying extrinsic's outcome.
async fn observe(
    array: &ExecutionArray,
    ids: &[ItemId],
    stream: chain_api::TxStatusStream,
    timeout: Duration,
) -> Result<ExecutionResult, ExecutionError> {
    match tokio::time::timeout(timeout, drain(array, ids, stream)).await {
        Ok(result) => result,
        Err(_) => Err(ExecutionError::Timeout),
    }
}

async fn drain(array: &ExecutionArray, ids: &[ItemId], mut stream: chain_api::TxStatusStream) -> Result<ExecutionResult, ExecutionError> {
    while let Some(status) = stream.next().await {
        match status {
            TxStatus::InBlock { .. } => {
                for id in ids {
                    let _ = array.update_status(id, ExecutionStatus::InBlock, None, None);
                }
            }
            TxStatus::Finalized { tx_hash, block_hash, dispatch_error, events } => {
                return match dispatch_error {
                    Some(message) => Err(ExecutionError::DispatchFailed(message)),
                    None => Ok(ExecutionResult::success(tx_hash, Some(block_hash), events)),
                };
            }
            TxStatus::Invalid(reason) => return Err(ExecutionError::Invalid(reason)),
            TxStatus::Dropped(reason) => return Err(ExecutionError::Dropped(reason)),
            TxStatus::Usurped(reason) => return Err(ExecutionError::Usurped(reason)),
        }
    }
    Err(ExecutionError::BroadcastFailed("status stream ended without a terminal status".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_support::{mock_session_with, sample_address, FixedApprovalHandler, RecordingSigner, RefusingSigner, TxOutcome};
    use chain_types::agent::{AgentMetadata, AgentResult};
    use chain_types::amount::Amount;
    use std::time::Duration as StdDuration;

    fn transfer_item(registry: &str, sender: &str, recipient: &str) -> AgentResult {
        AgentResult::transaction(
            format!("Transfer to {recipient}"),
            PreparedTransaction {
                registry: RegistryId(registry.to_string()),
                section: "balances".to_string(),
                method: "transfer_allow_death".to_string(),
                call_bytes: b"call".to_vec(),
                summary: "balances.transfer_allow_death".to_string(),
            },
            Amount::from_u128(200_000_000),
            Vec::new(),
            AgentMetadata { sender: Some(sender.to_string()), ..AgentMetadata::default() },
        )
    }

    fn executioner_with(
        session: chain_api::ExecutionSession,
        caps: ChainCapabilities,
        signer: Arc<dyn Signer>,
        approval: Arc<dyn ApprovalHandler>,
    ) -> Executioner {
        Executioner::new(signer, approval).with_session(session, caps)
    }

    async fn detect_caps(session: &chain_api::ExecutionSession) -> ChainCapabilities {
        chain_capability::detect(session).await.unwrap().0
    }

    #[tokio::test]
    async fn happy_path_transfer_finalizes() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer.clone(), approval.clone());

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Finalized);
        assert_eq!(signer.call_count(), 1);
        assert_eq!(approval.single_request_count(), 1);
    }

    #[tokio::test]
    async fn declined_approval_cancels_without_signing() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(false));
        let executioner = executioner_with(session, caps, signer.clone(), approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Cancelled);
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn signer_refusal_fails_the_item() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RefusingSigner);
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "SIGNING_FAILED");
    }

    #[tokio::test]
    async fn dispatch_failure_marks_the_item_failed() {
        let session = mock_session_with(|b| b.with_tx_outcome(TxOutcome::FinalizesWithDispatchError("Module(0,1)".to_string())));
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "DISPATCH_FAILED");
    }

    #[tokio::test]
    async fn invalid_extrinsic_is_reported_as_invalid() {
        let session = mock_session_with(|b| b.with_tx_outcome(TxOutcome::Invalid("stale nonce".to_string())));
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "INVALID");
    }

    #[tokio::test]
    async fn observation_timeout_fails_with_timeout_code() {
        let session = mock_session_with(|b| b.with_tx_outcome(TxOutcome::Hangs));
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        let options = ExecutorOptions { timeout: StdDuration::from_millis(20), ..ExecutorOptions::default() };
        executioner.run_pass(&array, &options).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "TIMEOUT");
    }

    #[tokio::test]
    async fn at_most_once_submission_even_with_continue_on_error() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer.clone(), approval);

        let options = ExecutorOptions { continue_on_error: true, ..ExecutorOptions::default() };
        executioner.run_pass(&array, &options).await;
        executioner.run_pass(&array, &options).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Finalized);
        assert_eq!(signer.call_count(), 1);
    }

    #[tokio::test]
    async fn atomic_batch_suffix_shares_one_approval_and_signature() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let a = array.add(transfer_item(&registry, &sender, &sample_address(2)));
        let b = array.add(transfer_item(&registry, &sender, &sample_address(3)));
        let c = array.add(transfer_item(&registry, &sender, &sample_address(4)));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer.clone(), approval.clone());

        let options = ExecutorOptions { allow_batching: true, ..ExecutorOptions::default() };
        executioner.run_pass(&array, &options).await;

        for id in [&a, &b, &c] {
            assert_eq!(array.get_item(id).unwrap().status, ExecutionStatus::Finalized);
        }
        assert_eq!(signer.call_count(), 1);
        assert_eq!(approval.batch_request_count(), 1);
        assert_eq!(approval.single_request_count(), 0);
    }

    #[tokio::test]
    async fn batch_dispatch_failure_fails_every_bundled_item() {
        let session = mock_session_with(|b| b.with_tx_outcome(TxOutcome::FinalizesWithDispatchError("Module(0,2)".to_string())));
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let a = array.add(transfer_item(&registry, &sender, &sample_address(2)));
        let b = array.add(transfer_item(&registry, &sender, &sample_address(3)));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        let options = ExecutorOptions { allow_batching: true, ..ExecutorOptions::default() };
        executioner.run_pass(&array, &options).await;

        for id in [&a, &b] {
            let item = array.get_item(id).unwrap();
            assert_eq!(item.status, ExecutionStatus::Failed);
            assert_eq!(item.error.as_ref().unwrap().code, "DISPATCH_FAILED");
        }
    }

    #[tokio::test]
    async fn cross_registry_item_fails_without_touching_the_signer() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);

        let array = ExecutionArray::new();
        let id = array.add(transfer_item("some-other-registry", &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer.clone(), approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "CROSS_REGISTRY");
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn data_read_item_completes_without_touching_chain_state() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;

        let array = ExecutionArray::new();
        let id = array.add(AgentResult::data(ExecutionType::DataRead, "Fetch balance", serde_json::json!({"free": "1.0"})));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer.clone(), approval.clone());

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Completed);
        assert_eq!(signer.call_count(), 0);
        assert_eq!(approval.single_request_count(), 0);
    }

    #[tokio::test]
    async fn user_input_item_is_left_ready_for_an_external_event() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;

        let array = ExecutionArray::new();
        let id = array.add(AgentResult::data(ExecutionType::UserInput, "Confirm recipient", serde_json::json!(null)));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let executioner = executioner_with(session, caps, signer, approval);

        executioner.run_pass(&array, &ExecutorOptions::default()).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Ready);
    }

    struct FailingSimBackend;

    #[async_trait::async_trait]
    impl chain_simulator::RuntimeForkBackend for FailingSimBackend {
        async fn fork_and_dispatch(
            &self,
            _session: &chain_api::ExecutionSession,
            _tx: &PreparedTransaction,
            _sender: &str,
        ) -> Result<chain_simulator::ForkOutcome, chain_simulator::ForkError> {
            Err(chain_simulator::ForkError::DispatchFailed("forked dispatch reverted".to_string()))
        }
    }

    #[tokio::test]
    async fn simulation_failure_fails_the_item_before_it_ever_reaches_signing() {
        let session = mock_session_with(|b| b);
        let caps = detect_caps(&session).await;
        let sender = sample_address(1);
        let recipient = sample_address(2);
        let registry = session.registry().0.clone();

        let array = ExecutionArray::new();
        let id = array.add(transfer_item(&registry, &sender, &recipient));

        let signer = Arc::new(RecordingSigner::new());
        let approval = Arc::new(FixedApprovalHandler::new(true));
        let simulator = Arc::new(chain_simulator::ForkSimulator::with_backend(Arc::new(FailingSimBackend)));
        let executioner = executioner_with(session, caps, signer.clone(), approval.clone())
            .with_simulator(simulator);

        let options = ExecutorOptions { enable_simulation: true, ..ExecutorOptions::default() };
        executioner.run_pass(&array, &options).await;

        let item = array.get_item(&id).unwrap();
        assert_eq!(item.status, ExecutionStatus::Failed);
        assert_eq!(item.error.as_ref().unwrap().code, "SIMULATION_FAILED");
        assert_eq!(signer.call_count(), 0);
        assert_eq!(approval.single_request_count(), 0);
    }
}
