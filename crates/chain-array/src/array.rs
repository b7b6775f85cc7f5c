//! `ExecutionArray`: the queue of items an executioner drives to a terminal state.

use crate::error::ArrayError;
use chain_types::agent::AgentResult;
use chain_types::ids::ItemId;
use chain_types::status::{ExecutionResult, ExecutionStatus};
use parking_lot::Mutex;
use std::sync::Arc;

/// A machine-readable/human-readable error pair attached to a failed or cancelled
/// item. Distinct from `ExecutionResult`, which additionally carries dispatch events
/// and is only produced once a transaction has actually been observed on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    /// The machine-readable code, matching one of the `ErrorCode` vocabularies.
    pub code: String,
    /// The human-readable message. Never embeds transport details.
    pub message: String,
}

impl ItemError {
    /// Builds an item error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// One queued unit of work: the agent's prepared result plus its execution-lifecycle
/// state.
#[derive(Debug, Clone)]
pub struct ExecutionItem {
    /// This item's stable identifier within its array.
    pub id: ItemId,
    /// What the agent produced: a prepared transaction, a data payload, or a
    /// validation/user-input marker.
    pub agent_result: AgentResult,
    /// The current lifecycle status.
    pub status: ExecutionStatus,
    /// The terminal on-chain outcome, present once observed.
    pub result: Option<ExecutionResult>,
    /// The terminal error, present once failed or cancelled.
    pub error: Option<ItemError>,
}

/// Per-status counts, re-derived from the item list on every mutation so that
/// `total` always equals the item count and each field always equals the number of
/// items currently in that status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayState {
    /// The total number of items, terminal or not.
    pub total: usize,
    /// Items not yet picked up by the executioner.
    pub pending: usize,
    /// Items picked up, awaiting simulation/approval.
    pub ready: usize,
    /// Items whose signer has been invoked.
    pub signing: usize,
    /// Items whose signed extrinsic has been submitted.
    pub broadcasting: usize,
    /// Items included in an unfinalized block.
    pub in_block: usize,
    /// Items finalized with a successful dispatch outcome.
    pub finalized: usize,
    /// Non-transaction items that completed successfully.
    pub completed: usize,
    /// Items terminated with an error.
    pub failed: usize,
    /// Items terminated by rejection or cancellation.
    pub cancelled: usize,
}

impl ArrayState {
    fn recompute(items: &[ExecutionItem]) -> Self {
        let mut state = ArrayState { total: items.len(), ..Default::default() };
        for item in items {
            match item.status {
                ExecutionStatus::Pending => state.pending += 1,
                ExecutionStatus::Ready => state.ready += 1,
                ExecutionStatus::Signing => state.signing += 1,
                ExecutionStatus::Broadcasting => state.broadcasting += 1,
                ExecutionStatus::InBlock => state.in_block += 1,
                ExecutionStatus::Finalized => state.finalized += 1,
                ExecutionStatus::Completed => state.completed += 1,
                ExecutionStatus::Failed => state.failed += 1,
                ExecutionStatus::Cancelled => state.cancelled += 1,
            }
        }
        state
    }
}

/// A callback invoked synchronously, after the mutation that triggered it, with the
/// changed item and the array's freshly recomputed state. Per the cyclic-reference
/// design note, observers do not hold a reference back to the array; `subscribe`
/// hands back only an opaque id used later to `unsubscribe`.
pub type ItemObserver = Arc<dyn Fn(&ExecutionItem, &ArrayState) + Send + Sync>;

/// An opaque handle to a registered observer, returned by `subscribe` and consumed by
/// `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Inner {
    items: Vec<ExecutionItem>,
    state: ArrayState,
    observers: Vec<(SubscriptionId, ItemObserver)>,
    next_item_seq: u64,
    next_observer_seq: u64,
}

/// The in-memory queue an executioner drives to completion. Cheap to clone; the
/// inner state is shared behind a lock, mirroring the endpoint manager's own
/// shared-state-behind-a-mutex shape.
#[derive(Clone)]
pub struct ExecutionArray {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ExecutionArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionArray {
    /// An empty array.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: Vec::new(),
                state: ArrayState::default(),
                observers: Vec::new(),
                next_item_seq: 0,
                next_observer_seq: 0,
            })),
        }
    }

    /// Appends a new item with status `pending`, returning its id. Notifies
    /// observers after the item is in place.
    pub fn add(&self, agent_result: AgentResult) -> ItemId {
        let mut inner = self.inner.lock();
        let id = ItemId::new(format!("item-{}", inner.next_item_seq));
        inner.next_item_seq += 1;
        let item = ExecutionItem { id: id.clone(), agent_result, status: ExecutionStatus::Pending, result: None, error: None };
        inner.items.push(item);
        inner.state = ArrayState::recompute(&inner.items);
        Self::notify(&inner, inner.items.len() - 1);
        id
    }

    /// Transitions `id` to `status`, optionally attaching a terminal error and/or
    /// on-chain result. Notifies observers after the item is updated.
    pub fn update_status(
        &self,
        id: &ItemId,
        status: ExecutionStatus,
        error: Option<ItemError>,
        result: Option<ExecutionResult>,
    ) -> Result<(), ArrayError> {
        let mut inner = self.inner.lock();
        let index = inner
            .items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| ArrayError::UnknownItem(id.clone()))?;
        {
            let item = &mut inner.items[index];
            item.status = status;
            if error.is_some() {
                item.error = error;
            }
            if result.is_some() {
                item.result = result;
            }
        }
        inner.state = ArrayState::recompute(&inner.items);
        Self::notify(&inner, index);
        Ok(())
    }

    fn notify(inner: &Inner, index: usize) {
        let item = &inner.items[index];
        for (_, observer) in &inner.observers {
            observer(item, &inner.state);
        }
    }

    /// Registers an observer, called after every subsequent mutation. Observers
    /// registered earlier are invoked first.
    pub fn subscribe(&self, observer: ItemObserver) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_observer_seq);
        inner.next_observer_seq += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Removes a previously registered observer. A no-op if already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock();
        inner.observers.retain(|(existing, _)| *existing != id);
    }

    /// Items currently in `pending` — those the executioner has not yet picked up.
    /// Named after the spec's own usage ("collect ready items (items in pending)"),
    /// not the `Ready` status.
    pub fn get_ready_items(&self) -> Vec<ExecutionItem> {
        self.inner.lock().items.iter().filter(|item| item.status == ExecutionStatus::Pending).cloned().collect()
    }

    /// A snapshot of every item, in insertion order.
    pub fn items(&self) -> Vec<ExecutionItem> {
        self.inner.lock().items.clone()
    }

    /// Looks up a single item by id.
    pub fn get_item(&self, id: &ItemId) -> Option<ExecutionItem> {
        self.inner.lock().items.iter().find(|item| &item.id == id).cloned()
    }

    /// The current per-status counts.
    pub fn get_state(&self) -> ArrayState {
        self.inner.lock().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::agent::{AgentMetadata, AgentResult, PreparedTransaction, RegistryId};
    use chain_types::amount::Amount;

    fn sample_result() -> AgentResult {
        AgentResult::transaction(
            "transfer 1.0",
            PreparedTransaction {
                registry: RegistryId("r".to_string()),
                section: "balances".to_string(),
                method: "transfer_allow_death".to_string(),
                call_bytes: Vec::new(),
                summary: "balances.transfer_allow_death".to_string(),
            },
            Amount::zero(),
            Vec::new(),
            AgentMetadata::default(),
        )
    }

    #[test]
    fn counter_invariant_holds_across_mutations() {
        let array = ExecutionArray::new();
        let a = array.add(sample_result());
        let b = array.add(sample_result());
        array.update_status(&a, ExecutionStatus::Ready, None, None).unwrap();
        array.update_status(&b, ExecutionStatus::Failed, Some(ItemError::new("X", "boom")), None).unwrap();

        let state = array.get_state();
        assert_eq!(state.total, 2);
        assert_eq!(state.ready, 1);
        assert_eq!(state.failed, 1);
        assert_eq!(state.pending, 0);
    }

    #[test]
    fn get_ready_items_returns_only_pending() {
        let array = ExecutionArray::new();
        let a = array.add(sample_result());
        let _b = array.add(sample_result());
        array.update_status(&a, ExecutionStatus::Ready, None, None).unwrap();

        let ready = array.get_ready_items();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].status, ExecutionStatus::Pending);
    }

    #[test]
    fn observers_fire_after_mutation_in_registration_order() {
        let array = ExecutionArray::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_a = log.clone();
        let log_b = log.clone();
        array.subscribe(Arc::new(move |item, _state| log_a.lock().push(format!("a:{}", item.status))));
        array.subscribe(Arc::new(move |item, _state| log_b.lock().push(format!("b:{}", item.status))));

        let id = array.add(sample_result());
        array.update_status(&id, ExecutionStatus::Ready, None, None).unwrap();

        let entries = log.lock().clone();
        assert_eq!(entries, vec!["a:pending", "b:pending", "a:ready", "b:ready"]);
    }

    #[test]
    fn unsubscribe_stops_further_notifications() {
        let array = ExecutionArray::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let sub = array.subscribe(Arc::new(move |item, _state| log_clone.lock().push(item.status)));

        let id = array.add(sample_result());
        array.unsubscribe(sub);
        array.update_status(&id, ExecutionStatus::Ready, None, None).unwrap();

        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn update_status_on_unknown_item_fails() {
        let array = ExecutionArray::new();
        let err = array.update_status(&ItemId::new("ghost"), ExecutionStatus::Ready, None, None).unwrap_err();
        assert!(matches!(err, ArrayError::UnknownItem(_)));
    }
}
