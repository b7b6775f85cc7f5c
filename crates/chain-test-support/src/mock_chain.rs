//! A configurable fake `ChainApi`, built with a small fluent builder so each test
//! only states the deviations from a fully-featured, well-behaved chain.

use async_trait::async_trait;
use chain_api::{AccountBalance, CallArgs, ChainApi, ChainError, SignedExtrinsic, TxStatus, TxStatusStream};
use chain_types::agent::{PreparedTransaction, RegistryId};
use chain_types::amount::Amount;
use parking_lot::Mutex;
use std::collections::HashSet;

/// What `submit_and_watch` replays for a submitted extrinsic.
#[derive(Clone)]
pub enum TxOutcome {
    /// `InBlock` followed by a successful `Finalized`, the default.
    Finalizes,
    /// `InBlock` followed by a `Finalized` carrying a dispatch error.
    FinalizesWithDispatchError(String),
    /// The node rejects the extrinsic outright.
    Invalid(String),
    /// The stream never yields, for exercising observation timeouts.
    Hangs,
}

/// A fake chain, fully featured by default: both transfer methods, batching, a
/// plausible SS58 prefix/decimals/ED, and an empty sender balance of zero.
pub struct MockChainApi {
    registry: RegistryId,
    calls: HashSet<(&'static str, &'static str)>,
    ss58_prefix: Option<u16>,
    decimals: Option<u32>,
    symbol: Option<String>,
    existential_deposit: Option<Amount>,
    balances: Mutex<std::collections::HashMap<String, AccountBalance>>,
    fee: Amount,
    submitted: Mutex<Vec<SignedExtrinsic>>,
    tx_outcome: TxOutcome,
}

/// Builds a [`MockChainApi`] starting from a fully-featured default.
pub struct MockChainApiBuilder {
    registry: RegistryId,
    calls: HashSet<(&'static str, &'static str)>,
    ss58_prefix: Option<u16>,
    decimals: Option<u32>,
    symbol: Option<String>,
    existential_deposit: Option<Amount>,
    balances: std::collections::HashMap<String, AccountBalance>,
    fee: Amount,
    tx_outcome: TxOutcome,
}

impl Default for MockChainApiBuilder {
    fn default() -> Self {
        let mut calls = HashSet::new();
        calls.insert(("balances", "transfer_allow_death"));
        calls.insert(("balances", "transfer_keep_alive"));
        calls.insert(("utility", "batch"));
        calls.insert(("utility", "batch_all"));
        Self {
            registry: RegistryId("mock-registry".to_string()),
            calls,
            ss58_prefix: Some(0),
            decimals: Some(10),
            symbol: Some("UNIT".to_string()),
            existential_deposit: Some(Amount::from_u128(100_000_000)),
            balances: std::collections::HashMap::new(),
            fee: Amount::from_u128(200_000_000),
            tx_outcome: TxOutcome::Finalizes,
        }
    }
}

impl MockChainApiBuilder {
    /// A fully-featured chain with no deviations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the legacy-only configuration: only `transfer` is exposed.
    pub fn legacy_only(mut self) -> Self {
        self.calls.clear();
        self.calls.insert(("balances", "transfer"));
        self
    }

    /// Removes `utility.batch_all`, leaving only non-atomic `batch`.
    pub fn without_batch_all(mut self) -> Self {
        self.calls.remove(&("utility", "batch_all"));
        self
    }

    /// Removes `balances.transfer_keep_alive`.
    pub fn without_keep_alive(mut self) -> Self {
        self.calls.remove(&("balances", "transfer_keep_alive"));
        self
    }

    /// Simulates a chain that does not advertise an SS58 prefix.
    pub fn without_ss58_prefix(mut self) -> Self {
        self.ss58_prefix = None;
        self
    }

    /// Simulates a chain that does not advertise an existential deposit.
    pub fn without_existential_deposit(mut self) -> Self {
        self.existential_deposit = None;
        self
    }

    /// Sets the registry identity, for cross-registry tests.
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = RegistryId(registry.into());
        self
    }

    /// Seeds one account's free/reserved/frozen balance.
    pub fn with_balance(mut self, address: impl Into<String>, balance: AccountBalance) -> Self {
        self.balances.insert(address.into(), balance);
        self
    }

    /// Sets the flat fee `query_fee` returns for any transaction.
    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    /// Overrides what `submit_and_watch` replays, for tests exercising the
    /// executioner's dispatch-failure, rejection, and timeout handling.
    pub fn with_tx_outcome(mut self, outcome: TxOutcome) -> Self {
        self.tx_outcome = outcome;
        self
    }

    /// Finishes the mock.
    pub fn build(self) -> MockChainApi {
        MockChainApi {
            registry: self.registry,
            calls: self.calls,
            ss58_prefix: self.ss58_prefix,
            decimals: self.decimals,
            symbol: self.symbol,
            existential_deposit: self.existential_deposit,
            balances: Mutex::new(self.balances),
            fee: self.fee,
            submitted: Mutex::new(Vec::new()),
            tx_outcome: self.tx_outcome,
        }
    }
}

impl MockChainApi {
    /// The signed extrinsics submitted so far, in submission order. Used to assert
    /// at-most-once submission.
    pub fn submitted(&self) -> Vec<SignedExtrinsic> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl ChainApi for MockChainApi {
    async fn system_chain(&self) -> Result<String, ChainError> {
        Ok("Mock Network".to_string())
    }

    async fn runtime_spec(&self) -> Result<(String, u32), ChainError> {
        Ok(("mock-spec".to_string(), 1))
    }

    async fn has_call(&self, section: &str, method: &str) -> Result<bool, ChainError> {
        Ok(self.calls.iter().any(|(s, m)| *s == section && *m == method))
    }

    async fn ss58_prefix(&self) -> Result<Option<u16>, ChainError> {
        Ok(self.ss58_prefix)
    }

    async fn token_decimals(&self) -> Result<Option<u32>, ChainError> {
        Ok(self.decimals)
    }

    async fn token_symbol(&self) -> Result<Option<String>, ChainError> {
        Ok(self.symbol.clone())
    }

    async fn existential_deposit(&self) -> Result<Option<Amount>, ChainError> {
        Ok(self.existential_deposit.clone())
    }

    async fn account_balance(&self, address: &str) -> Result<AccountBalance, ChainError> {
        Ok(self
            .balances
            .lock()
            .get(address)
            .cloned()
            .unwrap_or(AccountBalance { free: Amount::zero(), reserved: Amount::zero(), frozen: Amount::zero() }))
    }

    fn construct_call(
        &self,
        section: &str,
        method: &str,
        args: CallArgs,
    ) -> Result<PreparedTransaction, ChainError> {
        if !self.calls.iter().any(|(s, m)| *s == section && *m == method) {
            return Err(ChainError::UnknownCall(section.to_string(), method.to_string()));
        }
        Ok(PreparedTransaction {
            registry: self.registry.clone(),
            section: section.to_string(),
            method: method.to_string(),
            call_bytes: serde_json::to_vec(&args.0).unwrap_or_default(),
            summary: format!("{section}.{method}"),
        })
    }

    async fn query_fee(&self, _tx: &PreparedTransaction) -> Result<Amount, ChainError> {
        Ok(self.fee.clone())
    }

    async fn submit_and_watch(&self, signed: SignedExtrinsic) -> Result<TxStatusStream, ChainError> {
        self.submitted.lock().push(signed.clone());
        match &self.tx_outcome {
            TxOutcome::Finalizes => {
                let events = vec![
                    TxStatus::InBlock { block_hash: "0xblock".to_string(), tx_hash: "0xtx".to_string() },
                    TxStatus::Finalized {
                        block_hash: "0xblock".to_string(),
                        tx_hash: "0xtx".to_string(),
                        dispatch_error: None,
                        events: Vec::new(),
                    },
                ];
                Ok(Box::pin(futures::stream::iter(events)))
            }
            TxOutcome::FinalizesWithDispatchError(message) => {
                let events = vec![
                    TxStatus::InBlock { block_hash: "0xblock".to_string(), tx_hash: "0xtx".to_string() },
                    TxStatus::Finalized {
                        block_hash: "0xblock".to_string(),
                        tx_hash: "0xtx".to_string(),
                        dispatch_error: Some(message.clone()),
                        events: Vec::new(),
                    },
                ];
                Ok(Box::pin(futures::stream::iter(events)))
            }
            TxOutcome::Invalid(reason) => Ok(Box::pin(futures::stream::iter(vec![TxStatus::Invalid(reason.clone())]))),
            TxOutcome::Hangs => Ok(Box::pin(futures::stream::pending())),
        }
    }

    fn registry(&self) -> RegistryId {
        self.registry.clone()
    }
}
