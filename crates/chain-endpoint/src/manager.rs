//! The endpoint manager: ordered endpoint selection, failover, sessions, and the
//! background health monitor.

use crate::connector::{ConnectError, Connector};
use crate::health::{order_candidates, EndpointHealth};
use crate::store::{HealthStore, HealthStoreError, PersistedHealthMap};
use chain_api::{ChainApi, ExecutionSession};
use chain_types::ErrorCode as _;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Errors acquiring a handle or session from the manager.
#[derive(Debug, thiserror::Error)]
pub enum EndpointManagerError {
    /// Every configured endpoint failed, even after the one cooldown reset.
    #[error("no endpoints available")]
    NoEndpoints,
    /// The health store could not be read or written.
    #[error(transparent)]
    Store(#[from] HealthStoreError),
}

impl chain_types::ErrorCode for EndpointManagerError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoEndpoints => "NO_ENDPOINTS",
            Self::Store(e) => e.code(),
        }
    }
}

/// Tunables for one manager instance, matching the configuration surface a host may
/// supply.
#[derive(Debug, Clone)]
pub struct EndpointManagerConfig {
    /// The ordered set of candidate endpoint URLs.
    pub endpoints: Vec<String>,
    /// How long a failed endpoint is excluded from selection.
    pub failover_cooldown: Duration,
    /// The websocket handshake timeout.
    pub connect_timeout: Duration,
    /// The readiness (metadata fetch) timeout after the socket opens.
    pub init_timeout: Duration,
    /// How often the background monitor probes every endpoint.
    pub health_poll_interval: Duration,
    /// Whether the background monitor runs at all.
    pub enable_poll: bool,
    /// The key persisted health is stored and loaded under.
    pub storage_key: String,
    /// Persisted health entries older than this are discarded on load.
    pub health_max_age: Duration,
}

impl Default for EndpointManagerConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            failover_cooldown: Duration::from_millis(300_000),
            connect_timeout: Duration::from_millis(10_000),
            init_timeout: Duration::from_millis(12_000),
            health_poll_interval: Duration::from_millis(600_000),
            enable_poll: true,
            storage_key: "default".to_string(),
            health_max_age: Duration::from_millis(86_400_000),
        }
    }
}

struct State {
    health: HashMap<String, EndpointHealth>,
    cached_handle: Option<(String, Arc<dyn ChainApi>)>,
}

/// Owns the health map and connection cache for one chain role (e.g. relay or asset
/// hub). Cheap to clone; the inner state is shared.
#[derive(Clone)]
pub struct EndpointManager {
    config: EndpointManagerConfig,
    connector: Arc<dyn Connector>,
    store: Arc<dyn HealthStore>,
    state: Arc<Mutex<State>>,
    now_ms: Arc<dyn Fn() -> i64 + Send + Sync>,
}

impl EndpointManager {
    /// Builds a manager, loading any previously persisted health for `config`'s
    /// `storage_key` and discarding entries older than `health_max_age` or no longer
    /// present in `config.endpoints`.
    pub fn new(
        config: EndpointManagerConfig,
        connector: Arc<dyn Connector>,
        store: Arc<dyn HealthStore>,
    ) -> Result<Self, EndpointManagerError> {
        Self::with_clock(config, connector, store, Arc::new(now_ms_wall_clock))
    }

    /// As [`EndpointManager::new`], but with an injectable clock for deterministic
    /// tests.
    pub fn with_clock(
        config: EndpointManagerConfig,
        connector: Arc<dyn Connector>,
        store: Arc<dyn HealthStore>,
        now_ms: Arc<dyn Fn() -> i64 + Send + Sync>,
    ) -> Result<Self, EndpointManagerError> {
        let now = now_ms();
        let mut health = HashMap::new();
        if let Some(persisted) = store.load(&config.storage_key)? {
            let age = now.saturating_sub(persisted.timestamp);
            if age <= config.health_max_age.as_millis() as i64 {
                for entry in persisted.health_map {
                    if config.endpoints.contains(&entry.url) {
                        health.insert(entry.url.clone(), entry);
                    }
                }
            }
        }
        for url in &config.endpoints {
            health.entry(url.clone()).or_insert_with(|| EndpointHealth::new(url.clone(), now));
        }

        Ok(Self {
            config,
            connector,
            store,
            state: Arc::new(Mutex::new(State { health, cached_handle: None })),
            now_ms,
        })
    }

    fn persist(&self, now: i64) -> Result<(), EndpointManagerError> {
        let health_map: Vec<EndpointHealth> = self.state.lock().health.values().cloned().collect();
        self.store
            .save(&self.config.storage_key, &PersistedHealthMap { timestamp: now, health_map })?;
        Ok(())
    }

    /// Returns a cached, still-usable handle if one exists; otherwise connects to the
    /// best-ordered endpoint, retrying the full list once with cooldowns reset before
    /// failing with `NO_ENDPOINTS`.
    pub async fn acquire_read_handle(&self) -> Result<Arc<dyn ChainApi>, EndpointManagerError> {
        if let Some((_, cached)) = self.state.lock().cached_handle.clone() {
            return Ok(cached);
        }
        match self.try_connect_best().await {
            Some(handle) => Ok(handle),
            None => {
                self.reset_cooldowns();
                self.try_connect_best().await.ok_or(EndpointManagerError::NoEndpoints)
            }
        }
    }

    /// Connects to the best-ordered endpoint and wraps it in a fresh, active session.
    /// Unlike [`EndpointManager::acquire_read_handle`], this never reuses a cached
    /// handle: each execution lifecycle gets its own connection.
    pub async fn open_execution_session(&self) -> Result<ExecutionSession, EndpointManagerError> {
        match self.try_connect_best().await {
            Some(handle) => {
                let url = self.state.lock().cached_handle.as_ref().map(|(u, _)| u.clone());
                Ok(ExecutionSession::new(handle, url.unwrap_or_default()))
            }
            None => {
                self.reset_cooldowns();
                let handle = self.try_connect_best().await.ok_or(EndpointManagerError::NoEndpoints)?;
                let url = self.state.lock().cached_handle.as_ref().map(|(u, _)| u.clone());
                Ok(ExecutionSession::new(handle, url.unwrap_or_default()))
            }
        }
    }

    async fn try_connect_best(&self) -> Option<Arc<dyn ChainApi>> {
        let now = (self.now_ms)();
        let ordered: Vec<String> = {
            let state = self.state.lock();
            let entries: Vec<EndpointHealth> = state.health.values().cloned().collect();
            order_candidates(&entries, self.config.failover_cooldown.as_millis() as i64, now)
                .into_iter()
                .map(|e| e.url.clone())
                .collect()
        };

        for url in ordered {
            let start = std::time::Instant::now();
            match self.connector.connect(&url, self.config.connect_timeout, self.config.init_timeout).await {
                Ok(api) => {
                    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                    let now = (self.now_ms)();
                    {
                        let mut state = self.state.lock();
                        if let Some(entry) = state.health.get_mut(&url) {
                            entry.record_success(latency_ms, now);
                        }
                        state.cached_handle = Some((url.clone(), api.clone()));
                    }
                    chain_telemetry::endpoint_metrics().observe_health_check(&url, latency_ms / 1000.0, true);
                    let _ = self.persist(now);
                    return Some(api);
                }
                Err(_err) => {
                    let now = (self.now_ms)();
                    let mut state = self.state.lock();
                    if let Some(entry) = state.health.get_mut(&url) {
                        entry.record_failure(now);
                    }
                    chain_telemetry::endpoint_metrics().observe_health_check(&url, 0.0, false);
                    let _ = self.persist(now);
                }
            }
        }
        None
    }

    fn reset_cooldowns(&self) {
        let mut state = self.state.lock();
        for entry in state.health.values_mut() {
            entry.last_failure = None;
        }
    }

    /// A snapshot of every endpoint's current health.
    pub fn report_health(&self) -> Vec<EndpointHealth> {
        self.state.lock().health.values().cloned().collect()
    }

    /// Drops the cached handle and marks the manager as having no active connection.
    /// Any `ExecutionSession`s previously opened are unaffected here; callers must
    /// deactivate them independently (the manager never reaches into a session it
    /// already handed out).
    pub fn close(&self) {
        self.state.lock().cached_handle = None;
    }

    /// Runs the background health monitor until `shutdown` resolves. The first check
    /// is deferred by one full interval so it never races a just-started process's
    /// first use.
    pub async fn run_health_monitor(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        if !self.config.enable_poll {
            return;
        }
        let mut ticker = tokio::time::interval(self.config.health_poll_interval);
        ticker.tick().await; // deferred first tick
        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_once().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    async fn poll_once(&self) {
        let urls: Vec<String> = self.config.endpoints.clone();
        for url in urls {
            let healthy = self.connector.probe(&url, Duration::from_secs(5)).await;
            let now = (self.now_ms)();
            let mut state = self.state.lock();
            if let Some(entry) = state.health.get_mut(&url) {
                if healthy {
                    entry.record_success(entry.avg_response_time_ms.unwrap_or(0.0), now);
                } else {
                    entry.record_failure(now);
                }
            }
            drop(state);
            let _ = self.persist(now);
        }
        let healthy_count = self.state.lock().health.values().filter(|e| e.healthy).count() as u64;
        chain_telemetry::endpoint_metrics().set_healthy_endpoint_count(healthy_count);
    }
}

fn now_ms_wall_clock() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryHealthStore;
    use async_trait::async_trait;
    use chain_api::{AccountBalance, CallArgs, ChainError, SignedExtrinsic, TxStatusStream};
    use chain_types::agent::{PreparedTransaction, RegistryId};
    use chain_types::amount::Amount;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

    struct StubApi;

    #[async_trait]
    impl ChainApi for StubApi {
        async fn system_chain(&self) -> Result<String, ChainError> {
            Ok("Stub".into())
        }
        async fn runtime_spec(&self) -> Result<(String, u32), ChainError> {
            Ok(("stub".into(), 1))
        }
        async fn has_call(&self, _s: &str, _m: &str) -> Result<bool, ChainError> {
            Ok(true)
        }
        async fn ss58_prefix(&self) -> Result<Option<u16>, ChainError> {
            Ok(Some(0))
        }
        async fn token_decimals(&self) -> Result<Option<u32>, ChainError> {
            Ok(Some(10))
        }
        async fn token_symbol(&self) -> Result<Option<String>, ChainError> {
            Ok(Some("UNIT".into()))
        }
        async fn existential_deposit(&self) -> Result<Option<Amount>, ChainError> {
            Ok(Some(Amount::zero()))
        }
        async fn account_balance(&self, _address: &str) -> Result<AccountBalance, ChainError> {
            Ok(AccountBalance { free: Amount::zero(), reserved: Amount::zero(), frozen: Amount::zero() })
        }
        fn construct_call(
            &self,
            _section: &str,
            _method: &str,
            _args: CallArgs,
        ) -> Result<PreparedTransaction, ChainError> {
            unimplemented!()
        }
        async fn query_fee(&self, _tx: &PreparedTransaction) -> Result<Amount, ChainError> {
            Ok(Amount::zero())
        }
        async fn submit_and_watch(&self, _signed: SignedExtrinsic) -> Result<TxStatusStream, ChainError> {
            unimplemented!()
        }
        fn registry(&self) -> RegistryId {
            RegistryId("stub".into())
        }
    }

    struct FlakyConnector {
        fail_first_n: AtomicU32,
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn connect(
            &self,
            _url: &str,
            _connect_timeout: Duration,
            _init_timeout: Duration,
        ) -> Result<Arc<dyn ChainApi>, ConnectError> {
            if self.fail_first_n.load(Ordering::SeqCst) > 0 {
                self.fail_first_n.fetch_sub(1, Ordering::SeqCst);
                return Err(ConnectError::ConnectTimeout(Duration::from_secs(1)));
            }
            Ok(Arc::new(StubApi))
        }
    }

    fn manager_with(urls: &[&str], fail_first_n: u32) -> EndpointManager {
        let clock = Arc::new(AtomicI64::new(0));
        let clock_clone = clock.clone();
        EndpointManager::with_clock(
            EndpointManagerConfig {
                endpoints: urls.iter().map(|s| s.to_string()).collect(),
                storage_key: "relay".into(),
                ..Default::default()
            },
            Arc::new(FlakyConnector { fail_first_n: AtomicU32::new(fail_first_n) }),
            Arc::new(InMemoryHealthStore::new()),
            Arc::new(move || clock_clone.fetch_add(1, Ordering::SeqCst)),
        )
        .expect("manager")
    }

    #[tokio::test]
    async fn failover_transparently_tries_every_endpoint_in_order() {
        let manager = manager_with(&["a", "b", "c"], 2);
        let handle = manager.acquire_read_handle().await.expect("handle");
        assert_eq!(handle.registry().0, "stub");
        let failures: u64 = manager.report_health().iter().map(|e| e.failure_count).sum();
        assert_eq!(failures, 2);
    }

    #[tokio::test]
    async fn exhausting_every_endpoint_resets_cooldowns_once_then_fails() {
        let manager = manager_with(&["a"], u32::MAX);
        let result = manager.acquire_read_handle().await;
        assert!(matches!(result, Err(EndpointManagerError::NoEndpoints)));
    }

    #[tokio::test]
    async fn a_cached_handle_is_reused_without_reconnecting() {
        let manager = manager_with(&["a"], 0);
        let first = manager.acquire_read_handle().await.expect("first");
        let second = manager.acquire_read_handle().await.expect("second");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
