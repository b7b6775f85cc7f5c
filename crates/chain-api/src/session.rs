//! The immutable `ExecutionSession` wrapping one connected `ChainApi`.

use crate::chain::ChainApi;
use chain_types::agent::RegistryId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors using a session after it has stopped being usable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The session's underlying connection disconnected; it must be discarded.
    #[error("session is no longer active")]
    Inactive,
    /// A transaction built from a different session's registry was submitted through
    /// this one.
    #[error("transaction registry {tx_registry:?} does not match session registry {session_registry:?}")]
    CrossRegistry {
        /// The registry the transaction was built against.
        tx_registry: RegistryId,
        /// This session's own registry.
        session_registry: RegistryId,
    },
}

impl chain_types::ErrorCode for SessionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Inactive => "SESSION_INACTIVE",
            Self::CrossRegistry { .. } => "CROSS_REGISTRY",
        }
    }
}

/// An immutable handle bound to exactly one endpoint and one metadata registry.
///
/// After construction, the API handle, endpoint URL, and registry are fixed for the
/// session's lifetime; only the active flag may change, and only from `true` to
/// `false`. The endpoint manager never swaps endpoints inside an open session — on
/// disconnect the session simply goes inactive and a new one must be opened.
#[derive(Clone)]
pub struct ExecutionSession {
    api: Arc<dyn ChainApi>,
    endpoint: String,
    registry: RegistryId,
    active: Arc<AtomicBool>,
}

impl ExecutionSession {
    /// Wraps a freshly connected API handle as an active session bound to `endpoint`.
    pub fn new(api: Arc<dyn ChainApi>, endpoint: impl Into<String>) -> Self {
        let registry = api.registry();
        Self {
            api,
            endpoint: endpoint.into(),
            registry,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The session's low-level chain API, if still active.
    pub fn api(&self) -> Result<&Arc<dyn ChainApi>, SessionError> {
        if self.is_active() {
            Ok(&self.api)
        } else {
            Err(SessionError::Inactive)
        }
    }

    /// The endpoint URL this session is bound to. Immutable for the session's life.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// This session's metadata registry identity. Immutable for the session's life.
    pub fn registry(&self) -> &RegistryId {
        &self.registry
    }

    /// Whether the session is still usable.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Marks the session inactive. Idempotent; only transitions `true -> false`.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Asserts that `registry` (typically a `PreparedTransaction`'s) matches this
    /// session's own, failing with `CROSS_REGISTRY` otherwise.
    pub fn assert_registry(&self, registry: &RegistryId) -> Result<(), SessionError> {
        if &self.registry == registry {
            Ok(())
        } else {
            Err(SessionError::CrossRegistry {
                tx_registry: registry.clone(),
                session_registry: self.registry.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AccountBalance, CallArgs, ChainError, SignedExtrinsic, TxStatusStream};
    use async_trait::async_trait;
    use chain_types::agent::PreparedTransaction;
    use chain_types::amount::Amount;

    struct StubApi(RegistryId);

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
            Ok(AccountBalance {
                free: Amount::zero(),
                reserved: Amount::zero(),
                frozen: Amount::zero(),
            })
        }
        fn construct_call(
            &self,
            _section: &str,
            _method: &str,
            _args: CallArgs,
        ) -> Result<PreparedTransaction, ChainError> {
            unimplemented!("not exercised by this test")
        }
        async fn query_fee(&self, _tx: &PreparedTransaction) -> Result<Amount, ChainError> {
            Ok(Amount::zero())
        }
        async fn submit_and_watch(&self, _signed: SignedExtrinsic) -> Result<TxStatusStream, ChainError> {
            unimplemented!("not exercised by this test")
        }
        fn registry(&self) -> RegistryId {
            self.0.clone()
        }
    }

    #[test]
    fn deactivate_only_ever_moves_true_to_false() {
        let session = ExecutionSession::new(Arc::new(StubApi(RegistryId("r1".into()))), "ws://a");
        assert!(session.is_active());
        session.deactivate();
        assert!(!session.is_active());
        session.deactivate();
        assert!(!session.is_active());
    }

    #[test]
    fn endpoint_and_registry_are_stable_across_accesses() {
        let session = ExecutionSession::new(Arc::new(StubApi(RegistryId("r1".into()))), "ws://a");
        let e1 = session.endpoint().to_string();
        let r1 = session.registry().clone();
        let e2 = session.endpoint().to_string();
        let r2 = session.registry().clone();
        assert_eq!(e1, e2);
        assert_eq!(r1, r2);
    }

    #[test]
    fn cross_registry_submission_is_rejected() {
        let session = ExecutionSession::new(Arc::new(StubApi(RegistryId("r1".into()))), "ws://a");
        let other = RegistryId("r2".into());
        assert!(matches!(
            session.assert_registry(&other),
            Err(SessionError::CrossRegistry { .. })
        ));
        assert!(session.assert_registry(&RegistryId("r1".into())).is_ok());
    }

    #[test]
    fn api_access_fails_once_inactive() {
        let session = ExecutionSession::new(Arc::new(StubApi(RegistryId("r1".into()))), "ws://a");
        session.deactivate();
        assert!(matches!(session.api(), Err(SessionError::Inactive)));
    }
}
