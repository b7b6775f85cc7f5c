//! Builds an active `ExecutionSession` over a [`MockChainApi`] in one call.

use crate::mock_chain::{MockChainApi, MockChainApiBuilder};
use chain_api::ExecutionSession;
use std::sync::Arc;

/// Builds a session over a mock chain customized by `configure`.
pub fn mock_session_with(configure: impl FnOnce(MockChainApiBuilder) -> MockChainApiBuilder) -> ExecutionSession {
    let api = configure(MockChainApiBuilder::new()).build();
    ExecutionSession::new(Arc::new(api), "wss://mock")
}

/// A fully-featured session with no deviations, for tests that don't care about the
/// chain's exact shape.
pub fn mock_session() -> ExecutionSession {
    mock_session_with(|b| b)
}
