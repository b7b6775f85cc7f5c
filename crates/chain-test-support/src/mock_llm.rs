//! A scripted `LlmAdapter` for orchestrator tests.

use async_trait::async_trait;
use chain_api::{LlmAdapter, LlmContext, LlmError};
use parking_lot::Mutex;

/// An adapter that returns one fixed response string regardless of input, recording
/// every call it received.
pub struct ScriptedLlmAdapter {
    response: String,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLlmAdapter {
    /// An adapter that always answers with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), calls: Mutex::new(Vec::new()) }
    }

    /// The `user_message` of every call received so far, in order.
    pub fn received_messages(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmAdapter for ScriptedLlmAdapter {
    async fn complete(
        &self,
        user_message: &str,
        _system_prompt: &str,
        _context: &LlmContext,
    ) -> Result<String, LlmError> {
        self.calls.lock().push(user_message.to_string());
        Ok(self.response.clone())
    }
}

/// An adapter that always fails, for transport-error-path tests.
pub struct FailingLlmAdapter;

#[async_trait]
impl LlmAdapter for FailingLlmAdapter {
    async fn complete(&self, _user_message: &str, _system_prompt: &str, _context: &LlmContext) -> Result<String, LlmError> {
        Err(LlmError::Transport("mock transport failure".to_string()))
    }
}
