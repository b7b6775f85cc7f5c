//! The `LlmAdapter` contract: a pure `(message, prompt, context) -> text` function.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors obtaining a completion from a language model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    /// The adapter's transport (HTTP, local process) failed.
    #[error("llm transport error: {0}")]
    Transport(String),
    /// The model returned a response this adapter could not interpret.
    #[error("unreadable llm response: {0}")]
    UnreadableResponse(String),
    /// The configured model rejected the request (rate limit, invalid key, ...).
    #[error("llm request rejected: {0}")]
    Rejected(String),
}

impl chain_types::ErrorCode for LlmError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "LLM_TRANSPORT_ERROR",
            Self::UnreadableResponse(_) => "LLM_UNREADABLE_RESPONSE",
            Self::Rejected(_) => "LLM_REQUEST_REJECTED",
        }
    }
}

/// Who produced one turn of a conversation transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user operating the wallet.
    User,
    /// The model itself.
    Assistant,
    /// A system-level instruction, distinct from the adapter's own system prompt.
    System,
}

/// One turn of prior conversation, supplied back to the model for continuity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: String,
    /// Unix timestamp the turn was recorded, in milliseconds.
    pub timestamp: i64,
}

/// The ambient facts a natural-language request is resolved against: the prior
/// conversation, the acting wallet address, and which network it is connected to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmContext {
    /// Prior turns, oldest first.
    pub conversation: Vec<ConversationTurn>,
    /// The connected wallet's address, if known.
    pub wallet_address: Option<String>,
    /// A human-readable name for the connected network, e.g. `"Polkadot Asset Hub"`.
    pub network: Option<String>,
}

/// A language model treated as a pure function from a user message and system prompt
/// to response text. Implementations own the transport (HTTP to a hosted API, a local
/// inference process); this subsystem only depends on the trait and never parses
/// provider-specific response shapes itself.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Resolves `user_message` under `system_prompt` and `context`, returning the raw
    /// response text. Callers that need a structured plan extract it from the text
    /// themselves; this trait makes no assumption about response format.
    async fn complete(
        &self,
        user_message: &str,
        system_prompt: &str,
        context: &LlmContext,
    ) -> Result<String, LlmError>;
}
