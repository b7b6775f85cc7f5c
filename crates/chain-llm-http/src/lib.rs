#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # HTTP `LlmAdapter`
//!
//! A generic adapter for OpenAI-compatible chat completion APIs, letting the
//! orchestrator drive an external model (a hosted GPT/Claude proxy, vLLM, Ollama)
//! without this workspace ever depending on a provider-specific SDK. `chain-api`
//! fixes the `LlmAdapter` contract; this crate is one transport that satisfies it.

use async_trait::async_trait;
use chain_api::{ConversationTurn, LlmAdapter, LlmContext, LlmError, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An `LlmAdapter` backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpLlmAdapter {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl HttpLlmAdapter {
    /// Builds an adapter targeting `api_url` (e.g.
    /// `https://api.openai.com/v1/chat/completions`), authenticating with `api_key` as
    /// a bearer token, and requesting completions from `model`.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.2,
        }
    }

    /// Overrides the sampling temperature (default `0.2`, favoring deterministic plans
    /// over creative ones).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

fn build_system_message(system_prompt: &str, context: &LlmContext) -> String {
    let mut message = system_prompt.to_string();
    if let Some(network) = &context.network {
        message.push_str(&format!("\n\nConnected network: {network}."));
    }
    if let Some(wallet) = &context.wallet_address {
        message.push_str(&format!("\nActing wallet address: {wallet}."));
    }
    message
}

fn build_messages(user_message: &str, system_prompt: &str, context: &LlmContext) -> Vec<Message> {
    let mut messages = vec![Message { role: "system".to_string(), content: build_system_message(system_prompt, context) }];
    messages.extend(context.conversation.iter().map(|turn: &ConversationTurn| Message {
        role: role_name(turn.role).to_string(),
        content: turn.content.clone(),
    }));
    messages.push(Message { role: "user".to_string(), content: user_message.to_string() });
    messages
}

#[async_trait]
impl LlmAdapter for HttpLlmAdapter {
    async fn complete(&self, user_message: &str, system_prompt: &str, context: &LlmContext) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(user_message, system_prompt, context),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(LlmError::Rejected(text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(LlmError::Transport(format!("{status}: {text}")));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| LlmError::UnreadableResponse(e.to_string()))?;

        let choice = body.choices.into_iter().next().ok_or_else(|| LlmError::UnreadableResponse("no choices returned".to_string()))?;

        choice.message.content.ok_or_else(|| LlmError::UnreadableResponse("response had no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_api::ConversationTurn;

    #[test]
    fn system_message_carries_the_connected_network_and_wallet() {
        let context = LlmContext {
            conversation: Vec::new(),
            wallet_address: Some("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string()),
            network: Some("Polkadot Asset Hub".to_string()),
        };

        let system = build_system_message("You translate requests into transfers.", &context);

        assert!(system.contains("Polkadot Asset Hub"));
        assert!(system.contains("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"));
    }

    #[test]
    fn prior_turns_are_carried_in_order_ahead_of_the_new_message() {
        let context = LlmContext {
            conversation: vec![
                ConversationTurn { role: Role::User, content: "send 5 DOT to Alice".to_string(), timestamp: 0 },
                ConversationTurn { role: Role::Assistant, content: "confirming the transfer".to_string(), timestamp: 1 },
            ],
            wallet_address: None,
            network: None,
        };

        let messages = build_messages("actually make it 10 DOT", "system prompt", &context);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "actually make it 10 DOT");
    }
}
