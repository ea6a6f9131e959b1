//! AiResponder -- the contract the chat orchestrator consumes.
//!
//! Given an ordered message history and an optional model identifier, a
//! responder returns generated text or fails. `ProviderResponder` adapts any
//! [`LlmProvider`] to this contract.

use parley_types::chat::{ChatMessage, Role};
use parley_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use super::provider::LlmProvider;

/// History-in, text-out generation contract.
///
/// `Role::User` and `Role::Model` are the two conversational sides; a
/// `Role::System` message is contextual instruction, not a turn to reply to.
/// Implementations fail on provider error instead of returning empty text,
/// and report quota exhaustion as [`LlmError::RateLimited`].
pub trait AiResponder: Send + Sync {
    fn generate_response(
        &self,
        history: &[ChatMessage],
        model: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}

/// [`AiResponder`] backed by an [`LlmProvider`].
pub struct ProviderResponder<P: LlmProvider> {
    provider: P,
    max_tokens: u32,
}

impl<P: LlmProvider> ProviderResponder<P> {
    pub fn new(provider: P, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    /// Access the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build a provider request from session history.
    ///
    /// System messages are folded, in order, into the request's system prompt.
    fn build_request(&self, history: &[ChatMessage], model: Option<&str>) -> CompletionRequest {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut messages = Vec::with_capacity(history.len());

        for msg in history {
            let role = match msg.role {
                Role::System => {
                    system_parts.push(&msg.content);
                    continue;
                }
                Role::User => MessageRole::User,
                Role::Model => MessageRole::Assistant,
            };
            messages.push(Message {
                role,
                content: msg.content.clone(),
            });
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        CompletionRequest {
            model: model.unwrap_or_else(|| self.provider.default_model()).to_string(),
            messages,
            system,
            max_tokens: self.max_tokens,
            temperature: None,
        }
    }
}

impl<P: LlmProvider> AiResponder for ProviderResponder<P> {
    #[tracing::instrument(
        name = "generate_response",
        skip(self, history),
        fields(
            gen_ai.provider.name = %self.provider.name(),
            gen_ai.request.model = model.unwrap_or_default(),
            history_len = history.len(),
        )
    )]
    async fn generate_response(
        &self,
        history: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<String, LlmError> {
        let request = self.build_request(history, model);
        let response = self.provider.complete(&request).await?;

        if response.content.trim().is_empty() {
            return Err(LlmError::Provider {
                message: "empty response".to_string(),
            });
        }

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "Provider response received"
        );

        Ok(response.content)
    }
}
