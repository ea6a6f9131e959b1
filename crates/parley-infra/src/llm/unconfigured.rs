//! Placeholder provider used when the configured one cannot be built.

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderConfig};

/// Reports the configured provider's name and model but fails every
/// completion with [`LlmError::AuthenticationFailed`].
pub struct UnconfiguredProvider {
    name: String,
    model: String,
}

impl UnconfiguredProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
        }
    }
}

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}
