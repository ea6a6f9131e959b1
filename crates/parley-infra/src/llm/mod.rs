//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `parley-core`, a provider factory ([`create_provider`]) that builds the
//! configured provider, and a connection check ([`test_provider_connection`]).
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod openai_compat;
pub mod unconfigured;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::responder::ProviderResponder;
use parley_types::config::GlobalConfig;
use parley_types::llm::{
    CompletionRequest, LlmError, Message, MessageRole, ProviderConfig, ProviderType,
};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;
use self::unconfigured::UnconfiguredProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// # Errors
///
/// [`LlmError::AuthenticationFailed`] when no API key is available.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;

    match config.provider_type {
        ProviderType::Anthropic => {
            let mut provider = AnthropicProvider::new(key, config.model.clone())?;
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url);
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            let provider = match config.base_url.as_deref() {
                Some(base_url) => OpenAiCompatibleProvider::new(OpenAiCompatConfig {
                    provider_name: config.name.clone(),
                    base_url: base_url.to_string(),
                    api_key: key,
                    model: config.model.clone(),
                }),
                None => match config.name.as_str() {
                    "openai" => OpenAiCompatibleProvider::openai(key, &config.model),
                    // Gemini is the default backend.
                    _ => OpenAiCompatibleProvider::gemini(key, &config.model),
                },
            };
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

/// Build the AI responder described by `config`, reading the API key from
/// the environment.
///
/// A provider that cannot be built (typically a missing key) is replaced by
/// an [`UnconfiguredProvider`], so session management keeps working and only
/// sends fail.
pub fn responder_from_config(config: &GlobalConfig) -> ProviderResponder<BoxLlmProvider> {
    let api_key = crate::secret::resolve_api_key(&config.provider);
    let provider = match create_provider(&config.provider, api_key) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(
                provider = %config.provider.name,
                env = config.provider.api_key_env.as_deref().unwrap_or("<unset>"),
                error = %e,
                "LLM provider unavailable; messages cannot be sent"
            );
            BoxLlmProvider::new(UnconfiguredProvider::new(&config.provider))
        }
    };
    ProviderResponder::new(provider, config.chat.max_tokens)
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Sends a tiny "ping" message with a minimal token budget to the
/// provider's default model.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: provider.default_model().to_string(),
        messages: vec![Message {
            role: MessageRole::User,
            content: "ping".to_string(),
        }],
        system: None,
        max_tokens: 16,
        temperature: Some(0.0),
    };
    provider.complete(&request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, provider_type: ProviderType, model: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            provider_type,
            base_url: None,
            model: model.to_string(),
            api_key_env: None,
        }
    }

    fn key() -> Option<SecretString> {
        Some(SecretString::from("sk-test-key"))
    }

    #[test]
    fn test_create_provider_anthropic() {
        let cfg = config("anthropic", ProviderType::Anthropic, "claude-sonnet-4-20250514");
        let provider = create_provider(&cfg, key()).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.default_model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_create_provider_default_is_gemini() {
        let provider = create_provider(&ProviderConfig::default(), key()).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.default_model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_create_provider_openai_by_name() {
        let cfg = config("openai", ProviderType::OpenAiCompatible, "gpt-4o");
        let provider = create_provider(&cfg, key()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_custom_base_url() {
        let mut cfg = config("local-llm", ProviderType::OpenAiCompatible, "llama3");
        cfg.base_url = Some("http://localhost:11434/v1".to_string());
        let provider = create_provider(&cfg, key()).unwrap();
        assert_eq!(provider.name(), "local-llm");
        assert_eq!(provider.default_model(), "llama3");
    }

    #[test]
    fn test_create_provider_missing_key() {
        let result = create_provider(&ProviderConfig::default(), None);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_responder_from_config_without_key_fails_sends() {
        use parley_core::llm::responder::AiResponder;
        use parley_types::chat::{ChatMessage, Role};

        let mut cfg = GlobalConfig::default();
        cfg.provider.api_key_env = None;
        let responder = responder_from_config(&cfg);
        assert_eq!(responder.provider().name(), "gemini");

        let history = vec![ChatMessage::new(Role::User, "Hi")];
        let err = responder.generate_response(&history, None).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }
}
