//! Configuration and per-provider presets for OpenAI-compatible providers.

use secrecy::SecretString;

/// Gemini's OpenAI-compatible endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for Gemini when the config names none.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "gemini").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Default model identifier.
    pub model: String,
}

/// OpenAI preset (`https://api.openai.com/v1`).
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}

/// Google Gemini preset (OpenAI-compatible beta endpoint).
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    let model = if model.is_empty() {
        GEMINI_DEFAULT_MODEL
    } else {
        model
    };
    OpenAiCompatConfig {
        provider_name: "gemini".into(),
        base_url: GEMINI_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}
