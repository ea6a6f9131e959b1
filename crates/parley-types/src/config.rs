//! Global configuration types for Parley.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! LLM provider and tunes the chat orchestrator.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderConfig;

/// Top-level configuration.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

/// Orchestrator tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Case-insensitive substrings marking a title as a placeholder that
    /// the first exchange may replace.
    #[serde(default = "default_generic_title_patterns")]
    pub generic_title_patterns: Vec<String>,

    /// Auto-generated titles must be shorter than this many characters.
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,

    /// Render a rate-limited reply as an informational message instead of
    /// failing the send.
    #[serde(default = "default_rate_limit_notice")]
    pub rate_limit_notice: bool,

    /// Text of the informational rate-limit reply.
    #[serde(default = "default_rate_limit_message")]
    pub rate_limit_message: String,

    /// Output token cap for each provider call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_generic_title_patterns() -> Vec<String> {
    vec!["session".to_string(), "new chat".to_string()]
}

fn default_max_title_chars() -> usize {
    50
}

fn default_rate_limit_notice() -> bool {
    true
}

fn default_rate_limit_message() -> String {
    "You exceeded your current quota, please check your plan and billing details.".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            generic_title_patterns: default_generic_title_patterns(),
            max_title_chars: default_max_title_chars(),
            rate_limit_notice: default_rate_limit_notice(),
            rate_limit_message: default_rate_limit_message(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderType;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.provider.name, "gemini");
        assert_eq!(config.chat.max_title_chars, 50);
        assert!(config.chat.rate_limit_notice);
        assert_eq!(
            config.chat.generic_title_patterns,
            vec!["session".to_string(), "new chat".to_string()]
        );
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.chat.max_tokens, 4096);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[provider]
name = "anthropic"
provider_type = "anthropic"
model = "claude-sonnet-4-20250514"
api_key_env = "ANTHROPIC_API_KEY"

[chat]
generic_title_patterns = ["untitled"]
rate_limit_notice = false
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::Anthropic);
        assert_eq!(config.provider.model, "claude-sonnet-4-20250514");
        assert_eq!(config.chat.generic_title_patterns, vec!["untitled".to_string()]);
        assert!(!config.chat.rate_limit_notice);
        // Unset fields keep their defaults
        assert_eq!(config.chat.max_title_chars, 50);
    }
}
