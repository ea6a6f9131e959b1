//! Session title generation via the AI responder.
//!
//! A session created under a placeholder title ("New Chat", "Session 3")
//! is retitled from its first exchange. The call is best-effort: the
//! orchestrator logs and drops any error this module returns.

use parley_types::chat::{ChatMessage, Role, Session};
use parley_types::config::ChatConfig;
use parley_types::llm::LlmError;

use crate::llm::responder::AiResponder;

/// Instruction appended (never persisted) to the history for the title call.
pub const TITLE_PROMPT: &str = "Summarize our conversation above in 3-5 words for a chat title. Return ONLY the summary text, no quotes or punctuation.";

/// Number of messages a session holds right after its first exchange.
const FIRST_EXCHANGE_LEN: usize = 2;

/// Decides when a session gets an auto-generated title and which titles
/// are acceptable.
#[derive(Debug, Clone)]
pub struct TitlePolicy {
    /// Lowercased placeholder substrings.
    generic_patterns: Vec<String>,
    max_chars: usize,
}

impl TitlePolicy {
    pub fn new(generic_patterns: &[String], max_chars: usize) -> Self {
        Self {
            generic_patterns: generic_patterns.iter().map(|p| p.to_lowercase()).collect(),
            max_chars,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(&config.generic_title_patterns, config.max_title_chars)
    }

    /// Whether `title` is a placeholder (case-insensitive substring match).
    pub fn is_generic(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.generic_patterns.iter().any(|p| lower.contains(p.as_str()))
    }

    /// True exactly when the session has just completed its first exchange
    /// and still carries a placeholder title.
    pub fn should_generate(&self, session: &Session) -> bool {
        session.messages.len() == FIRST_EXCHANGE_LEN && self.is_generic(&session.title)
    }

    /// Clean a raw model reply into a title, or reject it.
    ///
    /// Trims whitespace and surrounding quotes; rejects empty results and
    /// anything `max_chars` characters or longer.
    pub fn accept(&self, raw: &str) -> Option<String> {
        let title = raw
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .trim();

        if title.is_empty() || title.chars().count() >= self.max_chars {
            return None;
        }
        Some(title.to_string())
    }
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Ask the responder for a short title summarizing `history`.
///
/// Returns `Ok(None)` when the responder answered but the answer is not a
/// usable title.
#[tracing::instrument(
    name = "generate_title",
    skip(responder, history, policy),
    fields(gen_ai.operation.name = "generate_title", history_len = history.len())
)]
pub async fn generate_title<A: AiResponder>(
    responder: &A,
    history: &[ChatMessage],
    model: Option<&str>,
    policy: &TitlePolicy,
) -> Result<Option<String>, LlmError> {
    let mut prompt = history.to_vec();
    prompt.push(ChatMessage::new(Role::User, TITLE_PROMPT));

    let raw = responder.generate_response(&prompt, model).await?;
    Ok(policy.accept(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TitlePolicy {
        TitlePolicy::default()
    }

    #[test]
    fn test_generic_titles() {
        let p = policy();
        assert!(p.is_generic("New Chat"));
        assert!(p.is_generic("new chat 2"));
        assert!(p.is_generic("Session 14"));
        assert!(p.is_generic("MY SESSION"));
        assert!(!p.is_generic("Project X"));
        assert!(!p.is_generic(""));
    }

    #[test]
    fn test_custom_patterns_are_case_insensitive() {
        let p = TitlePolicy::new(&["Untitled".to_string()], 50);
        assert!(p.is_generic("untitled conversation"));
        assert!(!p.is_generic("New Chat"));
    }

    #[test]
    fn test_should_generate_only_after_first_exchange() {
        let p = policy();
        let mut session = Session::new("New Chat");
        assert!(!p.should_generate(&session));

        session.push_message(ChatMessage::new(Role::User, "Hi"));
        assert!(!p.should_generate(&session));

        session.push_message(ChatMessage::new(Role::Model, "Hello"));
        assert!(p.should_generate(&session));

        session.push_message(ChatMessage::new(Role::User, "More"));
        session.push_message(ChatMessage::new(Role::Model, "Sure"));
        assert!(!p.should_generate(&session));
    }

    #[test]
    fn test_should_generate_requires_generic_title() {
        let p = policy();
        let mut session = Session::new("Project X");
        session.push_message(ChatMessage::new(Role::User, "Hi"));
        session.push_message(ChatMessage::new(Role::Model, "Hello"));
        assert!(!p.should_generate(&session));
    }

    #[test]
    fn test_accept_trims_whitespace_and_quotes() {
        let p = policy();
        assert_eq!(
            p.accept("  \"Friendly Greeting\"  ").as_deref(),
            Some("Friendly Greeting")
        );
        assert_eq!(p.accept("'Planning a Trip'").as_deref(), Some("Planning a Trip"));
    }

    #[test]
    fn test_accept_rejects_empty_and_long() {
        let p = policy();
        assert!(p.accept("   ").is_none());
        assert!(p.accept("\"\"").is_none());
        let long = "word ".repeat(12);
        assert!(p.accept(&long).is_none());
        assert!(p.accept(&"x".repeat(50)).is_none());
        assert!(p.accept(&"x".repeat(49)).is_some());
    }

    #[test]
    fn test_title_prompt_constraints() {
        assert!(TITLE_PROMPT.contains("3-5 words"));
        assert!(TITLE_PROMPT.contains("ONLY"));
    }
}
