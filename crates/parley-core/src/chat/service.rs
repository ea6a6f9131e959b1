//! Chat service orchestrating session lifecycle around the AI call.
//!
//! ChatService coordinates between the SessionRepository and the
//! AiResponder: creating, listing, renaming and deleting sessions, and
//! sending a user turn through the provider with a two-phase persist
//! (user turn first, reply second).

use parley_types::chat::{ChatMessage, Role, Session};
use parley_types::config::ChatConfig;
use parley_types::error::ChatError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::lock::SessionLocks;
use crate::chat::repository::SessionRepository;
use crate::chat::title::{self, TitlePolicy};
use crate::llm::responder::AiResponder;

/// Behavioural knobs for [`ChatService`].
#[derive(Debug, Clone)]
pub struct ChatPolicy {
    pub title: TitlePolicy,
    /// When set, a rate-limited reply is replaced by this informational text
    /// instead of failing the send.
    pub rate_limit_notice: Option<String>,
}

impl ChatPolicy {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            title: TitlePolicy::from_config(config),
            rate_limit_notice: config
                .rate_limit_notice
                .then(|| config.rate_limit_message.clone()),
        }
    }
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Orchestrates chat sessions and the AI exchange.
///
/// Generic over `SessionRepository` and `AiResponder` to maintain clean
/// architecture (parley-core never depends on parley-infra). Holds no
/// session state between calls: every operation re-reads the persisted
/// session before mutating it.
pub struct ChatService<R: SessionRepository, A: AiResponder> {
    repo: R,
    responder: A,
    policy: ChatPolicy,
    locks: SessionLocks,
}

impl<R: SessionRepository, A: AiResponder> ChatService<R, A> {
    pub fn new(repo: R, responder: A, policy: ChatPolicy) -> Self {
        Self {
            repo,
            responder,
            policy,
            locks: SessionLocks::new(),
        }
    }

    /// Access the session repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Access the AI responder.
    pub fn responder(&self) -> &A {
        &self.responder
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    // --- Session lifecycle ---

    /// Create and persist an empty session.
    pub async fn create_session(&self, title: &str) -> Result<Session, ChatError> {
        let session = Session::new(title);
        self.repo.save(&session).await?;
        info!(session_id = %session.id, title = %session.title, "Session created");
        Ok(session)
    }

    /// All persisted sessions, in no particular order.
    pub async fn get_sessions(&self) -> Result<Vec<Session>, ChatError> {
        Ok(self.repo.get_all().await?)
    }

    /// Look up a session. Absence is `Ok(None)`.
    pub async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, ChatError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    /// Set a session's title.
    pub async fn rename_session(&self, id: &Uuid, title: &str) -> Result<Session, ChatError> {
        let _guard = self.locks.acquire(*id).await;

        let mut session = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(ChatError::NotFound(*id))?;

        session.rename(title);
        self.repo.save(&session).await?;
        info!(session_id = %id, title = %session.title, "Session renamed");
        Ok(session)
    }

    /// Delete a session. Deleting an unknown id is a no-op.
    pub async fn delete_session(&self, id: &Uuid) -> Result<(), ChatError> {
        let guard = self.locks.acquire(*id).await;
        self.repo.delete(id).await?;
        drop(guard);
        self.locks.forget(id);
        info!(session_id = %id, "Session deleted");
        Ok(())
    }

    // --- Messaging ---

    /// Send a user turn and return the AI's reply.
    ///
    /// The user message is persisted before the provider is called, so a
    /// provider failure leaves the session with a dangling user turn and no
    /// reply; nothing is rolled back and nothing is retried.
    #[tracing::instrument(name = "send_message", skip(self, content), fields(session_id = %session_id))]
    pub async fn send_message(
        &self,
        session_id: &Uuid,
        content: &str,
        model: Option<&str>,
    ) -> Result<ChatMessage, ChatError> {
        let _guard = self.locks.acquire(*session_id).await;

        let mut session = self
            .repo
            .get_by_id(session_id)
            .await?
            .ok_or(ChatError::NotFound(*session_id))?;

        session.push_message(ChatMessage::new(Role::User, content));
        self.repo.save(&session).await?;
        debug!(messages = session.message_count(), "User turn persisted");

        let reply_text = match self
            .responder
            .generate_response(&session.messages, model)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                let notice = if err.is_rate_limited() {
                    self.policy.rate_limit_notice.clone()
                } else {
                    None
                };
                match notice {
                    Some(notice) => {
                        warn!(error = %err, "Provider rate limited; replying with notice");
                        notice
                    }
                    None => {
                        warn!(error = %err, "AI responder failed; user turn kept");
                        return Err(ChatError::from_llm(err));
                    }
                }
            }
        };

        let reply = ChatMessage::new(Role::Model, reply_text);
        session.push_message(reply.clone());

        if self.policy.title.should_generate(&session) {
            self.apply_generated_title(&mut session, model).await;
        }

        self.repo.save(&session).await?;
        debug!(messages = session.message_count(), "Reply persisted");

        Ok(reply)
    }

    /// Best-effort retitle after the first exchange.
    ///
    /// Errors are logged and dropped here; the title only changes on success.
    async fn apply_generated_title(&self, session: &mut Session, model: Option<&str>) {
        match title::generate_title(&self.responder, &session.messages, model, &self.policy.title)
            .await
        {
            Ok(Some(new_title)) => {
                info!(session_id = %session.id, title = %new_title, "Session auto-titled");
                session.rename(new_title);
            }
            Ok(None) => {
                debug!(session_id = %session.id, "Generated title rejected; keeping placeholder");
            }
            Err(err) => {
                warn!(session_id = %session.id, error = %err, "Failed to generate auto-summary title");
            }
        }
    }
}
