use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The referenced session id does not exist.
    #[error("session {0} not found")]
    NotFound(Uuid),

    /// The AI responder failed for a reason other than rate limiting.
    /// The user turn that triggered the call remains persisted.
    #[error("AI provider failure: {0}")]
    ProviderFailure(LlmError),

    /// The AI responder signaled quota or throughput exhaustion.
    #[error("AI provider rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Persistence failed; the current operation was aborted.
    #[error("session store failure: {0}")]
    StoreFailure(#[from] RepositoryError),
}

impl ChatError {
    /// Classify a responder error into the orchestrator taxonomy.
    pub fn from_llm(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { retry_after_ms } => ChatError::RateLimited { retry_after_ms },
            other => ChatError::ProviderFailure(other),
        }
    }
}
