//! SessionRepository trait definition.
//!
//! Durable keyed storage of sessions with full read/overwrite granularity
//! per session. Follows the RPITIT pattern used by `LlmProvider`.

use parley_types::chat::Session;
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for session persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteSessionRepository`).
/// Every operation is atomic at single-session granularity.
pub trait SessionRepository: Send + Sync {
    /// Every persisted session, in no particular order.
    fn get_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Look up a session by id. Absence is `Ok(None)`, not an error.
    fn get_by_id(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Upsert by id: create if absent, overwrite entirely if present.
    fn save(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a session and its messages. Missing ids are not an error.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
