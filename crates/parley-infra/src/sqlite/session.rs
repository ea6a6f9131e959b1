//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool and writes on the single-connection writer pool. Each read runs in
//! one transaction so the session row and its messages come from the same
//! WAL snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parley_core::chat::repository::SessionRepository;
use parley_types::chat::{ChatMessage, Role, Session};
use parley_types::error::RepositoryError;
use sqlx::Row;
use sqlx::sqlite::SqliteConnection;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Messages of one session in conversation order.
async fn messages_for(
    conn: &mut SqliteConnection,
    session_id: &Uuid,
) -> Result<Vec<ChatMessage>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT * FROM session_messages WHERE session_id = ? ORDER BY position ASC",
    )
    .bind(session_id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(query_err)?;

    rows.iter()
        .map(|row| {
            MessageRow::from_row(row)
                .map_err(query_err)?
                .into_message()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self, messages: Vec<ChatMessage>) -> Result<Session, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;

        Ok(Session {
            id,
            title: self.title,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let role: Role = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id,
            role,
            content: self.content,
            timestamp: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn get_all(&self) -> Result<Vec<Session>, RepositoryError> {
        let mut tx = self.pool.reader.begin().await.map_err(query_err)?;

        let session_rows = sqlx::query("SELECT * FROM sessions")
            .fetch_all(&mut *tx)
            .await
            .map_err(query_err)?;

        let message_rows = sqlx::query(
            "SELECT * FROM session_messages ORDER BY session_id ASC, position ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        let mut by_session: HashMap<String, Vec<ChatMessage>> = HashMap::new();
        for row in &message_rows {
            let message_row = MessageRow::from_row(row).map_err(query_err)?;
            let session_id = message_row.session_id.clone();
            by_session
                .entry(session_id)
                .or_default()
                .push(message_row.into_message()?);
        }

        session_rows
            .iter()
            .map(|row| {
                let session_row = SessionRow::from_row(row).map_err(query_err)?;
                let messages = by_session.remove(&session_row.id).unwrap_or_default();
                session_row.into_session(messages)
            })
            .collect()
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        let mut tx = self.pool.reader.begin().await.map_err(query_err)?;

        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_err)?;

        let session = match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(query_err)?;
                let messages = messages_for(&mut *tx, id).await?;
                Some(session_row.into_session(messages)?)
            }
            None => None,
        };

        tx.commit().await.map_err(query_err)?;
        Ok(session)
    }

    async fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        let session_id = session.id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query(
            r#"INSERT INTO sessions (id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   title = excluded.title,
                   created_at = excluded.created_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&session_id)
        .bind(&session.title)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        sqlx::query("DELETE FROM session_messages WHERE session_id = ?")
            .bind(&session_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        for (position, message) in session.messages.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO session_messages (id, session_id, position, role, content, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(message.id.to_string())
            .bind(&session_id)
            .bind(position as i64)
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(format_datetime(&message.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)?;

        tracing::debug!(
            session_id = %session.id,
            messages = session.messages.len(),
            "Session saved"
        );
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            tracing::debug!(session_id = %id, "Delete of unknown session ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_repo() -> (tempfile::TempDir, SqliteSessionRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteSessionRepository::new(pool))
    }

    fn conversation(title: &str) -> Session {
        let mut session = Session::new(title);
        session.push_message(ChatMessage::new(Role::System, "Be brief."));
        session.push_message(ChatMessage::new(Role::User, "Hi"));
        session.push_message(ChatMessage::new(Role::Model, "Hello there"));
        session
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let (_dir, repo) = test_repo().await;
        let session = conversation("Project X");

        repo.save(&session).await.unwrap();
        let found = repo.get_by_id(&session.id).await.unwrap().unwrap();

        assert_eq!(found, session);
        let roles: Vec<Role> = found.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Model]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (_dir, repo) = test_repo().await;
        assert!(repo.get_by_id(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let (_dir, repo) = test_repo().await;
        let mut session = conversation("New Chat");
        repo.save(&session).await.unwrap();

        session.rename("Friendly Greeting");
        session.push_message(ChatMessage::new(Role::User, "Another question"));
        repo.save(&session).await.unwrap();

        let found = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Friendly Greeting");
        assert_eq!(found.messages.len(), 4);
        assert_eq!(found.messages[3].content, "Another question");
        assert_eq!(found.updated_at, session.updated_at);
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_with_fewer_messages_replaces_rows() {
        let (_dir, repo) = test_repo().await;
        let mut session = conversation("x");
        repo.save(&session).await.unwrap();

        session.messages.truncate(1);
        repo.save(&session).await.unwrap();

        let found = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(found.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_groups_messages_per_session() {
        let (_dir, repo) = test_repo().await;
        let a = conversation("A");
        let b = Session::new("B");
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let mut all = repo.get_all().await.unwrap();
        all.sort_by(|x, y| x.title.cmp(&y.title));

        assert_eq!(all, vec![a, b]);
    }

    #[tokio::test]
    async fn test_delete_cascades_messages() {
        let (_dir, repo) = test_repo().await;
        let session = conversation("x");
        repo.save(&session).await.unwrap();

        repo.delete(&session.id).await.unwrap();
        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM session_messages")
            .fetch_one(&repo.pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, repo) = test_repo().await;
        let session = Session::new("keep");
        repo.save(&session).await.unwrap();

        repo.delete(&Uuid::now_v7()).await.unwrap();
        repo.delete(&Uuid::now_v7()).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap(), vec![session]);
    }

    /// Title and `updated_at` must always belong to the same write as the
    /// message list they are read with.
    fn assert_consistent(session: &Session) {
        assert_eq!(session.title, format!("v{}", session.messages.len()));
        if let Some(last) = session.messages.last() {
            assert!(last.timestamp <= session.updated_at);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_see_whole_saves_under_concurrent_writes() {
        let (_dir, repo) = test_repo().await;
        let repo = std::sync::Arc::new(repo);
        let mut session = Session::new("v0");
        repo.save(&session).await.unwrap();
        let id = session.id;

        let writer = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for n in 1..=150 {
                    session.push_message(ChatMessage::new(Role::User, format!("turn {n}")));
                    session.rename(format!("v{n}"));
                    repo.save(&session).await.unwrap();
                }
            })
        };

        loop {
            let found = repo.get_by_id(&id).await.unwrap().unwrap();
            assert_consistent(&found);
            for listed in repo.get_all().await.unwrap() {
                assert_consistent(&listed);
            }
            if writer.is_finished() {
                break;
            }
        }
        writer.await.unwrap();

        let last = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_consistent(&last);
        assert_eq!(last.messages.len(), 150);
    }
}
