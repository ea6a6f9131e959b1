//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions               - List sessions, most recent first
//! - POST   /api/v1/sessions               - Create a session
//! - GET    /api/v1/sessions/{id}          - Get a single session
//! - PATCH  /api/v1/sessions/{id}          - Rename a session
//! - DELETE /api/v1/sessions/{id}          - Delete a session
//! - POST   /api/v1/sessions/{id}/messages - Send a message, returns the reply

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use parley_types::chat::{ChatMessage, DEFAULT_SESSION_TITLE, Session, sort_by_recent};
use parley_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for creating a session.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for renaming a session.
#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub title: String,
}

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    /// Model override for this message only.
    #[serde(default)]
    pub model: Option<String>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn non_blank<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}

fn session_link(id: &Uuid) -> String {
    format!("/api/v1/sessions/{id}")
}

/// GET /api/v1/sessions - List sessions, most recently updated first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Session>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let mut sessions = state.chat_service.get_sessions().await?;
    sort_by_recent(&mut sessions);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(sessions, request_id, elapsed)
        .with_link("self", "/api/v1/sessions");

    Ok(Json(resp))
}

/// POST /api/v1/sessions - Create a session.
///
/// The body is optional; without one, or without a `title`, the session is
/// named "New Chat".
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<Session>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let title = body.and_then(|Json(req)| req.title);
    let title = match title.as_deref() {
        Some(title) => non_blank(title, "Title")?,
        None => DEFAULT_SESSION_TITLE,
    };

    let session = state.chat_service.create_session(title).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let link = session_link(&session.id);
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &link)
        .with_link("messages", &format!("{link}/messages"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/sessions/{id} - Get a session with its messages.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state
        .chat_service
        .get_session(&sid)
        .await?
        .ok_or(ChatError::NotFound(sid))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &session_link(&sid))
        .with_link("messages", &format!("{}/messages", session_link(&sid)));

    Ok(Json(resp))
}

/// PATCH /api/v1/sessions/{id} - Rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<RenameSessionRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let title = non_blank(&req.title, "Title")?;
    let session = state.chat_service.rename_session(&sid, title).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &session_link(&sid));

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Delete a session. Unknown ids succeed.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.chat_service.delete_session(&sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({ "deleted": true, "session_id": sid.to_string() }),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/messages - Send a user message and return the reply.
///
/// On provider failure the user message stays persisted; the client can
/// re-send the same content.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    // Validated trimmed, stored verbatim.
    non_blank(&req.content, "Message content")?;
    let content = req.content.as_str();
    let model = req.model.as_deref().map(str::trim).filter(|m| !m.is_empty());

    let reply = state.chat_service.send_message(&sid, content, model).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(reply, request_id, elapsed)
        .with_link("session", &session_link(&sid));

    Ok(Json(resp))
}
