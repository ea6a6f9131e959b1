//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use parley_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    /// Malformed request input (bad UUID, empty content or title).
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Chat(ChatError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session '{id}' not found"),
                None,
            ),
            AppError::Chat(ChatError::RateLimited { retry_after_ms }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "The AI provider is rate limiting requests; the message was saved".to_string(),
                retry_after_ms.map(|ms| json!({ "retry_after_ms": ms })),
            ),
            AppError::Chat(e @ ChatError::ProviderFailure(_)) => (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_FAILURE",
                e.to_string(),
                None,
            ),
            AppError::Chat(e @ ChatError::StoreFailure(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_FAILURE",
                e.to_string(),
                None,
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::debug!(code, error = %message, "Request rejected");
        }

        let body = ApiResponse::error(code, &message, details, Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
