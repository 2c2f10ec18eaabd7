use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use framecast_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce the
/// `{"error":"<message>"}` JSON bodies the API contract requires —
/// image bodies are never returned with non-200.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `framecast-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource with a human-readable message.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<framecast_frame::FrameError> for AppError {
    fn from(err: framecast_frame::FrameError) -> Self {
        AppError::Core(CoreError::from(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                CoreError::Upstream { status, message } => {
                    tracing::error!(status, error = %message, "Upstream failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("upstream error ({status}): {message}"),
                    )
                }
                CoreError::Device(msg) => {
                    tracing::error!(error = %msg, "Device failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
                }
                CoreError::Processor(msg) => {
                    tracing::error!(error = %msg, "Processor failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("processor service failed: {msg}"),
                    )
                }
                CoreError::Timeout { elapsed_ms } => {
                    tracing::error!(elapsed_ms, "Operation timed out");
                    (StatusCode::INTERNAL_SERVER_ERROR, core.to_string())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
                }
            },

            AppError::Database(err) => match err {
                sqlx::Error::RowNotFound => {
                    (StatusCode::NOT_FOUND, "resource not found".to_string())
                }
                other => {
                    tracing::error!(error = %other, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "database error".to_string(),
                    )
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
