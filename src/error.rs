//! Structured error types for board operations and HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    InvalidFieldValue,

    // Not found errors
    TaskNotFound,

    // Internal errors
    DatabaseError,
    StorageError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::TaskNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError | ErrorCode::StorageError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error raised by a board operation.
///
/// Validation failures such as a missing title never become a `BoardError`;
/// only not-found, malformed input that had to be parsed, and infrastructure
/// failures do.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct BoardError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl BoardError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StorageError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BoardError>() {
            Ok(board_err) => board_err,
            Err(err) if err.is::<rusqlite::Error>() => BoardError::database(format!("{:#}", err)),
            Err(err) => BoardError::internal(format!("{:#}", err)),
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        } else {
            tracing::debug!(code = ?self.code, "{}", self.message);
        }

        let body = format!(
            r#"<!doctype html><html><head><meta charset="utf-8"><title>{code} {reason}</title></head>
<body><h1>{code} {reason}</h1><p>{message}</p><p><a href="/">Back to the board</a></p></body></html>"#,
            code = status.as_u16(),
            reason = status.canonical_reason().unwrap_or("Error"),
            message = crate::web::templates::html_escape(&self.message),
        );
        (status, Html(body)).into_response()
    }
}

/// Result type for board operations.
pub type BoardResult<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_http_status() {
        assert_eq!(BoardError::task_not_found(3).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            BoardError::invalid_value("due_date", "bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BoardError::storage("disk full").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn anyhow_round_trips_board_error() {
        let err: anyhow::Error = BoardError::task_not_found(9).into();
        let back = BoardError::from(err);
        assert_eq!(back.code, ErrorCode::TaskNotFound);
        assert_eq!(back.message, "Task not found: 9");
    }

    #[test]
    fn other_anyhow_errors_become_internal() {
        let back = BoardError::from(anyhow::anyhow!("boom"));
        assert_eq!(back.code, ErrorCode::InternalError);
    }

    #[test]
    fn serializes_with_screaming_code() {
        let json = serde_json::to_string(&BoardError::invalid_value("due_date", "bad date")).unwrap();
        assert!(json.contains("INVALID_FIELD_VALUE"));
        assert!(json.contains("due_date"));
    }
}
