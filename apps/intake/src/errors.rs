use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

pub const DUPLICATE_SUBMISSION: &str = "Form already filled with this email or scholar number.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing resume is reported as plain text rather than JSON.
    #[error("Resume not found")]
    ResumeNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(_) => AppError::Validation(err.to_string()),
            StoreError::Conflict(field) => {
                tracing::info!("Rejected duplicate submission on {field}");
                AppError::Conflict(DUPLICATE_SUBMISSION.to_string())
            }
            // Malformed ids surface as store failures, not client errors.
            StoreError::InvalidId(_) | StoreError::Database(_) => AppError::Store(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ResumeNotFound => {
                return (StatusCode::NOT_FOUND, "Resume not found").into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Store(msg) => {
                tracing::error!("Store error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_statuses() {
        let cases = [
            (StoreError::Validation(vec!["name".into()]), StatusCode::BAD_REQUEST),
            (StoreError::Conflict("email".into()), StatusCode::CONFLICT),
            (StoreError::InvalidId("xyz".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                StoreError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_conflict_hides_field_name() {
        let err = AppError::from(StoreError::Conflict("scholarNo".into()));
        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_SUBMISSION));
    }

    #[test]
    fn test_resume_not_found_is_plain_text() {
        let response = AppError::ResumeNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
