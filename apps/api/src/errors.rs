use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::client::LlmError;
use crate::auth::AuthError;
use crate::builder::reducer::ReduceError;
use crate::export::ExportError;
use crate::persistence::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid action: {0}")]
    InvalidAction(#[from] ReduceError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] LlmError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::InvalidEmail | AuthError::WeakPassword => {
                AppError::Validation(err.to_string())
            }
            AuthError::Hashing(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::Token(_) => {
                tracing::debug!("Rejected credentials: {err}");
                AppError::Unauthorized
            }
        }
    }
}

impl AppError {
    /// Errors the client can resolve by simply trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Analysis(_) | AppError::Export(_) | AppError::Store(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidAction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_ACTION",
                e.to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::UnsupportedMedia(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "Your resume could not be saved or loaded right now".to_string(),
                )
            }
            AppError::Analysis(e) => {
                tracing::error!("Analysis error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    "The analysis service did not return a usable result. Please try again."
                        .to_string(),
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    "The PDF could not be generated. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if self.is_retryable() {
            error["retryable"] = json!(true);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::model::SectionKind;

    #[test]
    fn test_reduce_error_is_unprocessable() {
        let err = AppError::from(ReduceError::IndexOutOfRange {
            section: SectionKind::Skills,
            index: 3,
            len: 1,
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_analysis_failure_is_bad_gateway_and_retryable() {
        let err = AppError::from(LlmError::EmptyContent);
        assert!(err.is_retryable());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_auth_errors_map_to_status() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AuthError::EmailTaken),
            AppError::Conflict(_)
        ));
        assert!(!AppError::from(AuthError::MissingToken).is_retryable());
    }
}
