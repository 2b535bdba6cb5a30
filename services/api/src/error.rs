//! Custom error types for the API service

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the API service
///
/// Every failure a handler can produce maps to exactly one of these
/// variants; the HTTP layer renders them all into the uniform error
/// envelope `{statusCode, message, success: false, errors: []}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    /// Missing, invalid, or expired credential (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (403)
    #[error("{0}")]
    Forbidden(String),

    /// Entity absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Downstream object-storage failure (500)
    #[error("{0}")]
    Upload(String),

    /// Database failure (500)
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Any other downstream failure (500)
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self::Validation {
            message: errors
                .first()
                .cloned()
                .unwrap_or_else(|| "Validation failed".to_string()),
            errors,
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized request".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upload(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Public-facing message; database and internal detail never reach the caller
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn error_list(&self) -> Vec<String> {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(e) => error!("Database error: {}", e),
            ApiError::Internal(e) => error!("Internal error: {:#}", e),
            ApiError::Upload(msg) => error!("Storage error: {}", msg),
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": self.public_message(),
            "success": false,
            "errors": self.error_list(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upload("s3 failed".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.public_message(), "Database error");

        let err = ApiError::Internal(anyhow::anyhow!("secret connection string"));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_validation_errors_populate_list() {
        let err = ApiError::validation_errors(vec![
            "Username is required".to_string(),
            "Email is required".to_string(),
        ]);
        assert_eq!(err.error_list().len(), 2);
        assert_eq!(err.public_message(), "Username is required");
    }
}
