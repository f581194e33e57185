//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Identity headers are missing or malformed.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's role does not allow the operation.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Domain(err) => domain_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_)
        | DomainError::EmptyItems
        | DomainError::InsufficientStock { .. }
        | DomainError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) | DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
        DomainError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
