use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{catalog::CatalogError, store::StoreError};

/// Errors surfaced at the route boundary
///
/// Every variant renders as `{"message": "..."}`. Store, catalog and internal
/// failures are logged in full but answer with a fixed generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an invalid/expired session
    #[error("{0}")]
    Authentication(&'static str),

    /// External user store failure
    #[error("user store error: {0}")]
    Persistence(#[from] StoreError),

    /// External game catalog failure
    #[error("game catalog error: {0}")]
    Upstream(#[from] CatalogError),

    /// Too many requests from one client
    #[error("rate limit exceeded")]
    RateLimited,

    /// The request was not handled in time
    #[error("request timed out")]
    Timeout,

    /// Anything else
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(CatalogError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::Authentication(message) => (*message).to_string(),
            AppError::Persistence(_) => "User store request failed".to_string(),
            AppError::Upstream(CatalogError::NotFound) => "Game not found".to_string(),
            AppError::Upstream(_) => "Game catalog request failed".to_string(),
            AppError::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            AppError::Timeout => "Request timed out".to_string(),
            AppError::Unexpected(_) => "Unexpected error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}
