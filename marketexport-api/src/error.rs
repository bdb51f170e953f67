use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors a query can answer with. Each becomes a `{"detail": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid market. Valid markets: {}", valid.join(", "))]
    InvalidMarket { valid: Vec<String> },

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Data not found")]
    NotFound,

    #[error("Invalid JSON data")]
    InvalidData,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMarket { .. } | ApiError::InvalidTicker(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidData | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "query failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
