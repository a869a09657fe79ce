use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

/// Error response rendered as `{"error": ..., "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, detail: Option<String>) -> Self {
        Self { status, error, detail }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, title) = match &e {
            ServiceError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "Invalid Identifier"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::InvalidDateFormat(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid Date Format"),
            ServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Validation Error"),
            ServiceError::StorageUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Unavailable"),
        };
        if status.is_server_error() {
            error!(code = e.code(), err = %e, "request failed");
        } else {
            debug!(code = e.code(), err = %e, "request rejected");
        }
        Self::new(status, title, Some(e.to_string()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"error": self.error, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
