//! Maps orchestrator/storage failures onto HTTP responses, in the style of
//! the teacher's `DomainError` -> status code mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cleanroute_core::OptimizerError;
use serde_json::json;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<OptimizerError> for ApiError {
    fn from(err: OptimizerError) -> Self {
        match err {
            OptimizerError::PhaseFault { message, .. } => ApiError::internal(message),
            OptimizerError::SinkFailure(_, e) | OptimizerError::StoreFailure(_, e) => {
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<cleanroute_storage::StorageError> for ApiError {
    fn from(err: cleanroute_storage::StorageError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<cleanroute_domain::IngestError> for ApiError {
    fn from(err: cleanroute_domain::IngestError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
