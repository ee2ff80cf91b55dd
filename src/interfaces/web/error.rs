use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::pipeline::{PipelineError, PipelineFailure};
use crate::core::store::StoreError;

/// HTTP-facing error: maps the storage and pipeline taxonomies to status
/// codes and a JSON body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Pipeline {
        session_id: Option<String>,
        error: PipelineError,
    },
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            StoreError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineFailure> for ApiError {
    fn from(failure: PipelineFailure) -> Self {
        ApiError::Pipeline {
            session_id: failure.session_id,
            error: failure.error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ApiError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            ApiError::Pipeline { session_id, error } => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": error.to_string(),
                    "stage": error.stage(),
                    "session_id": session_id,
                })),
            )
                .into_response(),
        }
    }
}
