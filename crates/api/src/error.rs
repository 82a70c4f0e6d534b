//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ingestion::IngestionError;
use metadata_index::IndexError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Ingestion saga error.
    Ingestion(IngestionError),
    /// Metadata index error outside the saga.
    Index(IndexError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Ingestion(err) => ingestion_error_to_response(err),
            ApiError::Index(err) => index_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn ingestion_error_to_response(err: IngestionError) -> (StatusCode, String) {
    match &err {
        IngestionError::RecordNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        IngestionError::RecordNotAccepting { .. } => (StatusCode::CONFLICT, err.to_string()),
        IngestionError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        IngestionError::IndexCommit(
            IndexError::RecordNotAccepting { .. } | IndexError::DuplicateArtifact { .. },
        ) => (StatusCode::CONFLICT, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn index_error_to_response(err: IndexError) -> (StatusCode, String) {
    match &err {
        IndexError::RecordNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        IndexError::DuplicateBusinessKey(_) => (StatusCode::CONFLICT, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        ApiError::Ingestion(err)
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        ApiError::Index(err)
    }
}
