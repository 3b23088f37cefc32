//! Error types for the review server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docreview_core::ReviewError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FileMissing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("{0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ServerError::FileMissing(msg) => {
                (StatusCode::NOT_FOUND, "FILE_NOT_FOUND", msg.clone())
            }
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::UnsupportedFormat(msg) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", msg.clone())
            }
            ServerError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            ServerError::Processing(msg) => {
                tracing::error!("Processing failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROCESSING_FAILED",
                    msg.clone(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    msg.clone(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReviewError> for ServerError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(_) => ServerError::NotFound("Document not found".to_string()),
            ReviewError::BlobMissing(_) => {
                ServerError::FileMissing("File not found on server".to_string())
            }
            ReviewError::UnsupportedFormat(e) => ServerError::UnsupportedFormat(e.to_string()),
            ReviewError::Validation(msg) => ServerError::InvalidRequest(msg),
            e @ (ReviewError::Format(_)
            | ReviewError::Grammar(_)
            | ReviewError::EmptyExtraction) => ServerError::Processing(e.to_string()),
            e @ (ReviewError::Storage(_) | ReviewError::Internal(_)) => {
                ServerError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{DocumentId, UnsupportedFormat};

    fn status_of(err: ReviewError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn test_review_errors_map_to_status_codes() {
        let id = DocumentId::new();
        assert_eq!(status_of(ReviewError::NotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ReviewError::BlobMissing(id)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ReviewError::UnsupportedFormat(UnsupportedFormat {
                extension: ".txt".to_string()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ReviewError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ReviewError::EmptyExtraction),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ReviewError::Storage(std::io::Error::other("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
