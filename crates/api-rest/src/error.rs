//! HTTP error mapping.
//!
//! Store errors are translated into one of three response classes:
//!
//! | Variant | Status | Body |
//! |---|---|---|
//! | [`ApiError::BadRequest`] | 400 | `{ "error": <reason> }` |
//! | [`ApiError::NotFound`] | 404 | `{ "error": <message> }` |
//! | [`ApiError::Internal`] | 500 | `{ "error": <message>, "details": <cause> }` |
//!
//! Internal errors are logged when converted into a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canvas_core::{CanvasError, FilesError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,

    /// Text of the underlying failure, present on 500 responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{message}: {details}")]
    Internal { message: String, details: String },
}

impl ApiError {
    /// A 500 carrying `message` and the display text of `cause`.
    pub fn internal(message: &str, cause: impl Display) -> Self {
        Self::Internal {
            message: message.to_owned(),
            details: cause.to_string(),
        }
    }

    pub(crate) fn from_files(err: FilesError, message: &str) -> Self {
        match err {
            FilesError::NotFound(_) => Self::NotFound("File not found".into()),
            FilesError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
                Self::BadRequest(format!("Invalid multipart body: {}", e))
            }
            other => Self::internal(message, other),
        }
    }

    pub(crate) fn from_canvas(err: CanvasError, message: &str) -> Self {
        match err {
            CanvasError::NotFound(_) => Self::NotFound("Canvas not found".into()),
            CanvasError::InvalidDocument(reason) | CanvasError::InvalidInput(reason) => {
                Self::BadRequest(reason)
            }
            other => Self::internal(message, other),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal("Request processing failed", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::BadRequest(error) | Self::NotFound(error) => ErrorBody {
                error,
                details: None,
            },
            Self::Internal { message, details } => {
                tracing::error!(error = %details, "{}", message);
                ErrorBody {
                    error: message,
                    details: Some(details),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_not_found_maps_to_404() {
        let err = ApiError::from_files(FilesError::NotFound("abc".into()), "Failed to read file");

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn files_io_maps_to_500_with_details() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem");
        let err = ApiError::from_files(FilesError::Io(io_err), "Failed to upload file");

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            ApiError::Internal { message, details } => {
                assert_eq!(message, "Failed to upload file");
                assert!(details.contains("read-only filesystem"));
            }
            other => panic!("Expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn files_invalid_data_maps_to_400() {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, "incomplete field data");
        let err = ApiError::from_files(FilesError::Io(io_err), "Failed to upload file");

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn canvas_errors_map_by_kind() {
        let not_found = ApiError::from_canvas(CanvasError::NotFound("x".into()), "m");
        let invalid = ApiError::from_canvas(CanvasError::InvalidDocument("array".into()), "m");
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        let write = ApiError::from_canvas(CanvasError::FileWrite(io_err), "m");

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(write.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_omits_missing_details() {
        let body = ErrorBody {
            error: "Canvas not found".into(),
            details: None,
        };

        let json = serde_json::to_string(&body).unwrap();

        assert_eq!(json, r#"{"error":"Canvas not found"}"#);
    }
}
