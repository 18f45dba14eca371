//! Error types and error handling
//!
//! Every error is surfaced to the client immediately as a status code plus a
//! plain-text body. Nothing is retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StorageError;

/// Handler-level error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed client input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource or I/O failure on the server (500)
    #[error("{0}")]
    Internal(String),

    /// Method not supported on this path (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::CreateDirectory(_) => {
                Self::Internal("Failed to create upload directory".to_string())
            }
            StorageError::CreateFile(_) | StorageError::InvalidFilename(_) => {
                Self::Internal("Failed to create file".to_string())
            }
            StorageError::Write(_) => Self::Internal("Failed to save file".to_string()),
            StorageError::NotFound(_) => Self::NotFound("File not found".to_string()),
            StorageError::InvalidPath(_) | StorageError::Io(_) => {
                Self::Internal("Storage error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
