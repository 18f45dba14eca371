//! File upload extractor for multipart form data
//!
//! [`FileUpload`] pulls the file sent in the `file` form field out of a
//! `multipart/form-data` body. Other fields are ignored.
//!
//! The total body size is bounded by whatever body limit is layered on the
//! route (see [`axum::extract::DefaultBodyLimit`]); a body over the limit
//! surfaces as [`FileUploadError::Multipart`].
//!
//! # Example
//!
//! ```rust,no_run
//! use file_validator::extractors::FileUpload;
//! use axum::response::IntoResponse;
//!
//! async fn handler(FileUpload(file): FileUpload) -> impl IntoResponse {
//!     format!("Received: {} ({} bytes)", file.filename, file.size())
//! }
//! ```

use crate::storage::{is_plain_filename, UploadedFile};
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Name of the form field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Error types for file upload extraction
#[derive(Debug, Error)]
pub enum FileUploadError {
    /// Body is not a readable multipart form (or exceeded the body limit)
    #[error("Failed to parse form")]
    Multipart(String),

    /// No file was sent in the `file` field
    #[error("Failed to get file")]
    MissingFile,

    /// Filename reduces to nothing usable (`.`, `..`, or a bare separator)
    #[error("Invalid filename")]
    InvalidFilename(String),
}

impl IntoResponse for FileUploadError {
    fn into_response(self) -> Response {
        if let Self::Multipart(detail) = &self {
            tracing::debug!(detail = %detail, "rejecting unparsable multipart body");
        }
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Extractor for the single file in the `file` form field
///
/// The first part named `file` that carries a filename wins. The filename is
/// reduced to its final path component, so `../../etc/cat.png` is received
/// as `cat.png`. A part without a `Content-Type` yields an empty content type.
#[derive(Debug)]
pub struct FileUpload(pub UploadedFile);

impl<S> FromRequest<S> for FileUpload
where
    S: Send + Sync,
{
    type Rejection = FileUploadError;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| FileUploadError::Multipart(e.to_string()))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| FileUploadError::Multipart(e.to_string()))?
            {
                if field.name() != Some(FILE_FIELD) {
                    continue;
                }

                // A part without a filename is a plain form value, not a file
                let Some(raw_name) = field.file_name().filter(|n| !n.is_empty()) else {
                    continue;
                };
                let filename = client_filename(raw_name)
                    .ok_or_else(|| FileUploadError::InvalidFilename(raw_name.to_string()))?;

                let content_type = field.content_type().unwrap_or_default().to_string();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| FileUploadError::Multipart(e.to_string()))?;

                return Ok(Self(UploadedFile {
                    filename,
                    content_type,
                    data,
                }));
            }

            Err(FileUploadError::MissingFile)
        }
    }
}

/// Reduces a client-supplied filename to its final path component
///
/// Returns `None` when nothing usable remains.
fn client_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    is_plain_filename(name).then(|| name.to_string())
}
