//! HTTP handlers for validation and upload
//!
//! | Method  | Path        | Handler                |
//! |---------|-------------|------------------------|
//! | POST    | `/validate` | [`validate_file`]      |
//! | POST    | `/upload`   | [`upload_file`]        |
//! | OPTIONS | both        | [`preflight`]          |
//! | other   | both        | [`method_not_allowed`] |

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extractors::FileUpload;
use crate::state::AppState;
use crate::storage::{ValidationRequest, ValidationResult};

/// Body returned for a stored upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always `true`; failures use other bodies
    pub success: bool,

    /// Name the file was stored under
    pub filename: String,

    /// Stored size in bytes
    pub size: u64,

    /// Public URL of the stored file
    pub url: String,
}

/// Validates a JSON file descriptor without receiving the file
///
/// The body is decoded regardless of its `Content-Type`, with the lenient
/// rules of [`ValidationRequest::from_json`]. Missing fields take their zero
/// value.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] ("Invalid request body") if the body is
/// not a JSON object of the expected shape.
pub async fn validate_file(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ValidationResult>), ApiError> {
    let request = ValidationRequest::from_json(&body).map_err(|e| {
        tracing::debug!(error = %e, "undecodable validation request");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let result = state.validator().validate(&request);

    if result.valid {
        tracing::debug!(filename = %request.filename, size = request.size, "file descriptor accepted");
        Ok((StatusCode::OK, Json(result)))
    } else {
        tracing::info!(
            filename = %request.filename,
            size = request.size,
            mime_type = %request.mime_type,
            errors = ?result.errors,
            "file descriptor rejected"
        );
        Ok((StatusCode::BAD_REQUEST, Json(result)))
    }
}

/// Validates an uploaded file and stores it if it passes
///
/// A rejected file is answered with the [`ValidationResult`] and never
/// touches storage.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] naming the failed stage if the uploads
/// directory, the destination file or the write fails.
pub async fn upload_file(
    State(state): State<AppState>,
    FileUpload(file): FileUpload,
) -> Result<Response, ApiError> {
    let result = state.validator().validate(&file.validation_request());

    if !result.valid {
        tracing::info!(
            filename = %file.filename,
            size = file.size(),
            content_type = %file.content_type,
            errors = ?result.errors,
            "upload rejected"
        );
        return Ok((StatusCode::BAD_REQUEST, Json(result)).into_response());
    }

    let stored = state.storage().store(&file).await.map_err(|e| {
        tracing::error!(filename = %file.filename, error = %e, "failed to store upload");
        ApiError::from(e)
    })?;

    let url = state.config().uploads.url_for(&stored.filename);
    tracing::info!(
        filename = %stored.filename,
        size = stored.size,
        path = %stored.path.display(),
        "upload stored"
    );

    Ok(Json(UploadResponse {
        success: true,
        filename: stored.filename,
        size: stored.size,
        url,
    })
    .into_response())
}

/// Answers CORS preflight requests; the headers come from the CORS layer
#[allow(clippy::unused_async)]
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unsupported methods on known paths
#[allow(clippy::unused_async)]
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileValidatorConfig;
    use crate::storage::{MockFileStorage, StorageError, UploadedFile};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn local_state(temp: &TempDir) -> AppState {
        let mut config = FileValidatorConfig::default();
        config.uploads.dir = temp.path().join("uploads");
        AppState::new(config).unwrap()
    }

    fn failing_state(err: fn() -> StorageError) -> AppState {
        let mut storage = MockFileStorage::new();
        storage.expect_store().returning(move |_| Err(err()));
        AppState::with_storage(FileValidatorConfig::default(), Arc::new(storage))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_validate_accepts_conforming_file() {
        let temp = TempDir::new().unwrap();
        let body = Bytes::from_static(br#"{"filename":"cat.png","size":2048,"mimeType":"image/png"}"#);

        let (status, Json(result)) = validate_file(State(local_state(&temp)), body)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(result.valid);
        assert_eq!(result.message, "File is valid");
    }

    #[tokio::test]
    async fn test_validate_rejects_with_reasons() {
        let temp = TempDir::new().unwrap();
        let body = Bytes::from_static(br#"{"filename":"a.txt","size":100,"mimeType":"text/plain"}"#);

        let (status, Json(result)) = validate_file(State(local_state(&temp)), body)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("File extension .txt not allowed"));
        assert_eq!(result.errors[1], "MIME type text/plain not allowed");
    }

    #[tokio::test]
    async fn test_validate_tolerates_trailing_data_and_key_case() {
        let temp = TempDir::new().unwrap();
        let body = Bytes::from_static(
            b"{\"FileName\":\"cat.png\",\"size\":2048,\"MimeType\":\"image/png\"}\n\n",
        );

        let (status, Json(result)) = validate_file(State(local_state(&temp)), body)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(result.valid);
    }

    #[tokio::test]
    async fn test_validate_malformed_json() {
        let temp = TempDir::new().unwrap();
        let err = validate_file(State(local_state(&temp)), Bytes::from_static(b"{not json"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request body");
    }

    #[tokio::test]
    async fn test_upload_stores_valid_file() {
        let temp = TempDir::new().unwrap();
        let state = local_state(&temp);
        let upload = FileUpload(UploadedFile::new("cat.png", "image/png", b"meow".to_vec()));

        let response = upload_file(State(state), upload).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: UploadResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            UploadResponse {
                success: true,
                filename: "cat.png".to_string(),
                size: 4,
                url: "/uploads/cat.png".to_string(),
            }
        );
        assert_eq!(
            std::fs::read(temp.path().join("uploads/cat.png")).unwrap(),
            b"meow"
        );
    }

    #[tokio::test]
    async fn test_upload_rejected_file_is_not_stored() {
        let mut storage = MockFileStorage::new();
        storage.expect_store().never();
        let state = AppState::with_storage(FileValidatorConfig::default(), Arc::new(storage));
        let upload = FileUpload(UploadedFile::new("notes.txt", "text/plain", b"hi".to_vec()));

        let response = upload_file(State(state), upload).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let result: ValidationResult = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_storage_failures_are_internal() {
        let cases: [(fn() -> StorageError, &str); 3] = [
            (
                || StorageError::CreateDirectory(std::io::Error::other("denied")),
                "Failed to create upload directory",
            ),
            (
                || StorageError::CreateFile(std::io::Error::other("denied")),
                "Failed to create file",
            ),
            (
                || StorageError::Write(std::io::Error::other("disk full")),
                "Failed to save file",
            ),
        ];

        for (err, message) in cases {
            let upload = FileUpload(UploadedFile::new("cat.png", "image/png", b"meow".to_vec()));
            let err = upload_file(State(failing_state(err)), upload)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.to_string(), message);
        }
    }

    #[tokio::test]
    async fn test_preflight_and_method_not_allowed() {
        assert_eq!(preflight().await, StatusCode::OK);

        let response = method_not_allowed().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(response).await, "Method not allowed");
    }
}
