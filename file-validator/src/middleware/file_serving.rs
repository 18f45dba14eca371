//! Serving stored uploads back to clients
//!
//! `GET {url_prefix}/{filename}` returns a stored file with cache headers:
//! - `ETag` derived from size and modification time
//! - `Last-Modified` from the file's modification time
//! - `Cache-Control: public, max-age=86400`
//!
//! A request whose `If-None-Match` matches the current `ETag` is answered
//! with `304 Not Modified` and no body.

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{is_plain_filename, RetrievedFile, StorageError};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_NONE_MATCH, LAST_MODIFIED},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::time::{SystemTime, UNIX_EPOCH};

/// `Cache-Control` value sent with served files
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=86400";

/// Handler for serving a single stored file
///
/// # Errors
///
/// - [`ApiError::BadRequest`] if the name is not a plain filename
/// - [`ApiError::NotFound`] if nothing is stored under that name
/// - [`ApiError::Internal`] if reading the file fails
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !is_plain_filename(&filename) {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let file = state
        .storage()
        .retrieve(&filename)
        .await
        .map_err(|e| {
            if !matches!(e, StorageError::NotFound(_)) {
                tracing::error!(filename = %filename, error = %e, "failed to read stored file");
            }
            ApiError::from(e)
        })?;

    let etag = entity_tag(&file);

    if headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| etag_matches(v, &etag))
    {
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag)]).into_response());
    }

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    Ok(build_file_response(file, &etag, &content_type))
}

/// Strong entity tag: `"{len:x}-{mtime_secs:x}"`
fn entity_tag(file: &RetrievedFile) -> String {
    let modified = file.modified.map_or(0, unix_seconds);
    format!(r#""{:x}-{modified:x}""#, file.data.len())
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

/// `If-None-Match` may carry `*` or a comma-separated list of tags
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

fn build_file_response(file: RetrievedFile, etag: &str, content_type: &str) -> Response {
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, file.data.len())
        .header(ETAG, etag)
        .header(CACHE_CONTROL, CACHE_CONTROL_VALUE);

    if let Some(modified) = file.modified {
        response = response.header(LAST_MODIFIED, httpdate::fmt_http_date(modified));
    }

    response
        .body(Body::from(file.data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
