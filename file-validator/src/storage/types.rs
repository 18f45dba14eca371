//! Core types for upload storage

use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

use super::validation::ValidationRequest;

/// Errors that can occur during file storage operations
///
/// The write path distinguishes the three stages of a store (directory,
/// file creation, byte copy) so callers can report which one failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The uploads directory could not be created
    #[error("Failed to create upload directory: {0}")]
    CreateDirectory(#[source] std::io::Error),

    /// The destination file could not be created or truncated
    #[error("Failed to create file: {0}")]
    CreateFile(#[source] std::io::Error),

    /// Writing the file bytes failed part-way
    #[error("Failed to save file: {0}")]
    Write(#[source] std::io::Error),

    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// Filename cannot be mapped to a path inside the storage directory
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Storage root is unusable
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Reading a stored file failed
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file received from a multipart upload, held in memory until stored
///
/// # Examples
///
/// ```rust
/// use file_validator::storage::UploadedFile;
///
/// let file = UploadedFile::new("cat.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(file.size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, reduced to its final path component
    pub filename: String,

    /// Content type declared on the multipart part (empty if none was sent)
    pub content_type: String,

    /// File bytes
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates a new uploaded file
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Returns the size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Describes this file for the validator
    #[must_use]
    pub fn validation_request(&self) -> ValidationRequest {
        ValidationRequest {
            filename: self.filename.clone(),
            size: self.size(),
            mime_type: self.content_type.clone(),
        }
    }
}

/// A file that has been written to the storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name the file was stored under
    pub filename: String,

    /// Bytes written
    pub size: u64,

    /// Backend-specific location (a filesystem path for local storage)
    pub path: PathBuf,
}

impl fmt::Display for StoredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoredFile(filename={}, size={}, path={})",
            self.filename,
            self.size,
            self.path.display()
        )
    }
}

/// Contents and modification time of a previously stored file
#[derive(Debug, Clone)]
pub struct RetrievedFile {
    /// File bytes
    pub data: Vec<u8>,

    /// Last modification time, if the backend reports one
    pub modified: Option<SystemTime>,
}
