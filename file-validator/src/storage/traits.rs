//! File storage trait definitions

use super::types::{RetrievedFile, StorageResult, StoredFile, UploadedFile};
use async_trait::async_trait;

/// Abstraction over where accepted uploads are persisted
///
/// Files are addressed by the name they were uploaded with. Storing a name
/// that already exists replaces the previous contents.
///
/// # Concurrency
///
/// Implementations are not required to make writes atomic. Two concurrent
/// stores of the same name may interleave, and a reader racing a store may
/// observe a partially written file.
///
/// # Examples
///
/// ```rust,no_run
/// use file_validator::storage::{FileStorage, LocalFileStorage, UploadedFile};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = LocalFileStorage::new(PathBuf::from("./uploads"))?;
///
/// let file = UploadedFile::new("avatar.png", "image/png", vec![/* ... */]);
/// let stored = storage.store(&file).await?;
///
/// let retrieved = storage.retrieve(&stored.filename).await?;
/// assert_eq!(retrieved.data.len() as u64, stored.size);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persists `file` under its filename, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The filename cannot be mapped inside the storage root
    /// - The storage directory cannot be created
    /// - The destination cannot be created or written
    async fn store(&self, file: &UploadedFile) -> StorageResult<StoredFile>;

    /// Reads back a stored file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no file has that name, or an I/O
    /// error if reading fails.
    async fn retrieve(&self, filename: &str) -> StorageResult<RetrievedFile>;
}
