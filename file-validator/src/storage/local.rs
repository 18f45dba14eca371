//! Local filesystem storage implementation

use super::traits::FileStorage;
use super::types::{RetrievedFile, StorageError, StorageResult, StoredFile, UploadedFile};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend
///
/// Files are written flat into the base directory under their uploaded
/// name:
///
/// ```text
/// ./uploads/
/// ├── cat.png
/// └── holiday.jpeg
/// ```
///
/// The base directory is created on the first store, so a missing directory
/// at startup is not an error. Writes go straight to the destination file;
/// a failed write leaves whatever bytes reached disk in place.
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
/// let file = UploadedFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]);
/// let stored = storage.store(&file).await?;
///
/// // File is now at ./uploads/photo.jpg
/// println!("Stored at: {}", stored.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Directory files are written into
    base_path: PathBuf,
}

impl LocalFileStorage {
    /// Creates a new local file storage instance
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if `base_path` exists but is not a
    /// directory.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        // Synchronous check is fine at startup
        if base_path.exists() && !base_path.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        Ok(Self { base_path })
    }

    /// Directory files are written into
    #[must_use]
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Maps a filename to its path inside the base directory
    ///
    /// Names containing path separators, or consisting only of `.`/`..`,
    /// could escape the base directory and are rejected.
    fn file_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if !is_plain_filename(filename) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }
        Ok(self.base_path.join(filename))
    }
}

/// True if `name` is a single, non-special path component
pub(crate) fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file: &UploadedFile) -> StorageResult<StoredFile> {
        let file_path = self.file_path(&file.filename)?;

        // Idempotent: an existing directory is not an error
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(StorageError::CreateDirectory)?;

        let mut f = fs::File::create(&file_path)
            .await
            .map_err(StorageError::CreateFile)?;
        f.write_all(&file.data).await.map_err(StorageError::Write)?;
        f.flush().await.map_err(StorageError::Write)?;

        Ok(StoredFile {
            filename: file.filename.clone(),
            size: file.size(),
            path: file_path,
        })
    }

    async fn retrieve(&self, filename: &str) -> StorageResult<RetrievedFile> {
        let file_path = self.file_path(filename)?;

        let data = match fs::read(&file_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(filename.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let modified = fs::metadata(&file_path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());

        Ok(RetrievedFile { data, modified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (LocalFileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().join("uploads")).unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let (storage, temp) = create_test_storage();

        let file = UploadedFile::new("cat.png", "image/png", b"not really a png".to_vec());

        let stored = storage.store(&file).await.unwrap();
        assert_eq!(stored.filename, "cat.png");
        assert_eq!(stored.size, 16);
        assert_eq!(stored.path, temp.path().join("uploads").join("cat.png"));

        let retrieved = storage.retrieve("cat.png").await.unwrap();
        assert_eq!(retrieved.data, b"not really a png");
        assert!(retrieved.modified.is_some());
    }

    #[tokio::test]
    async fn test_store_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("nested").join("uploads");
        let storage = LocalFileStorage::new(base.clone()).unwrap();
        assert!(!base.exists());

        let file = UploadedFile::new("a.gif", "image/gif", b"GIF89a".to_vec());
        storage.store(&file).await.unwrap();
        assert!(base.join("a.gif").exists());

        // A second store into the now existing directory still succeeds
        let file = UploadedFile::new("b.gif", "image/gif", b"GIF89a".to_vec());
        storage.store(&file).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let (storage, _temp) = create_test_storage();

        let first = UploadedFile::new("dup.jpg", "image/jpeg", b"first version, longer".to_vec());
        storage.store(&first).await.unwrap();

        let second = UploadedFile::new("dup.jpg", "image/jpeg", b"second".to_vec());
        storage.store(&second).await.unwrap();

        let retrieved = storage.retrieve("dup.jpg").await.unwrap();
        assert_eq!(retrieved.data, b"second");
    }

    #[tokio::test]
    async fn test_retrieve_nonexistent() {
        let (storage, _temp) = create_test_storage();

        let result = storage.retrieve("missing.png").await;
        assert!(matches!(result.unwrap_err(), StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_names_outside_base() {
        let (storage, temp) = create_test_storage();

        for name in ["../escape.png", "a/b.png", "..", ".", "", "c:\\x.png"] {
            let file = UploadedFile::new(name, "image/png", b"x".to_vec());
            let result = storage.store(&file).await;
            assert!(
                matches!(result, Err(StorageError::InvalidFilename(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(!temp.path().join("escape.png").exists());
    }

    #[tokio::test]
    async fn test_create_directory_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        // Parent is a regular file, so the uploads directory cannot be created
        let storage = LocalFileStorage::new(blocker.join("uploads")).unwrap();
        let file = UploadedFile::new("a.png", "image/png", b"x".to_vec());
        let result = storage.store(&file).await;
        assert!(matches!(result, Err(StorageError::CreateDirectory(_))));
    }

    #[test]
    fn test_invalid_base_path() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("not-a-directory");
        std::fs::write(&file_path, b"test").unwrap();

        let result = LocalFileStorage::new(file_path);
        assert!(matches!(result.unwrap_err(), StorageError::InvalidPath(_)));
    }
}
