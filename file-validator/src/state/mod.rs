//! Application state shared by all handlers
//!
//! The state is immutable after startup; clones share the same `Arc`s.

use std::sync::Arc;

use crate::config::FileValidatorConfig;
use crate::storage::{FileStorage, FileValidator, LocalFileStorage, StorageResult};

/// Application state for the file validation service
///
/// Combines:
/// - Configuration
/// - The validator built from the configured policy
/// - The storage backend
///
/// # Example
///
/// ```rust,no_run
/// use file_validator::{config::FileValidatorConfig, state::AppState};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = AppState::new(FileValidatorConfig::default())?;
/// assert_eq!(state.config().service.port, 8080);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AppState {
    config: Arc<FileValidatorConfig>,
    validator: Arc<FileValidator>,
    storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Create state backed by local storage in `config.uploads.dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the uploads path exists and is not a directory.
    pub fn new(config: FileValidatorConfig) -> StorageResult<Self> {
        let storage = LocalFileStorage::new(config.uploads.dir.clone())?;
        Ok(Self::with_storage(config, Arc::new(storage)))
    }

    /// Create state with a custom storage backend
    #[must_use]
    pub fn with_storage(config: FileValidatorConfig, storage: Arc<dyn FileStorage>) -> Self {
        let validator = FileValidator::new(config.policy.clone());
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            storage,
        }
    }

    /// Configuration reference
    #[must_use]
    pub fn config(&self) -> &FileValidatorConfig {
        &self.config
    }

    /// Validator for the configured policy
    #[must_use]
    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Storage backend
    #[must_use]
    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PolicyBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_state_uses_configured_policy() {
        let temp = TempDir::new().unwrap();
        let mut config = FileValidatorConfig::default();
        config.uploads.dir = temp.path().join("uploads");
        config.policy = PolicyBuilder::new().max_file_size(42).build();

        let state = AppState::new(config).unwrap();
        assert_eq!(state.validator().policy().max_file_size(), 42);
    }

    #[test]
    fn test_state_rejects_file_as_uploads_dir() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("uploads");
        std::fs::write(&file_path, b"not a dir").unwrap();

        let mut config = FileValidatorConfig::default();
        config.uploads.dir = file_path;
        assert!(AppState::new(config).is_err());
    }

    #[test]
    fn test_clone_state() {
        let temp = TempDir::new().unwrap();
        let mut config = FileValidatorConfig::default();
        config.uploads.dir = temp.path().to_path_buf();

        let state = AppState::new(config).unwrap();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.validator, &cloned.validator));
    }
}
