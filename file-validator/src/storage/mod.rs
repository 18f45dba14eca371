//! Upload validation and storage
//!
//! - [`policy`]: the limits an upload must satisfy
//! - [`validation`]: applies a policy to a file descriptor
//! - [`FileStorage`]: where accepted files are persisted
//! - [`LocalFileStorage`]: flat directory on local disk

mod local;
pub mod policy;
mod traits;
mod types;
pub mod validation;

pub(crate) use local::is_plain_filename;
pub use local::LocalFileStorage;
pub use policy::{PolicyBuilder, UploadPolicy};
#[cfg(test)]
pub use traits::MockFileStorage;
pub use traits::FileStorage;
pub use types::{RetrievedFile, StorageError, StorageResult, StoredFile, UploadedFile};
pub use validation::{FileValidator, ValidationRequest, ValidationResult, Violation};
