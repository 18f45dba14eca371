//! file-validator: image upload validation service
//!
//! A small HTTP service that checks a file's name, size and declared MIME
//! type against an upload policy, and stores files that pass on local disk.
//!
//! # Endpoints
//!
//! - `/health`, any method: liveness check
//! - `POST /validate`: validate a JSON descriptor `{filename, size, mimeType}`
//! - `POST /upload`: validate and store a multipart upload (`file` field)
//! - `GET /uploads/{filename}`: read back a stored upload
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use file_validator::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = FileValidatorConfig::load(None)?;
//!     file_validator::observability::init()?;
//!     file_validator::server::serve(config).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;
pub mod storage;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use file_validator::prelude::*;
    //! ```

    pub use crate::config::FileValidatorConfig;
    pub use crate::error::ApiError;
    pub use crate::extractors::{FileUpload, FileUploadError};
    pub use crate::handlers::UploadResponse;
    pub use crate::health::HealthResponse;
    pub use crate::server::{router, serve};
    pub use crate::state::AppState;
    pub use crate::storage::{
        FileStorage, FileValidator, LocalFileStorage, PolicyBuilder, StorageError, StoredFile,
        UploadPolicy, UploadedFile, ValidationRequest, ValidationResult,
    };
}
