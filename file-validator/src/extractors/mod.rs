//! Request extractors

pub mod file_upload;

pub use file_upload::{FileUpload, FileUploadError, FILE_FIELD};
