//! Upload policy: the limits a file must satisfy to be accepted
//!
//! The default policy accepts common web image formats up to 10 MiB.
//!
//! # Examples
//!
//! ```rust
//! use file_validator::storage::policy::{PolicyBuilder, UploadPolicy};
//!
//! let policy = UploadPolicy::default();
//! assert_eq!(policy.max_file_size(), 10 * 1024 * 1024);
//!
//! let png_only = PolicyBuilder::new()
//!     .max_file_size(1024 * 1024)
//!     .allowed_extensions([".png"])
//!     .allowed_mime_types(["image/png"])
//!     .build();
//! assert!(png_only.allows_extension(".png"));
//! assert!(!png_only.allows_extension(".jpg"));
//! ```

use serde::{Deserialize, Serialize};

/// Default maximum file size (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extensions accepted by the default policy
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// MIME type prefixes accepted by the default policy
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Constraints applied to every file the service validates
///
/// Extensions are stored lower-cased with their leading dot and matched by
/// exact membership. MIME types are matched as prefixes of the declared
/// type, so parameters such as `; charset=binary` are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Maximum file size in bytes
    max_file_size: u64,

    /// Accepted extensions, including the leading dot
    allowed_extensions: Vec<String>,

    /// Accepted MIME type prefixes
    allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl UploadPolicy {
    /// Creates a new policy builder
    #[must_use]
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Returns the maximum allowed file size in bytes
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Returns the accepted extensions
    #[must_use]
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Returns the accepted MIME type prefixes
    #[must_use]
    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    /// Whether `size` is within the limit
    #[must_use]
    pub const fn allows_size(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    /// Whether `extension` (lower-cased, with leading dot) is an exact member
    /// of the allowed set
    ///
    /// ```rust
    /// use file_validator::storage::policy::UploadPolicy;
    ///
    /// let policy = UploadPolicy::default();
    /// assert!(policy.allows_extension(".jpeg"));
    /// assert!(!policy.allows_extension(".jp"));
    /// assert!(!policy.allows_extension(""));
    /// ```
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }

    /// Whether `mime_type` starts with one of the allowed prefixes
    ///
    /// ```rust
    /// use file_validator::storage::policy::UploadPolicy;
    ///
    /// let policy = UploadPolicy::default();
    /// assert!(policy.allows_mime_type("image/png"));
    /// assert!(policy.allows_mime_type("image/jpeg; charset=binary"));
    /// assert!(!policy.allows_mime_type("text/plain"));
    /// ```
    #[must_use]
    pub fn allows_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|prefix| mime_type.starts_with(prefix.as_str()))
    }

    /// Checks that every configured extension is well formed
    ///
    /// # Errors
    ///
    /// Returns a description of the first extension that is empty, lacks a
    /// leading dot, or contains upper-case characters.
    pub fn check(&self) -> Result<(), String> {
        for ext in &self.allowed_extensions {
            if ext.len() < 2 || !ext.starts_with('.') {
                return Err(format!("extension {ext:?} must start with '.'"));
            }
            if ext.to_lowercase() != *ext {
                return Err(format!("extension {ext:?} must be lower-case"));
            }
        }
        Ok(())
    }
}

/// Builder for upload policies
///
/// Unset fields keep the defaults of [`UploadPolicy::default`].
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    max_file_size: Option<u64>,
    allowed_extensions: Option<Vec<String>>,
    allowed_mime_types: Option<Vec<String>>,
}

impl PolicyBuilder {
    /// Creates a new policy builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum file size in bytes
    #[must_use]
    pub const fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = Some(size);
        self
    }

    /// Sets the accepted extensions; they are lower-cased on the way in
    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.into().to_lowercase())
                .collect(),
        );
        self
    }

    /// Sets the accepted MIME type prefixes
    #[must_use]
    pub fn allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the upload policy
    #[must_use]
    pub fn build(self) -> UploadPolicy {
        let defaults = UploadPolicy::default();
        UploadPolicy {
            max_file_size: self.max_file_size.unwrap_or(defaults.max_file_size),
            allowed_extensions: self
                .allowed_extensions
                .unwrap_or(defaults.allowed_extensions),
            allowed_mime_types: self
                .allowed_mime_types
                .unwrap_or(defaults.allowed_mime_types),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.max_file_size(), 10_485_760);
        assert_eq!(
            policy.allowed_extensions(),
            [".jpg", ".jpeg", ".png", ".gif", ".webp"]
        );
        assert_eq!(policy.allowed_mime_types().len(), 4);
        assert!(policy.check().is_ok());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_size(DEFAULT_MAX_FILE_SIZE));
        assert!(!policy.allows_size(DEFAULT_MAX_FILE_SIZE + 1));
        assert!(policy.allows_size(0));
    }

    #[test]
    fn test_extension_membership_is_exact() {
        let policy = UploadPolicy::default();
        // substrings of allowed entries must not match
        for partial in [".jp", ".pn", ".", "jpg", ".jpgx", ".webp.", ",.png"] {
            assert!(!policy.allows_extension(partial), "{partial} should not match");
        }
    }

    #[test]
    fn test_mime_prefix_match() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_mime_type("image/webp"));
        assert!(policy.allows_mime_type("image/gif;foo=bar"));
        assert!(!policy.allows_mime_type("image/svg+xml"));
        assert!(!policy.allows_mime_type(""));
        assert!(!policy.allows_mime_type("IMAGE/PNG"));
    }

    #[test]
    fn test_policy_builder() {
        let policy = PolicyBuilder::new()
            .max_file_size(5 * 1024 * 1024)
            .allowed_extensions([".PNG", ".bmp"])
            .build();

        assert_eq!(policy.max_file_size(), 5 * 1024 * 1024);
        assert_eq!(policy.allowed_extensions(), [".png", ".bmp"]);
        // untouched field keeps its default
        assert_eq!(policy.allowed_mime_types().len(), 4);
    }

    #[test]
    fn test_check_rejects_malformed_extensions() {
        let missing_dot = UploadPolicy::builder().allowed_extensions(["png"]).build();
        assert!(missing_dot.check().is_err());

        let bare_dot = UploadPolicy::builder().allowed_extensions(["."]).build();
        assert!(bare_dot.check().is_err());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: UploadPolicy = toml::from_str("max_file_size = 2048").unwrap();
        assert_eq!(policy.max_file_size(), 2048);
        assert_eq!(policy.allowed_extensions().len(), 5);
    }
}
