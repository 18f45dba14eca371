//! File validation against an [`UploadPolicy`]
//!
//! Validation looks only at the descriptor a client supplies (name, size and
//! declared MIME type). File contents are never inspected.
//!
//! Every rule is evaluated; violations are collected in a fixed order
//! (size, extension, MIME) rather than stopping at the first failure.
//!
//! # Examples
//!
//! ```rust
//! use file_validator::storage::validation::{FileValidator, ValidationRequest};
//!
//! let validator = FileValidator::default();
//!
//! let ok = validator.validate(&ValidationRequest::new("cat.PNG", 2048, "image/png"));
//! assert!(ok.valid);
//! assert!(ok.errors.is_empty());
//!
//! let bad = validator.validate(&ValidationRequest::new("notes.txt", 100, "text/plain"));
//! assert!(!bad.valid);
//! assert_eq!(bad.errors.len(), 2);
//! ```

use serde::{de, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::policy::UploadPolicy;

/// Message attached to an accepted file
pub const VALID_MESSAGE: &str = "File is valid";

/// Message attached to a rejected file
pub const INVALID_MESSAGE: &str = "File validation failed";

/// Descriptor of a file to validate
///
/// Fields missing from a JSON body take their zero value, so `{}` decodes to
/// an empty name, size 0 and an empty MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationRequest {
    /// Client-supplied filename
    pub filename: String,

    /// Size in bytes
    pub size: u64,

    /// Declared MIME type
    pub mime_type: String,
}

impl ValidationRequest {
    /// Creates a new validation request
    #[must_use]
    pub fn new(filename: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    /// Lower-cased extension of the filename, including the dot
    #[must_use]
    pub fn extension(&self) -> String {
        extension_of(&self.filename)
    }

    /// Decodes the first JSON value in `body`
    ///
    /// Decoding is lenient in the way browser clients expect:
    /// - anything after the first value is ignored
    /// - keys match case-insensitively (`MimeType`, `mimetype`, `FILENAME`)
    /// - `null`, for the whole body or a single field, means "zero value"
    ///
    /// # Errors
    ///
    /// Returns an error if the body is empty, is not a JSON object, or a
    /// field has the wrong type.
    ///
    /// ```rust
    /// use file_validator::storage::ValidationRequest;
    ///
    /// let request = ValidationRequest::from_json(br#"{"FileName":"a.png","size":1} trailing"#)?;
    /// assert_eq!(request.filename, "a.png");
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        let value = serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next()
            .unwrap_or_else(|| Err(de::Error::custom("empty request body")))?;

        let fields = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(fields) => fields,
            other => {
                return Err(de::Error::custom(format!(
                    "expected a JSON object, found {other}"
                )))
            }
        };

        let fields: Map<String, Value> = fields
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(key, v)| (canonical_key(key), v))
            .collect();

        serde_json::from_value(Value::Object(fields))
    }
}

/// Maps a key to its wire spelling if it names a known field
fn canonical_key(key: String) -> String {
    match key.to_lowercase().as_str() {
        "filename" => "filename".to_string(),
        "size" => "size".to_string(),
        "mimetype" => "mimeType".to_string(),
        _ => key,
    }
}

/// Outcome of validating a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the file satisfied every rule
    pub valid: bool,

    /// Human-readable summary
    pub message: String,

    /// One entry per violated rule
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// An accepting result with no errors
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
            errors: Vec::new(),
        }
    }

    /// A rejecting result carrying the given violations
    #[must_use]
    pub fn rejected(violations: &[Violation]) -> Self {
        Self {
            valid: false,
            message: INVALID_MESSAGE.to_string(),
            errors: violations.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// File is larger than the policy allows
    FileTooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        max: u64,
    },

    /// Extension is not in the allowed set
    ExtensionNotAllowed {
        /// Lower-cased extension (possibly empty)
        extension: String,
        /// Allowed extensions
        allowed: Vec<String>,
    },

    /// Declared MIME type matches no allowed prefix
    MimeTypeNotAllowed {
        /// Declared MIME type
        mime_type: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { size, max } => write!(
                f,
                "File size {size} bytes exceeds maximum allowed size of {max} bytes"
            ),
            Self::ExtensionNotAllowed { extension, allowed } => write!(
                f,
                "File extension {extension} not allowed. Allowed: {}",
                allowed.join(",")
            ),
            Self::MimeTypeNotAllowed { mime_type } => {
                write!(f, "MIME type {mime_type} not allowed")
            }
        }
    }
}

/// Applies an [`UploadPolicy`] to file descriptors
#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    policy: UploadPolicy,
}

impl FileValidator {
    /// Creates a validator for the given policy
    #[must_use]
    pub const fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    /// The policy this validator enforces
    #[must_use]
    pub const fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Lists every rule `request` breaks, in size, extension, MIME order
    #[must_use]
    pub fn violations(&self, request: &ValidationRequest) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !self.policy.allows_size(request.size) {
            violations.push(Violation::FileTooLarge {
                size: request.size,
                max: self.policy.max_file_size(),
            });
        }

        let extension = request.extension();
        if !self.policy.allows_extension(&extension) {
            violations.push(Violation::ExtensionNotAllowed {
                extension,
                allowed: self.policy.allowed_extensions().to_vec(),
            });
        }

        if !self.policy.allows_mime_type(&request.mime_type) {
            violations.push(Violation::MimeTypeNotAllowed {
                mime_type: request.mime_type.clone(),
            });
        }

        violations
    }

    /// Validates `request`, producing the result returned to clients
    #[must_use]
    pub fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        let violations = self.violations(request);
        if violations.is_empty() {
            ValidationResult::accepted()
        } else {
            ValidationResult::rejected(&violations)
        }
    }
}

/// Returns the lower-cased extension of `filename`, including the dot
///
/// Only the final path component is considered. A name without a dot in its
/// final component has no extension and yields an empty string.
///
/// ```rust
/// use file_validator::storage::validation::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), ".jpg");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("README"), "");
/// assert_eq!(extension_of("dir.d/README"), "");
/// ```
#[must_use]
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    name.rfind('.')
        .map_or_else(String::new, |idx| name[idx..].to_lowercase())
}
