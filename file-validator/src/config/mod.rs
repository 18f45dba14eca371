//! Configuration management for the file validation service
//!
//! Configuration is loaded from multiple sources with clear precedence
//! (highest first):
//!
//! 1. Command-line flags (applied by the binary)
//! 2. `PORT` environment variable
//! 3. Environment variables (`FILE_VALIDATOR_` prefix, `__` for nesting)
//! 4. `./config.toml`, or the file passed with `--config`
//! 5. `~/.config/file-validator/config.toml` (user config, XDG)
//! 6. `/etc/file-validator/config.toml` (system config)
//! 7. Hardcoded defaults
//!
//! Environment variable format: `FILE_VALIDATOR_SECTION__FIELD_NAME`
//! - Example: `FILE_VALIDATOR_POLICY__MAX_FILE_SIZE=5242880`
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [service]
//! name = "ScamShield File Validator"
//! host = "0.0.0.0"
//! port = 8080
//!
//! [uploads]
//! dir = "./uploads"
//! url_prefix = "/uploads"
//! form_memory_limit = 33554432
//! serve_files = true
//!
//! [policy]
//! max_file_size = 10485760
//! allowed_extensions = [".jpg", ".jpeg", ".png", ".gif", ".webp"]
//! allowed_mime_types = ["image/jpeg", "image/png", "image/gif", "image/webp"]
//! ```

use anyhow::Context;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::UploadPolicy;

/// Directory name used for XDG and system config lookups
pub const CONFIG_DIR_NAME: &str = "file-validator";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "FILE_VALIDATOR_";

/// Default service name reported by the health endpoint
pub const DEFAULT_SERVICE_NAME: &str = "ScamShield File Validator";

/// Listener and identity settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name reported by `GET /health`
    pub name: String,

    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServiceSettings {
    /// `host:port` string suitable for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where and how accepted uploads are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory accepted files are written into
    pub dir: PathBuf,

    /// Public URL prefix under which stored files are reported
    pub url_prefix: String,

    /// Maximum multipart request body accepted by `POST /upload`, in bytes
    pub form_memory_limit: usize,

    /// Serve stored files at `GET {url_prefix}/{filename}`
    pub serve_files: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./uploads"),
            url_prefix: "/uploads".to_string(),
            form_memory_limit: 32 * 1024 * 1024, // 32 MiB
            serve_files: true,
        }
    }
}

impl UploadSettings {
    /// Public URL of a stored file
    ///
    /// ```rust
    /// use file_validator::config::UploadSettings;
    ///
    /// let uploads = UploadSettings::default();
    /// assert_eq!(uploads.url_for("cat.png"), "/uploads/cat.png");
    /// ```
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.url_prefix.trim_end_matches('/'))
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidatorConfig {
    /// Listener settings
    #[serde(default)]
    pub service: ServiceSettings,

    /// Storage settings
    #[serde(default)]
    pub uploads: UploadSettings,

    /// Validation policy
    #[serde(default)]
    pub policy: UploadPolicy,
}

impl FileValidatorConfig {
    /// Builds the layered figment without extracting it
    ///
    /// `config_path` replaces the default `./config.toml` lookup. A path that
    /// does not exist contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the default configuration cannot be serialized.
    pub fn figment(config_path: Option<&Path>) -> anyhow::Result<Figment> {
        let mut figment = Figment::new()
            // 7. Defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 6. System config
        let system_config = PathBuf::from("/etc")
            .join(CONFIG_DIR_NAME)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 5. User config
        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        // 4. Local or explicit config
        let local_config = config_path.map_or_else(|| PathBuf::from("./config.toml"), Path::to_path_buf);
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 3. Prefixed environment variables (double underscore for nesting)
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        // 2. Bare PORT; an empty value means "use the default"
        if std::env::var("PORT").is_ok_and(|port| !port.is_empty()) {
            figment = figment.merge(Env::raw().only(&["PORT"]).map(|_| "service.port".into()));
        }

        Ok(figment)
    }

    /// Loads and validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A configuration file contains invalid TOML
    /// - A value has the wrong type (for example a non-numeric `PORT`)
    /// - The merged configuration fails [`FileValidatorConfig::validate`]
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use file_validator::config::FileValidatorConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = FileValidatorConfig::load(None)?;
    /// println!("listening on {}", config.service.bind_address());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config: Self = Self::figment(config_path)?
            .extract()
            .context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work
    ///
    /// # Errors
    ///
    /// Returns an error if the port is zero, the form limit is zero, the URL
    /// prefix does not start with `/`, or the policy lists a malformed
    /// extension.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service.port == 0 {
            anyhow::bail!("service.port must be non-zero");
        }
        if self.uploads.form_memory_limit == 0 {
            anyhow::bail!("uploads.form_memory_limit must be non-zero");
        }
        if !self.uploads.url_prefix.starts_with('/') {
            anyhow::bail!(
                "uploads.url_prefix must start with '/', got {:?}",
                self.uploads.url_prefix
            );
        }
        self.policy
            .check()
            .map_err(|e| anyhow::anyhow!("invalid policy: {e}"))?;
        Ok(())
    }

    /// Recommended XDG config path
    ///
    /// # Example
    ///
    /// ```rust
    /// use file_validator::config::FileValidatorConfig;
    ///
    /// let path = FileValidatorConfig::recommended_path();
    /// // Returns: ~/.config/file-validator/config.toml
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| config_dir.join(CONFIG_DIR_NAME).join("config.toml"),
        )
    }
}
