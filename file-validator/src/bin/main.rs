//! file-validator server binary
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:8080, files stored in ./uploads
//! file-validator
//!
//! # Explicit config file and overrides
//! file-validator --config /etc/file-validator/config.toml --port 9000
//! PORT=9000 file-validator --uploads-dir /var/lib/uploads
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use file_validator::{config::FileValidatorConfig, observability, server};

#[derive(Debug, Parser)]
#[command(name = "file-validator")]
#[command(version)]
#[command(about = "Validates image uploads and stores accepted files", long_about = None)]
struct Cli {
    /// Configuration file (replaces ./config.toml)
    #[arg(short, long, env = "FILE_VALIDATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory accepted uploads are written into
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut FileValidatorConfig) {
        if let Some(host) = self.host {
            config.service.host = host;
        }
        if let Some(port) = self.port {
            config.service.port = port;
        }
        if let Some(dir) = self.uploads_dir {
            config.uploads.dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = FileValidatorConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    observability::init()?;
    tracing::debug!(?config, "configuration loaded");

    server::serve(config).await
}
