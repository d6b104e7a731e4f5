//! Command-line and environment configuration

use std::path::PathBuf;

use clap::Parser;
use deck_core::{ConfigManager, Result};

/// s3deck - local HTTP sidecar for S3-compatible object storage
///
/// Serves the bucket catalog and object operations to the desktop UI.
#[derive(Parser, Debug, Clone)]
#[command(name = "s3deck")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "S3DECK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "S3DECK_PORT", default_value_t = 8082)]
    pub port: u16,

    /// Catalog file, instead of the per-user default
    #[arg(long, env = "S3DECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "S3DECK_MAX_UPLOAD_MB", default_value_t = 512)]
    pub max_upload_mb: usize,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

impl Args {
    /// Socket address string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body limit in bytes
    pub fn body_limit(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Config manager for the chosen catalog location
    pub fn config_manager(&self) -> Result<ConfigManager> {
        match &self.config {
            Some(path) => Ok(ConfigManager::with_path(path.clone())),
            None => ConfigManager::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["s3deck"]).unwrap();
        assert_eq!(args.addr(), "127.0.0.1:8082");
        assert_eq!(args.body_limit(), 512 * 1024 * 1024);
        assert!(!args.debug);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "s3deck",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--config",
            "/tmp/catalog.json",
            "--debug",
        ])
        .unwrap();

        assert_eq!(args.addr(), "0.0.0.0:9000");
        assert!(args.debug);
        let manager = args.config_manager().unwrap();
        assert_eq!(manager.config_path(), &PathBuf::from("/tmp/catalog.json"));
    }

    #[test]
    fn test_invalid_port() {
        assert!(Args::try_parse_from(["s3deck", "--port", "not-a-port"]).is_err());
    }
}
