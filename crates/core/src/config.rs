//! Configuration management
//!
//! This module handles loading and saving the bucket catalog document.
//! The document is stored as JSON at `~/.s3deck/config.json`.
//!
//! Changes to SCHEMA_VERSION require migration support in `migrate`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bucket::BucketConfig;
use crate::error::{Error, Result};

/// Catalog document version written by this build
///
/// Files written before the field existed carry no version and load as 1.
pub const SCHEMA_VERSION: u32 = 1;

/// Directory name under the user's home directory
const APP_DIR: &str = ".s3deck";

/// File name of the catalog document
const CONFIG_FILE: &str = "config.json";

/// Persisted catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document format version
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Configured buckets
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            buckets: Vec::new(),
        }
    }
}

/// Reads and writes the catalog document
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `~/.s3deck/config.json`
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        let config_path = home_dir.join(APP_DIR).join(CONFIG_FILE);
        Ok(Self { config_path })
    }

    /// Manager for an explicit document path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Location of the catalog document
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Read the catalog document
    ///
    /// A missing file reads as an empty catalog and is not created.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = serde_json::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Load configuration, writing an empty document on first run
    pub fn load_or_init(&self) -> Result<Config> {
        if self.config_path.exists() {
            return self.load();
        }

        let config = Config::default();
        self.save(&config)?;
        tracing::info!(path = %self.config_path.display(), "Created empty bucket catalog");
        Ok(config)
    }

    /// Write the whole document, pretty printed
    ///
    /// The parent directory is created on demand and the file is made
    /// readable by its owner only.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        // The catalog holds secret keys
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Bring an older document up to SCHEMA_VERSION
    fn migrate(&self, mut config: Config) -> Result<Config> {
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("s3deck").join("config.json");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert!(config.buckets.is_empty());
    }

    #[test]
    fn test_default_path_is_under_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let manager = ConfigManager::new().unwrap();
        assert_eq!(
            manager.config_path(),
            &home.join(".s3deck").join("config.json")
        );
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert!(config.buckets.is_empty());
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load_or_init().unwrap();
        assert!(config.buckets.is_empty());
        assert!(manager.config_path().exists());

        let content = std::fs::read_to_string(manager.config_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["buckets"], serde_json::json!([]));
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = temp_config_manager();

        let mut config = Config::default();
        config.buckets.push(BucketConfig {
            id: "a1b2c3d4".to_string(),
            name: "photos".to_string(),
            display_name: "Photos".to_string(),
            region: "us-east-1".to_string(),
            access_key: "AKIA".to_string(),
            secret_key: "secret".to_string(),
            endpoint: None,
        });

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.buckets.len(), 1);
        assert_eq!(loaded.buckets[0].id, "a1b2c3d4");
        assert_eq!(loaded.buckets[0].display_name, "Photos");
    }

    #[test]
    fn test_load_legacy_document_without_version() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::create_dir_all(manager.config_path().parent().unwrap()).unwrap();
        let content = r#"{
            "buckets": [{
                "id": "0f1e2d3c",
                "name": "logs",
                "displayName": "logs",
                "region": "eu-west-1",
                "accessKey": "ak",
                "secretKey": "sk",
                "endpoint": "http://localhost:9000"
            }]
        }"#;
        std::fs::write(manager.config_path(), content).unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.buckets[0].region, "eu-west-1");
        assert_eq!(
            config.buckets[0].endpoint.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::create_dir_all(manager.config_path().parent().unwrap()).unwrap();
        let content = format!(
            r#"{{"schemaVersion": {}, "buckets": []}}"#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("newer than supported")
        );
    }

    #[test]
    fn test_load_corrupt_document_fails() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::create_dir_all(manager.config_path().parent().unwrap()).unwrap();
        std::fs::write(manager.config_path(), "{ not json").unwrap();

        assert!(matches!(manager.load(), Err(Error::Json(_))));
    }
}
