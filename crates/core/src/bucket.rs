//! Bucket catalog
//!
//! A bucket entry is a named reference to one bucket at an S3-compatible
//! provider, including the credentials used to reach it. The catalog keeps
//! the entries in memory and persists the whole document on every mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, ConfigManager};
use crate::error::{Error, Result};

/// A configured bucket and its credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    /// Opaque catalog id, assigned on add
    #[serde(default)]
    pub id: String,

    /// Bucket name at the provider
    #[serde(default)]
    pub name: String,

    /// Label shown in the desktop UI
    #[serde(default)]
    pub display_name: String,

    /// Provider region
    #[serde(default)]
    pub region: String,

    /// Access key ID
    #[serde(default)]
    pub access_key: String,

    /// Secret access key
    #[serde(default)]
    pub secret_key: String,

    /// Custom endpoint for non-AWS providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl BucketConfig {
    /// Create a new entry with required fields
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Check required fields and normalize optional ones
    ///
    /// An empty display name falls back to the bucket name and an empty
    /// endpoint is treated as absent.
    pub fn validate(&mut self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("region", &self.region),
            ("accessKey", &self.access_key),
            ("secretKey", &self.secret_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if self.display_name.trim().is_empty() {
            self.display_name = self.name.clone();
        }

        match self.endpoint.as_deref().map(str::trim) {
            Some("") => self.endpoint = None,
            Some(endpoint) => {
                url::Url::parse(endpoint)?;
            }
            None => {}
        }

        Ok(())
    }
}

/// In-memory bucket catalog backed by the config document
#[derive(Debug)]
pub struct BucketCatalog {
    manager: ConfigManager,
    config: Config,
}

impl BucketCatalog {
    /// Open the catalog, creating an empty document on first run
    pub fn open(manager: ConfigManager) -> Result<Self> {
        let config = manager.load_or_init()?;
        Ok(Self { manager, config })
    }

    /// Path of the backing document
    pub fn config_path(&self) -> &std::path::Path {
        self.manager.config_path()
    }

    /// List all configured buckets
    pub fn list(&self) -> &[BucketConfig] {
        &self.config.buckets
    }

    /// Find a bucket by id
    pub fn find(&self, id: &str) -> Option<&BucketConfig> {
        self.config.buckets.iter().find(|b| b.id == id)
    }

    /// Validate and add a bucket under a freshly generated id
    pub fn add(&mut self, mut bucket: BucketConfig) -> Result<BucketConfig> {
        bucket.validate()?;
        bucket.id = self.fresh_id();

        let mut next = self.config.clone();
        next.buckets.push(bucket.clone());
        self.commit(next)?;

        tracing::info!(id = %bucket.id, name = %bucket.name, "Added bucket configuration");
        Ok(bucket)
    }

    /// Replace the bucket carrying the same id
    pub fn update(&mut self, mut bucket: BucketConfig) -> Result<BucketConfig> {
        if bucket.id.is_empty() {
            return Err(Error::missing("bucket ID"));
        }
        bucket.validate()?;

        let mut next = self.config.clone();
        let slot = next
            .buckets
            .iter_mut()
            .find(|b| b.id == bucket.id)
            .ok_or_else(|| Error::NotFound(format!("bucket with ID {}", bucket.id)))?;
        *slot = bucket.clone();
        self.commit(next)?;

        tracing::info!(id = %bucket.id, "Updated bucket configuration");
        Ok(bucket)
    }

    /// Remove a bucket by id
    pub fn remove(&mut self, id: &str) -> Result<BucketConfig> {
        let mut next = self.config.clone();
        let pos = next
            .buckets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Error::NotFound(format!("bucket with ID {id}")))?;
        let removed = next.buckets.remove(pos);
        self.commit(next)?;

        tracing::info!(id = %id, "Removed bucket configuration");
        Ok(removed)
    }

    /// Persist `next` and only then make it the in-memory state
    fn commit(&mut self, next: Config) -> Result<()> {
        self.manager.save(&next)?;
        self.config = next;
        Ok(())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if self.find(&id).is_none() {
                return id;
            }
        }
    }
}
