//! ObjectStore trait definition
//!
//! This trait defines the interface for the S3-compatible storage operations
//! the sidecar needs. It keeps the gateway logic decoupled from the SDK so it
//! can be exercised against mocks and in-memory fakes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketConfig;
use crate::error::Result;

/// Delimiter used to simulate folders
pub const DELIMITER: &str = "/";

/// One object as returned by a list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key
    pub key: String,

    /// Size in bytes
    pub size: i64,

    /// Last modified timestamp
    pub last_modified: Option<Timestamp>,
}

impl ObjectEntry {
    /// Create a new entry without a timestamp
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }
}

/// One page of a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// One-level sub-prefixes, in provider order
    pub common_prefixes: Vec<String>,

    /// Objects, in provider order
    pub objects: Vec<ObjectEntry>,

    /// Continuation token when the listing is truncated
    pub next_token: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Whether to list recursively (no delimiter)
    pub recursive: bool,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

impl ListOptions {
    /// One-level listing under `prefix`
    pub fn delimited(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            ..Default::default()
        }
    }

    /// Recursive listing of every key under `prefix`
    pub fn recursive(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            recursive: true,
            ..Default::default()
        }
    }
}

/// Metadata returned by a head call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<Timestamp>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
    pub storage_class: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Storage operations against one configured bucket
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects
    async fn list_objects(&self, options: &ListOptions) -> Result<ListPage>;

    /// Get object metadata
    async fn head_object(&self, key: &str) -> Result<ObjectInfo>;

    /// Store an object
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Delete a single object
    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Delete up to 1000 objects, returning the keys actually deleted
    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>>;

    /// Server-side copy, replacing the content type
    async fn copy_object(&self, src_key: &str, dst_key: &str, content_type: &str) -> Result<()>;
}

/// Builds an [`ObjectStore`] for a catalog entry
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, bucket: &BucketConfig) -> Result<Arc<dyn ObjectStore>>;
}
