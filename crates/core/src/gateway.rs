//! Object gateway
//!
//! Orchestrates the storage calls behind each HTTP operation for one bucket
//! and shapes the results the desktop UI consumes. Everything here is
//! SDK-independent and runs against any [`ObjectStore`].

use std::collections::HashMap;
use std::sync::Arc;

use humansize::FormatSizeOptions;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keymap::{content_type_for, is_valid_name};
use crate::listing::{FileItem, translate};
use crate::traits::{ListOptions, ListPage, ObjectStore};
use crate::upload::{UploadReport, UploadRequest, upload_paths};

/// Largest key batch accepted by a single multi-object delete
pub const MAX_DELETE_BATCH: usize = 1000;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Response of a single-object upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    pub message: String,
    pub key: String,
    pub size: u64,
}

/// Response of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,

    /// Number of objects removed, folders only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Head-object metadata with display helpers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub key: String,
    pub content_type: Option<String>,
    pub content_length: i64,
    pub last_modified: Option<Timestamp>,
    pub etag: Option<String>,
    pub storage_class: Option<String>,
    pub metadata: HashMap<String, String>,
    pub size_formatted: String,
    pub last_modified_formatted: Option<String>,
}

/// Body of a rename request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameRequest {
    pub bucket: String,
    pub old_key: String,
    pub new_key: String,
    pub is_folder: bool,
}

impl RenameRequest {
    /// Check ids, keys and the new leaf name
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(Error::missing("bucket ID"));
        }
        if self.old_key.is_empty() {
            return Err(Error::missing("object key"));
        }
        if self.new_key.is_empty() {
            return Err(Error::missing("new key"));
        }
        if !is_valid_name(leaf_name(&self.new_key)) {
            return Err(Error::Validation(
                "Invalid filename: contains invalid characters or reserved names".into(),
            ));
        }
        if self.old_key.trim_end_matches('/') == self.new_key.trim_end_matches('/') {
            return Err(Error::Validation(
                "New name must be different from the current name".into(),
            ));
        }
        Ok(())
    }
}

/// Response of a rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub message: String,
    pub old_key: String,
    pub new_key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_files: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_files: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_moved: Option<usize>,
}

/// Storage operations for one configured bucket
#[derive(Clone)]
pub struct ObjectGateway {
    store: Arc<dyn ObjectStore>,
}

impl ObjectGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// One-level listing of folders and files under `prefix`
    pub async fn list(&self, prefix: &str) -> Result<Vec<FileItem>> {
        tracing::debug!(prefix = %prefix, "Listing objects");
        let page = self.list_all(ListOptions::delimited(Some(prefix))).await?;
        Ok(translate(prefix, &page.common_prefixes, &page.objects))
    }

    /// Store one object, deriving the content type from the key
    pub async fn upload_bytes(&self, key: &str, data: Vec<u8>) -> Result<UploadedObject> {
        if key.is_empty() {
            return Err(Error::missing("object key"));
        }

        let size = data.len() as u64;
        let content_type = content_type_for(key);
        self.store
            .put_object(key, data, &content_type)
            .await
            .map_err(|e| Error::Upstream(format!("failed to upload file: {e}")))?;

        Ok(UploadedObject {
            message: "File uploaded successfully".into(),
            key: key.to_string(),
            size,
        })
    }

    /// Upload local files and directories
    pub async fn upload_paths(&self, request: &UploadRequest) -> UploadReport {
        upload_paths(self.store.as_ref(), request).await
    }

    /// Delete one object, or every object under a key ending in `/`
    pub async fn delete(&self, key: &str) -> Result<DeleteResponse> {
        if key.is_empty() {
            return Err(Error::missing("object key"));
        }

        if !key.ends_with('/') {
            self.store
                .delete_object(key)
                .await
                .map_err(|e| Error::Upstream(format!("failed to delete object: {e}")))?;
            return Ok(DeleteResponse {
                message: "Object deleted successfully".into(),
                key: key.to_string(),
                count: None,
            });
        }

        let count = self.delete_prefix(key).await?;
        tracing::info!(prefix = %key, count, "Deleted folder");
        Ok(DeleteResponse {
            message: "Folder deleted successfully".into(),
            key: key.to_string(),
            count: Some(count),
        })
    }

    /// Head-object metadata with formatted size and time
    pub async fn metadata(&self, key: &str) -> Result<ObjectMetadata> {
        if key.is_empty() {
            return Err(Error::missing("object key"));
        }

        let info = self.store.head_object(key).await?;
        Ok(ObjectMetadata {
            key: key.to_string(),
            size_formatted: format_size(info.size),
            last_modified_formatted: info
                .last_modified
                .map(|ts| ts.strftime(TIME_FORMAT).to_string()),
            content_type: info.content_type,
            content_length: info.size,
            last_modified: info.last_modified,
            etag: info.etag.map(|e| e.trim_matches('"').to_string()),
            storage_class: info.storage_class,
            metadata: info.metadata,
        })
    }

    /// Create an empty folder marker, returning its key
    pub async fn create_folder(&self, path: &str) -> Result<String> {
        let folder = path.trim_end_matches('/');
        if folder.is_empty() {
            return Err(Error::missing("path"));
        }
        if !is_valid_name(leaf_name(folder)) {
            return Err(Error::Validation(format!("Invalid folder name: {folder}")));
        }

        let marker = format!("{folder}/");
        self.store
            .put_object(&marker, Vec::new(), &content_type_for(&marker))
            .await?;
        tracing::info!(key = %marker, "Created folder");
        Ok(marker)
    }

    /// Rename a file, or move every object under a folder
    pub async fn rename(&self, request: &RenameRequest) -> Result<RenameResponse> {
        request.validate()?;
        if request.is_folder {
            self.rename_folder(&request.old_key, &request.new_key).await
        } else {
            self.rename_file(&request.old_key, &request.new_key).await
        }
    }

    /// Newest modification time of any object under the folder `key`
    pub async fn folder_latest_modified(&self, key: &str) -> Result<Option<Timestamp>> {
        if key.is_empty() {
            return Err(Error::missing("object key"));
        }

        let page = self
            .list_all(ListOptions::recursive(&folder_prefix(key)))
            .await?;
        Ok(page.objects.iter().filter_map(|o| o.last_modified).max())
    }

    async fn rename_file(&self, old_key: &str, new_key: &str) -> Result<RenameResponse> {
        self.store.head_object(old_key).await?;
        self.store
            .copy_object(old_key, new_key, &content_type_for(new_key))
            .await?;
        self.store.delete_object(old_key).await?;

        tracing::info!(from = %old_key, to = %new_key, "Renamed file");
        Ok(RenameResponse {
            message: format!(
                "File renamed from '{}' to '{}'",
                leaf_name(old_key),
                leaf_name(new_key)
            ),
            old_key: old_key.to_string(),
            new_key: new_key.to_string(),
            moved_files: None,
            failed_files: None,
            total_moved: None,
        })
    }

    async fn rename_folder(&self, old_key: &str, new_key: &str) -> Result<RenameResponse> {
        let old_prefix = folder_prefix(old_key);
        let new_prefix = folder_prefix(new_key);

        let keys = self.list_keys(&old_prefix).await?;
        if keys.is_empty() {
            return Err(Error::NotFound(format!("folder {old_prefix}")));
        }

        let mut moved = Vec::new();
        let mut failed = Vec::new();
        for key in keys {
            let relative = key.strip_prefix(&old_prefix).unwrap_or(&key);
            let target = format!("{new_prefix}{relative}");
            match self.move_object(&key, &target).await {
                Ok(()) => moved.push(format!("{key} -> {target}")),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to move object");
                    failed.push(key);
                }
            }
        }

        let from = leaf_name(&old_prefix);
        let to = leaf_name(&new_prefix);
        let message = if failed.is_empty() {
            format!(
                "Folder renamed from '{from}' to '{to}'. Moved {} files.",
                moved.len()
            )
        } else {
            format!(
                "Folder partially renamed from '{from}' to '{to}'. Moved {} files, {} failed.",
                moved.len(),
                failed.len()
            )
        };
        tracing::info!(from = %old_prefix, to = %new_prefix, moved = moved.len(), failed = failed.len(), "Renamed folder");

        Ok(RenameResponse {
            message,
            old_key: old_prefix.trim_end_matches('/').to_string(),
            new_key: new_prefix.trim_end_matches('/').to_string(),
            total_moved: Some(moved.len()),
            moved_files: Some(moved),
            failed_files: (!failed.is_empty()).then_some(failed),
        })
    }

    async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        self.store
            .copy_object(from, to, &content_type_for(to))
            .await?;
        self.store.delete_object(from).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.list_keys(prefix).await?;

        let mut deleted = 0;
        let mut failed = 0;
        let mut first_error = None;
        for chunk in keys.chunks(MAX_DELETE_BATCH) {
            match self.store.delete_objects(chunk.to_vec()).await {
                Ok(done) => {
                    deleted += done.len();
                    failed += chunk.len().saturating_sub(done.len());
                }
                Err(e) => {
                    tracing::warn!(prefix = %prefix, keys = chunk.len(), error = %e, "Batch delete failed");
                    failed += chunk.len();
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match (failed, first_error) {
            (0, _) => Ok(deleted),
            (_, Some(e)) if deleted == 0 => Err(e),
            _ => {
                tracing::warn!(prefix = %prefix, deleted, failed, "Folder only partially deleted");
                Err(Error::PartialBatch {
                    context: format!("Failed to delete folder {prefix}"),
                    succeeded: deleted,
                    failed,
                })
            }
        }
    }

    /// Every key under `prefix`, across all pages
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let page = self.list_all(ListOptions::recursive(prefix)).await?;
        Ok(page.objects.into_iter().map(|o| o.key).collect())
    }

    /// Follow continuation tokens and merge every page
    async fn list_all(&self, mut options: ListOptions) -> Result<ListPage> {
        let mut merged = ListPage::default();
        loop {
            let page = self.store.list_objects(&options).await?;
            merged.common_prefixes.extend(page.common_prefixes);
            merged.objects.extend(page.objects);

            match page.next_token {
                Some(token) if options.continuation_token.as_deref() != Some(token.as_str()) => {
                    options.continuation_token = Some(token);
                }
                _ => break,
            }
        }
        Ok(merged)
    }
}

/// Size with 1024-based units and one decimal, e.g. "1.5 KB"
fn format_size(size: i64) -> String {
    let bytes = size.max(0) as u64;
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let options = FormatSizeOptions::from(humansize::WINDOWS)
        .decimal_places(1)
        .decimal_zeroes(1);
    humansize::format_size(bytes, options).replace("kB", "KB")
}

fn folder_prefix(key: &str) -> String {
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{key}/")
    }
}

/// Last non-empty path segment of a key
fn leaf_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
