//! Listing translation
//!
//! Turns the flat result of a delimiter listing (common prefixes plus object
//! keys) into the one-level "folders and files" view the desktop UI renders.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::traits::ObjectEntry;

/// A file or folder relative to the listed prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    /// Full remote key
    pub key: String,

    /// Leaf name with the query prefix removed
    pub name: String,

    /// Size in bytes, 0 for folders
    pub size: i64,

    pub is_folder: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl FileItem {
    fn folder(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            size: 0,
            is_folder: true,
            last_modified: None,
        }
    }

    fn file(entry: &ObjectEntry, name: &str) -> Self {
        Self {
            key: entry.key.clone(),
            name: name.to_string(),
            size: entry.size,
            is_folder: false,
            last_modified: entry.last_modified,
        }
    }
}

/// Build the one-level view of `prefix`
///
/// Folders come first in provider order, then files in provider order.
/// The object whose key equals the prefix (the folder marker) is dropped.
pub fn translate(prefix: &str, common_prefixes: &[String], objects: &[ObjectEntry]) -> Vec<FileItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(common_prefixes.len() + objects.len());

    for folder_key in common_prefixes {
        let rest = strip_query_prefix(folder_key, prefix);
        let name = rest.strip_suffix('/').unwrap_or(rest);
        if name.is_empty() || !seen.insert(folder_key.as_str()) {
            continue;
        }
        items.push(FileItem::folder(folder_key, name));
    }

    for entry in objects {
        let name = strip_query_prefix(&entry.key, prefix);
        if name.is_empty() || name == "/" || !seen.insert(entry.key.as_str()) {
            continue;
        }
        items.push(FileItem::file(entry, name));
    }

    items
}

/// Remove the first `prefix.len()` bytes of `key`
///
/// This mirrors how the provider computes common prefixes: the key is known
/// to start with the prefix, so no path awareness is needed.
fn strip_query_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        key
    } else {
        key.get(prefix.len()..).unwrap_or_default()
    }
}
