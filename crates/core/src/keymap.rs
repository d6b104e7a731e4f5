//! Remote key mapping for bulk uploads
//!
//! Decides, once per upload request, how local file paths become object keys,
//! then applies that decision to every collected file.

use std::path::{Path, PathBuf};

/// Content type used when the extension is unknown
pub const OCTET_STREAM: &str = "application/octet-stream";

/// How collected files are turned into keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Strip an explicit common root from each path
    BasePath(String),

    /// A single directory was given; keep its name as the top segment
    DirectoryRoot { root: String, name: String },

    /// Every file lands flat under its base name
    Flat,
}

/// Maps local files to remote keys for one upload request
#[derive(Debug, Clone)]
pub struct KeyMapper {
    strategy: KeyStrategy,
    current_path: String,
}

impl KeyMapper {
    /// Pick the strategy for `inputs`
    ///
    /// A non-empty `base_path` always wins. Otherwise a lone directory input
    /// keeps its name, and anything else is flattened.
    pub fn new(inputs: &[PathBuf], base_path: &str, current_path: &str) -> Self {
        let strategy = if !base_path.is_empty() {
            KeyStrategy::BasePath(base_path.to_string())
        } else {
            match inputs {
                [only] if only.is_dir() => KeyStrategy::DirectoryRoot {
                    root: only.to_string_lossy().into_owned(),
                    name: base_name(only),
                },
                _ => KeyStrategy::Flat,
            }
        };

        Self {
            strategy,
            current_path: current_path.to_string(),
        }
    }

    /// The strategy chosen for this request
    pub fn strategy(&self) -> &KeyStrategy {
        &self.strategy
    }

    /// Compute the remote key for a collected file
    pub fn map(&self, file: &Path) -> String {
        let key = match &self.strategy {
            KeyStrategy::BasePath(base) => trim_path_prefix(file, base),
            KeyStrategy::DirectoryRoot { root, name } => {
                let relative = trim_path_prefix(file, root);
                if name.is_empty() {
                    relative
                } else {
                    format!("{name}/{relative}")
                }
            }
            KeyStrategy::Flat => base_name(file),
        };

        join_current_path(&self.current_path, &key)
    }
}

/// Place `key` under the folder currently browsed in the UI
pub fn join_current_path(current_path: &str, key: &str) -> String {
    if current_path.is_empty() {
        return key.to_string();
    }
    let folder = current_path.strip_suffix('/').unwrap_or(current_path);
    format!("{folder}/{key}")
}

/// Guess the content type of an object from its key
///
/// Source maps are served as JSON.
pub fn content_type_for(key: &str) -> String {
    if key.to_lowercase().ends_with(".map") {
        return "application/json".to_string();
    }

    mime_guess::from_path(key)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Check a single path segment chosen by the user
///
/// Rejects characters and device names that cannot round-trip to a local
/// filesystem on every desktop platform.
pub fn is_valid_name(name: &str) -> bool {
    const INVALID: [char; 8] = ['<', '>', ':', '"', '|', '?', '*', '\0'];
    const RESERVED: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    if name.is_empty() || name.contains(INVALID) {
        return false;
    }

    let stem = name.split('.').next().unwrap_or_default().to_uppercase();
    if RESERVED.contains(&stem.as_str()) {
        return false;
    }

    !(name.starts_with(' ') || name.ends_with(' ') || name.starts_with('.'))
}

/// Remove `prefix` from the front of `path`, then one leading separator
fn trim_path_prefix(path: &Path, prefix: &str) -> String {
    let full = path.to_string_lossy();
    let relative = full.strip_prefix(prefix).unwrap_or(&full);
    let relative = relative
        .strip_prefix(['/', '\\'])
        .unwrap_or(relative);
    relative.replace('\\', "/")
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
