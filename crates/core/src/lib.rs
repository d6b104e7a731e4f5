//! deck-core: Core library for the S3 Deck sidecar
//!
//! This crate provides the storage-independent parts of the sidecar:
//! - Bucket catalog and its JSON configuration document
//! - Listing translation into a folders-and-files view
//! - Local path collection and remote key mapping for bulk uploads
//! - ObjectStore trait and the gateway operations built on it
//!
//! Nothing here depends on an S3 SDK, so every operation can be exercised
//! against mocks and in-memory stores.

pub mod bucket;
pub mod collect;
pub mod config;
pub mod error;
pub mod gateway;
pub mod keymap;
pub mod listing;
pub mod traits;
pub mod upload;

pub use bucket::{BucketCatalog, BucketConfig};
pub use collect::{collect_files, count_files};
pub use config::{Config, ConfigManager};
pub use error::{Error, ErrorKind, Result};
pub use gateway::{
    DeleteResponse, ObjectGateway, ObjectMetadata, RenameRequest, RenameResponse, UploadedObject,
};
pub use keymap::{KeyMapper, KeyStrategy, content_type_for};
pub use listing::{FileItem, translate};
pub use traits::{ListOptions, ListPage, ObjectEntry, ObjectInfo, ObjectStore, StoreConnector};
pub use upload::{UploadOutcome, UploadReport, UploadRequest, count_path};
