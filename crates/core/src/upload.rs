//! Bulk upload from local paths
//!
//! Expands every requested root into files, maps each file to a remote key
//! and stores it. Files are processed one after another and each failure is
//! recorded without stopping the batch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collect::collect_files;
use crate::error::{Error, Result};
use crate::keymap::{KeyMapper, content_type_for};
use crate::traits::ObjectStore;

/// Body of a bulk upload request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadRequest {
    /// Catalog id of the target bucket
    pub bucket: String,

    /// Common local root stripped from every file path
    pub base_path: String,

    /// Remote folder the files are placed under
    pub current_path: String,

    /// Local files or directories
    pub files: Vec<String>,
}

impl UploadRequest {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(Error::missing("bucket ID"));
        }
        if self.files.is_empty() {
            return Err(Error::Validation("no files provided".into()));
        }
        Ok(())
    }
}

/// Result of one file (or one unusable root) in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded {
        path: String,
        key: String,
        size: u64,
    },
    Failed {
        path: String,
        key: Option<String>,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub path: String,
    pub key: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub error: String,
}

/// Summary returned once the whole batch has finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub message: String,
    pub uploaded_files: Vec<UploadedFile>,
    pub failed_files: Vec<FailedFile>,

    /// Number of files found while expanding the roots
    pub total_files: usize,
}

impl UploadReport {
    fn new(outcomes: Vec<UploadOutcome>, total_files: usize) -> Self {
        let mut uploaded_files = Vec::new();
        let mut failed_files = Vec::new();

        for outcome in outcomes {
            match outcome {
                UploadOutcome::Succeeded { path, key, size } => {
                    uploaded_files.push(UploadedFile { path, key, size })
                }
                UploadOutcome::Failed { path, key, reason } => failed_files.push(FailedFile {
                    path,
                    key,
                    error: reason,
                }),
            }
        }

        Self {
            message: format!(
                "Uploaded {} files, {} failed",
                uploaded_files.len(),
                failed_files.len()
            ),
            uploaded_files,
            failed_files,
            total_files,
        }
    }
}

/// Upload every file denoted by `request` into `store`
pub async fn upload_paths(store: &dyn ObjectStore, request: &UploadRequest) -> UploadReport {
    let roots: Vec<PathBuf> = request.files.iter().map(PathBuf::from).collect();
    let mapper = KeyMapper::new(&roots, &request.base_path, &request.current_path);
    tracing::debug!(strategy = ?mapper.strategy(), roots = roots.len(), "Planning upload");

    let mut outcomes = Vec::new();
    let mut files = Vec::new();
    for root in roots {
        match collect_root(root.clone()).await {
            Ok(found) => files.extend(found),
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "Skipping upload root");
                outcomes.push(UploadOutcome::Failed {
                    path: root.display().to_string(),
                    key: None,
                    reason: format!("failed to process path: {e}"),
                });
            }
        }
    }

    let total_files = files.len();
    for file in &files {
        if let Some(outcome) = upload_file(store, &mapper, file).await {
            outcomes.push(outcome);
        }
    }

    UploadReport::new(outcomes, total_files)
}

/// Count the files a local path expands to
pub async fn count_path(path: &str) -> Result<usize> {
    if path.is_empty() {
        return Err(Error::missing("path"));
    }
    collect_root(PathBuf::from(path)).await.map(|files| files.len())
}

async fn collect_root(root: PathBuf) -> Result<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || collect_files(&root))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Upload one collected file; directories yield no outcome
async fn upload_file(
    store: &dyn ObjectStore,
    mapper: &KeyMapper,
    file: &Path,
) -> Option<UploadOutcome> {
    let path = file.display().to_string();
    let failed = |key: Option<String>, reason: String| {
        tracing::warn!(path = %path, reason = %reason, "Upload failed");
        UploadOutcome::Failed {
            path: path.clone(),
            key,
            reason,
        }
    };

    let metadata = match tokio::fs::metadata(file).await {
        Ok(m) => m,
        Err(e) => return Some(failed(None, format!("failed to get file info: {e}"))),
    };
    if metadata.is_dir() {
        return None;
    }

    let data = match tokio::fs::read(file).await {
        Ok(d) => d,
        Err(e) => return Some(failed(None, format!("failed to open file: {e}"))),
    };

    let key = mapper.map(file);
    let content_type = content_type_for(&key);
    tracing::debug!(path = %path, key = %key, content_type = %content_type, "Uploading file");

    match store.put_object(&key, data, &content_type).await {
        Ok(()) => Some(UploadOutcome::Succeeded {
            path: path.clone(),
            key,
            size: metadata.len(),
        }),
        Err(e) => Some(failed(Some(key), format!("failed to upload: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockObjectStore;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn request(files: &[&Path], base_path: &str, current_path: &str) -> UploadRequest {
        UploadRequest {
            bucket: "b1".to_string(),
            base_path: base_path.to_string(),
            current_path: current_path.to_string(),
            files: files.iter().map(|p| p.display().to_string()).collect(),
        }
    }

    /// A mock that accepts every put and records (key, len, content type)
    fn recording_store() -> (MockObjectStore, Arc<Mutex<Vec<(String, usize, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .returning(move |key, data, content_type| {
                sink.lock()
                    .unwrap()
                    .push((key.to_string(), data.len(), content_type.to_string()));
                Ok(())
            });
        (store, seen)
    }

    #[test]
    fn test_request_validation() {
        let mut req = UploadRequest::default();
        assert_eq!(req.validate().unwrap_err().to_string(), "missing bucket ID");

        req.bucket = "b1".into();
        assert_eq!(req.validate().unwrap_err().to_string(), "no files provided");

        req.files.push("/tmp".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: UploadRequest = serde_json::from_str(
            r#"{"bucket":"b1","basePath":"/home","currentPath":"docs/","files":["/home/a"]}"#,
        )
        .unwrap();
        assert_eq!(req.base_path, "/home");
        assert_eq!(req.current_path, "docs/");
        assert_eq!(req.files, ["/home/a"]);
    }

    #[tokio::test]
    async fn test_single_directory_upload() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("album");
        fs::create_dir_all(dir.join("raw")).unwrap();
        fs::write(dir.join("cover.png"), b"png!").unwrap();
        fs::write(dir.join("raw/a.txt"), b"hello").unwrap();

        let (store, seen) = recording_store();
        let report = upload_paths(&store, &request(&[&dir], "", "")).await;

        assert_eq!(report.total_files, 2);
        assert_eq!(report.message, "Uploaded 2 files, 0 failed");
        assert!(report.failed_files.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("album/cover.png".to_string(), 4, "image/png".to_string()),
                ("album/raw/a.txt".to_string(), 5, "text/plain".to_string()),
            ]
        );
        assert_eq!(report.uploaded_files[1].size, 5);
    }

    #[tokio::test]
    async fn test_base_path_and_current_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("src/app.js.map");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"{}").unwrap();

        let (store, seen) = recording_store();
        let base = temp.path().display().to_string();
        let report = upload_paths(&store, &request(&[&file], &base, "build/")).await;

        assert_eq!(report.uploaded_files.len(), 1);
        assert_eq!(report.uploaded_files[0].key, "build/src/app.js.map");
        assert_eq!(seen.lock().unwrap()[0].2, "application/json");
    }

    #[tokio::test]
    async fn test_missing_root_is_reported_and_batch_continues() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("ok.txt");
        fs::write(&good, b"ok").unwrap();
        let missing = temp.path().join("missing");

        let (store, _seen) = recording_store();
        let report = upload_paths(&store, &request(&[&missing, &good], "", "")).await;

        assert_eq!(report.total_files, 1);
        assert_eq!(report.uploaded_files.len(), 1);
        assert_eq!(report.uploaded_files[0].key, "ok.txt");
        assert_eq!(report.failed_files.len(), 1);
        assert!(report.failed_files[0].key.is_none());
        assert!(
            report.failed_files[0]
                .error
                .starts_with("failed to process path")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_walk_error_drops_root_and_batch_continues() {
        use crate::collect::tests::{lock_dir, unlock_dir};

        let temp = TempDir::new().unwrap();
        let broken = temp.path().join("broken");
        fs::create_dir_all(broken.join("locked")).unwrap();
        fs::write(broken.join("a.txt"), b"a").unwrap();
        fs::write(broken.join("locked/b.txt"), b"b").unwrap();
        let good = temp.path().join("ok.txt");
        fs::write(&good, b"ok").unwrap();

        let locked = broken.join("locked");
        if lock_dir(&locked).is_none() {
            return;
        }
        let (store, seen) = recording_store();
        let report = upload_paths(&store, &request(&[&broken, &good], "", "")).await;
        unlock_dir(&locked);

        assert_eq!(report.total_files, 1);
        assert_eq!(report.uploaded_files.len(), 1);
        assert_eq!(report.uploaded_files[0].key, "ok.txt");
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(report.failed_files.len(), 1);
        assert_eq!(report.failed_files[0].path, broken.display().to_string());
        assert!(
            report.failed_files[0]
                .error
                .starts_with("failed to process path")
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_collected() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|key: &str, _data: &Vec<u8>, _content_type: &str| key == "a.txt")
            .returning(|_, _, _| Err(Error::Upstream("AccessDenied".into())));
        store
            .expect_put_object()
            .withf(|key: &str, _data: &Vec<u8>, _content_type: &str| key == "b.txt")
            .returning(|_, _, _| Ok(()));

        let report = upload_paths(&store, &request(&[&a, &b], "", "")).await;

        assert_eq!(report.message, "Uploaded 1 files, 1 failed");
        assert_eq!(report.failed_files[0].key.as_deref(), Some("a.txt"));
        assert_eq!(report.failed_files[0].error, "failed to upload: AccessDenied");
        assert_eq!(report.uploaded_files[0].key, "b.txt");
    }

    #[tokio::test]
    async fn test_report_serialized_shape() {
        let report = UploadReport::new(
            vec![
                UploadOutcome::Succeeded {
                    path: "/l/a".into(),
                    key: "a".into(),
                    size: 3,
                },
                UploadOutcome::Failed {
                    path: "/l/b".into(),
                    key: None,
                    reason: "failed to open file: denied".into(),
                },
            ],
            2,
        );

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "message": "Uploaded 1 files, 1 failed",
                "uploadedFiles": [{"path": "/l/a", "key": "a", "size": 3}],
                "failedFiles": [{"path": "/l/b", "error": "failed to open file: denied"}],
                "totalFiles": 2
            })
        );
    }

    #[tokio::test]
    async fn test_count_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("x/y")).unwrap();
        fs::write(temp.path().join("x/y/z"), b"").unwrap();
        fs::write(temp.path().join("top"), b"").unwrap();

        let path = temp.path().display().to_string();
        assert_eq!(count_path(&path).await.unwrap(), 2);
        assert!(matches!(count_path("").await, Err(Error::Validation(_))));
        assert!(matches!(
            count_path("/definitely/not/here").await,
            Err(Error::InvalidPath(_))
        ));
    }
}
