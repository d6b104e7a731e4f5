//! Upload handlers
//!
//! - `POST /upload`        multipart form with `bucket`, `key` and `file`
//! - `POST /upload-paths`  bulk upload of local files and directories
//! - `POST /count-files`   number of files a local path expands to

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};

use deck_core::upload::count_path;
use deck_core::{Error, UploadReport, UploadRequest, UploadedObject};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
    pub path: String,
}

/// `POST /upload`
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedObject>> {
    let mut multipart = multipart?;
    let mut bucket = String::new();
    let mut key = String::new();
    let mut data = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "bucket" => bucket = field.text().await?,
            "key" => key = field.text().await?,
            "file" => data = Some(field.bytes().await?.to_vec()),
            other => tracing::debug!(field = %other, "Ignoring form field"),
        }
    }

    if bucket.is_empty() {
        return Err(Error::missing("bucket ID").into());
    }
    if key.is_empty() {
        return Err(Error::missing("object key").into());
    }

    let gateway = state.gateway(&bucket).await?;
    let data = data.ok_or_else(|| Error::Validation("failed to get file from request".into()))?;
    Ok(Json(gateway.upload_bytes(&key, data).await?))
}

/// `POST /upload-paths`
pub async fn upload_paths(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<Json<UploadReport>> {
    let Json(request) = payload?;
    request.validate()?;

    let gateway = state.gateway(&request.bucket).await?;
    let report = gateway.upload_paths(&request).await;
    tracing::info!(
        uploaded = report.uploaded_files.len(),
        failed = report.failed_files.len(),
        "Bulk upload finished"
    );
    Ok(Json(report))
}

/// `POST /count-files`
pub async fn count_files(
    payload: Result<Json<CountRequest>, JsonRejection>,
) -> ApiResult<Json<CountResponse>> {
    let Json(request) = payload?;
    let count = count_path(&request.path).await?;
    Ok(Json(CountResponse {
        count,
        path: request.path,
    }))
}
