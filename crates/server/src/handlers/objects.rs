//! Object handlers
//!
//! Each handler resolves the bucket id through the catalog, then delegates to
//! the gateway for that bucket.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use deck_core::{DeleteResponse, FileItem, ObjectMetadata, RenameRequest, RenameResponse};

use crate::error::ApiResult;
use crate::state::AppState;

/// Query string shared by the object routes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ObjectQuery {
    pub bucket: String,
    pub prefix: String,
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateFolderRequest {
    pub bucket: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FolderCreated {
    pub message: String,
    pub key: String,
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /objects?bucket=&prefix=`
pub async fn list_objects(
    State(state): State<AppState>,
    Query(query): Query<ObjectQuery>,
) -> ApiResult<Json<Vec<FileItem>>> {
    let gateway = state.gateway(&query.bucket).await?;
    Ok(Json(gateway.list(&query.prefix).await?))
}

/// `DELETE /delete?bucket=&key=`
pub async fn delete_object(
    State(state): State<AppState>,
    Query(query): Query<ObjectQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let gateway = state.gateway(&query.bucket).await?;
    Ok(Json(gateway.delete(&query.key).await?))
}

/// `GET /metadata?bucket=&key=`
pub async fn object_metadata(
    State(state): State<AppState>,
    Query(query): Query<ObjectQuery>,
) -> ApiResult<Json<ObjectMetadata>> {
    let gateway = state.gateway(&query.bucket).await?;
    Ok(Json(gateway.metadata(&query.key).await?))
}

/// `GET /folder-modified?bucket=&key=`
pub async fn folder_modified(
    State(state): State<AppState>,
    Query(query): Query<ObjectQuery>,
) -> ApiResult<Json<Value>> {
    let gateway = state.gateway(&query.bucket).await?;
    let latest = gateway.folder_latest_modified(&query.key).await?;
    Ok(Json(json!({ "key": query.key, "lastModified": latest })))
}

/// `POST /create-folder`
pub async fn create_folder(
    State(state): State<AppState>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> ApiResult<Json<FolderCreated>> {
    let Json(request) = payload?;
    let gateway = state.gateway(&request.bucket).await?;
    let key = gateway.create_folder(&request.path).await?;
    Ok(Json(FolderCreated {
        message: "Folder created successfully".into(),
        key,
    }))
}

/// `POST /rename`
pub async fn rename_object(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> ApiResult<Json<RenameResponse>> {
    let Json(request) = payload?;
    let gateway = state.gateway(&request.bucket).await?;
    Ok(Json(gateway.rename(&request).await?))
}
