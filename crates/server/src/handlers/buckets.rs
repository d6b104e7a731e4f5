//! Bucket catalog handlers
//!
//! - `GET    /buckets`        list every entry
//! - `POST   /add-bucket`     add an entry under a fresh id
//! - `PUT    /update-bucket`  replace an entry by id
//! - `DELETE /bucket?id=`     remove an entry

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use deck_core::{BucketConfig, Error};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogChange {
    pub message: String,
    pub id: String,
}

impl CatalogChange {
    fn new(verb: &str, id: String) -> Self {
        Self {
            message: format!("Bucket configuration {verb} successfully"),
            id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BucketIdQuery {
    pub id: String,
}

/// `GET /buckets`
pub async fn list_buckets(State(state): State<AppState>) -> Json<Vec<BucketConfig>> {
    Json(state.catalog().read().await.list().to_vec())
}

/// `POST /add-bucket`
pub async fn add_bucket(
    State(state): State<AppState>,
    payload: Result<Json<BucketConfig>, JsonRejection>,
) -> ApiResult<Json<CatalogChange>> {
    let Json(bucket) = payload?;
    let added = state
        .update_catalog(move |catalog| catalog.add(bucket))
        .await?;
    Ok(Json(CatalogChange::new("added", added.id)))
}

/// `PUT /update-bucket`
pub async fn update_bucket(
    State(state): State<AppState>,
    payload: Result<Json<BucketConfig>, JsonRejection>,
) -> ApiResult<Json<CatalogChange>> {
    let Json(bucket) = payload?;
    let updated = state
        .update_catalog(move |catalog| catalog.update(bucket))
        .await?;
    Ok(Json(CatalogChange::new("updated", updated.id)))
}

/// `DELETE /bucket?id=`
pub async fn delete_bucket(
    State(state): State<AppState>,
    Query(query): Query<BucketIdQuery>,
) -> ApiResult<Json<CatalogChange>> {
    if query.id.is_empty() {
        return Err(Error::missing("bucket ID").into());
    }
    let removed = state
        .update_catalog(move |catalog| catalog.remove(&query.id))
        .await?;
    Ok(Json(CatalogChange::new("deleted", removed.id)))
}
