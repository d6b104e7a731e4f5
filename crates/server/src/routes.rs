//! Route table
//!
//! ## Catalog
//! - `GET    /buckets`
//! - `POST   /add-bucket`
//! - `PUT    /update-bucket`
//! - `DELETE /bucket?id=`
//!
//! ## Objects
//! - `GET    /objects?bucket=&prefix=`
//! - `POST   /upload`
//! - `POST   /upload-paths`
//! - `POST   /count-files`
//! - `DELETE /delete?bucket=&key=`
//! - `GET    /metadata?bucket=&key=`
//! - `POST   /create-folder`
//! - `POST   /rename`
//! - `GET    /folder-modified?bucket=&key=`
//!
//! `GET /health` answers without touching the catalog.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{buckets, objects, uploads};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState, body_limit: usize) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every route, without middleware
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(objects::health))
        // Catalog
        .route("/buckets", get(buckets::list_buckets))
        .route("/add-bucket", post(buckets::add_bucket))
        .route("/update-bucket", put(buckets::update_bucket))
        .route("/bucket", delete(buckets::delete_bucket))
        // Objects
        .route("/objects", get(objects::list_objects))
        .route("/delete", delete(objects::delete_object))
        .route("/metadata", get(objects::object_metadata))
        .route("/folder-modified", get(objects::folder_modified))
        .route("/create-folder", post(objects::create_folder))
        .route("/rename", post(objects::rename_object))
        // Uploads
        .route("/upload", post(uploads::upload_file))
        .route("/upload-paths", post(uploads::upload_paths))
        .route("/count-files", post(uploads::count_files))
}

/// Any origin may call the sidecar
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
