//! s3deck - local HTTP sidecar for S3-compatible object storage
//!
//! Serves a persisted bucket catalog and object operations to the desktop UI.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use deck_core::BucketCatalog;
use deck_s3::S3Connector;
use s3deck::{AppState, Args, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let manager = args.config_manager()?;
    let catalog = BucketCatalog::open(manager)
        .with_context(|| "failed to load bucket catalog")?;
    tracing::info!(
        path = %catalog.config_path().display(),
        buckets = catalog.list().len(),
        "Loaded bucket catalog"
    );

    let state = AppState::new(catalog, Arc::new(S3Connector));
    let router = app(state, args.body_limit());

    let addr = args.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
