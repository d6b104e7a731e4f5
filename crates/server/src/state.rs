//! Shared router state

use std::sync::Arc;

use tokio::sync::RwLock;

use deck_core::{BucketCatalog, Error, ObjectGateway, Result, StoreConnector};

/// State handed to every handler
///
/// The catalog is the only mutable state in the process. Storage clients are
/// built per request from the matching catalog entry.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<BucketCatalog>>,
    connector: Arc<dyn StoreConnector>,
}

impl AppState {
    pub fn new(catalog: BucketCatalog, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            connector,
        }
    }

    pub fn catalog(&self) -> &RwLock<BucketCatalog> {
        &self.catalog
    }

    /// Run a catalog mutation on the blocking pool
    ///
    /// The write guard is held until the document has been saved.
    pub async fn update_catalog<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut BucketCatalog) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut catalog = Arc::clone(&self.catalog).write_owned().await;
        tokio::task::spawn_blocking(move || mutate(&mut catalog))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    /// Resolve a catalog id to a gateway over its bucket
    pub async fn gateway(&self, bucket_id: &str) -> Result<ObjectGateway> {
        if bucket_id.is_empty() {
            return Err(Error::missing("bucket ID"));
        }

        let bucket = self
            .catalog
            .read()
            .await
            .find(bucket_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("bucket configuration".into()))?;

        let store = self.connector.connect(&bucket).await?;
        Ok(ObjectGateway::new(store))
    }
}
