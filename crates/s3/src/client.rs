//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from deck-core.
//! One client is bound to one configured bucket.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{Delete, MetadataDirective, ObjectIdentifier};

use deck_core::traits::DELIMITER;
use deck_core::{
    BucketConfig, Error, ListOptions, ListPage, ObjectEntry, ObjectInfo, ObjectStore, Result,
    StoreConnector,
};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from a bucket entry
    ///
    /// A custom endpoint switches to path-style addressing, which is what
    /// self-hosted S3-compatible servers expect.
    pub async fn new(bucket: &BucketConfig) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            bucket.access_key.clone(),
            bucket.secret_key.clone(),
            None, // session token
            None, // expiry
            "s3deck-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(bucket.region.clone()));
        if let Some(endpoint) = &bucket.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(bucket.endpoint.is_some())
            .build();

        tracing::debug!(bucket = %bucket.name, region = %bucket.region, "Created S3 client");
        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: bucket.name.clone(),
        })
    }

    /// Name of the bucket this client operates on
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, options: &ListOptions) -> Result<ListPage> {
        let mut request = self.inner.list_objects_v2().bucket(&self.bucket);

        if let Some(prefix) = &options.prefix {
            request = request.prefix(prefix);
        }
        if !options.recursive {
            request = request.delimiter(DELIMITER);
        }
        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| upstream("failed to list objects", e))?;

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        let objects = response
            .contents()
            .iter()
            .map(|object| ObjectEntry {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or(0),
                last_modified: object.last_modified().and_then(to_timestamp),
            })
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            common_prefixes,
            objects,
            next_token,
        })
    }

    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let text = DisplayErrorContext(&e).to_string();
                if is_not_found(&text) {
                    Error::NotFound(format!("object {key}"))
                } else {
                    Error::Upstream(format!("failed to get object metadata: {text}"))
                }
            })?;

        Ok(ObjectInfo {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0),
            last_modified: response.last_modified().and_then(to_timestamp),
            etag: response.e_tag().map(str::to_string),
            content_type: response.content_type().map(str::to_string),
            storage_class: response.storage_class().map(|sc| sc.as_str().to_string()),
            metadata: response.metadata().cloned().unwrap_or_else(HashMap::new),
        })
    }

    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);

        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| upstream("failed to put object", e))?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| upstream("failed to delete object", e))?;

        Ok(())
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Validation(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| Error::Validation(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| upstream("failed to delete objects", e))?;

        let deleted: Vec<String> = response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(str::to_string))
            .collect();

        if !response.errors().is_empty() {
            let error_keys: Vec<&str> = response.errors().iter().filter_map(|e| e.key()).collect();
            tracing::warn!(bucket = %self.bucket, keys = ?error_keys, "Failed to delete some objects");
        }

        Ok(deleted)
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str, content_type: &str) -> Result<()> {
        let copy_source = format!("{}/{}", self.bucket, src_key);

        self.inner
            .copy_object()
            .copy_source(&copy_source)
            .bucket(&self.bucket)
            .key(dst_key)
            .content_type(content_type)
            .metadata_directive(MetadataDirective::Replace)
            .send()
            .await
            .map_err(|e| {
                let text = DisplayErrorContext(&e).to_string();
                if is_not_found(&text) {
                    Error::NotFound(format!("object {src_key}"))
                } else {
                    Error::Upstream(format!("failed to copy object: {text}"))
                }
            })?;

        Ok(())
    }
}

/// Builds one [`S3Client`] per catalog entry
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Connector;

#[async_trait]
impl StoreConnector for S3Connector {
    async fn connect(&self, bucket: &BucketConfig) -> Result<Arc<dyn ObjectStore>> {
        Ok(Arc::new(S3Client::new(bucket).await?))
    }
}

fn upstream<E>(context: &str, err: E) -> Error
where
    E: std::error::Error,
{
    Error::Upstream(format!("{context}: {}", DisplayErrorContext(&err)))
}

fn is_not_found(text: &str) -> bool {
    text.contains("NotFound") || text.contains("NoSuchKey")
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}
