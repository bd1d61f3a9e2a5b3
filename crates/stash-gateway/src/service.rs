//! Gateway orchestration layer
//!
//! Translates storage intents coming from the request boundary into calls
//! against the transfer executor and the lifecycle manager, and maps every
//! outcome into the [`GatewayError`] taxonomy. Store failures never escape
//! as raw faults.

use crate::{
    BucketInfo, BucketLifecycleManager, GatewayError, ObjectStore, PresignedDownload, Result,
    TeardownReport, TransferExecutor, TransferPayload,
};
use bytes::Bytes;
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

/// Fixed expiry for presigned download URLs
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Content type downloads are delivered with
pub const DOWNLOAD_CONTENT_TYPE: &str = crate::transfer::OCTET_STREAM;

/// Service-level defaults
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Bucket used when an upload names none
    pub default_bucket: String,
    /// Teardown batch pack size used when the caller supplies none
    pub teardown_pack_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_bucket: "uploads".to_string(),
            teardown_pack_size: 500,
        }
    }
}

/// The operation surface exposed to the request boundary
pub struct GatewayService {
    store: Arc<dyn ObjectStore>,
    transfer: TransferExecutor,
    lifecycle: BucketLifecycleManager,
    config: ServiceConfig,
}

impl GatewayService {
    /// Create a service over the given store
    pub fn new(store: Arc<dyn ObjectStore>, config: ServiceConfig) -> Self {
        Self {
            transfer: TransferExecutor::new(Arc::clone(&store)),
            lifecycle: BucketLifecycleManager::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    /// The configured defaults
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Issue a presigned download URL with a fixed 24-hour expiry.
    ///
    /// Succeeds for any syntactically valid names; the object's existence is
    /// deliberately not checked, so URLs can be handed out for objects that
    /// will only be created later.
    #[instrument(skip(self))]
    pub async fn presign_download(&self, bucket: &str, key: &str) -> Result<PresignedDownload> {
        require("bucket", bucket)?;
        require("key", key)?;

        let url = self.store.presign_get(bucket, key, PRESIGN_EXPIRY).await?;
        Ok(PresignedDownload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            url,
            expires_in: PRESIGN_EXPIRY,
        })
    }

    /// List every bucket the store credentials can see
    #[instrument(skip(self))]
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        Ok(self.store.list_buckets().await?)
    }

    /// Store a new object, falling back to the default bucket and a
    /// generated unique name when the caller supplies none.
    /// Returns the key the object was stored under.
    #[instrument(skip(self, payload), fields(length = payload.length))]
    pub async fn upload(
        &self,
        bucket: Option<String>,
        key: Option<String>,
        payload: TransferPayload,
    ) -> Result<String> {
        let bucket = bucket.unwrap_or_else(|| self.config.default_bucket.clone());
        let key = key.unwrap_or_else(generated_object_name);
        self.store_object(&bucket, &key, payload).await
    }

    /// Replace the object at an explicit bucket/key. The put is not
    /// conditional: existing content is always overwritten.
    #[instrument(skip(self, payload), fields(length = payload.length))]
    pub async fn replace(&self, bucket: &str, key: &str, payload: TransferPayload) -> Result<String> {
        self.store_object(bucket, key, payload).await
    }

    /// Shared upload path: validate, ensure the bucket, put
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        payload: TransferPayload,
    ) -> Result<String> {
        require("bucket", bucket)?;
        require("key", key)?;
        if payload.length == 0 {
            return Err(GatewayError::validation("file body is empty"));
        }

        self.lifecycle.ensure_bucket(bucket).await?;
        self.transfer.upload(bucket, key, payload).await?;
        Ok(key.to_string())
    }

    /// Fetch an object's full content as one buffer, plus the content type
    /// it is delivered with. Fails with `NotFound` when the object is absent
    /// or delete-marked.
    #[instrument(skip(self))]
    pub async fn download(&self, bucket: &str, key: &str) -> Result<(Bytes, &'static str)> {
        require("bucket", bucket)?;
        require("key", key)?;
        self.transfer.download(bucket, key).await
    }

    /// List every object key in a bucket
    #[instrument(skip(self))]
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        require("bucket", bucket)?;
        let keys = self.store.list_objects(bucket).try_collect().await?;
        Ok(keys)
    }

    /// Delete one object. The object must exist; a missing or delete-marked
    /// key fails with `NotFound` before any removal is attempted.
    #[instrument(skip(self))]
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        require("bucket", bucket)?;
        require("key", key)?;

        self.store
            .stat_object(bucket, key)
            .await?
            .filter(|s| !s.delete_marker)
            .ok_or_else(|| GatewayError::not_found(bucket, key))?;

        self.store.remove_object(bucket, key).await?;
        Ok(())
    }

    /// Tear down a whole bucket: drain its objects in batches, then remove
    /// it. Per-batch failures are carried in the report, not raised.
    #[instrument(skip(self))]
    pub async fn teardown_bucket(
        &self,
        bucket: &str,
        pack_size: Option<usize>,
    ) -> Result<TeardownReport> {
        require("bucket", bucket)?;

        let pack_size = pack_size.unwrap_or(self.config.teardown_pack_size);
        let report = self.lifecycle.teardown_bucket(bucket, pack_size).await?;
        if !report.is_clean() {
            warn!(
                bucket,
                keys_left = report.keys_left_behind(),
                "teardown finished with failed batches"
            );
        }
        Ok(report)
    }
}

/// Unique name for uploads that arrive without one
fn generated_object_name() -> String {
    format!("uploaded-file-{}", uuid::Uuid::new_v4())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
