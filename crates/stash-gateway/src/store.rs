//! The object-store capability interface
//!
//! The gateway depends on the remote store through this narrow trait; the
//! production implementation is [`crate::S3ObjectStore`], tests substitute an
//! in-memory recording store.

use crate::{BucketInfo, ByteChunks, KeyStream, ObjectStat, StoreError, TransferPayload};
use async_trait::async_trait;
use std::time::Duration;

/// Object-store primitives the gateway needs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether a bucket exists
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// Create a bucket. Creating a bucket that already exists is a no-op.
    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Remove a bucket
    async fn remove_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// List every bucket the store credentials can see
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StoreError>;

    /// Lazily list every object key in a bucket. The store may paginate
    /// internally; the stream hides that from callers.
    fn list_objects(&self, bucket: &str) -> KeyStream;

    /// Metadata-only lookup. Returns `None` when the object is absent.
    async fn stat_object(&self, bucket: &str, key: &str)
        -> Result<Option<ObjectStat>, StoreError>;

    /// Store an object, unconditionally replacing any existing content
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: TransferPayload,
    ) -> Result<(), StoreError>;

    /// Open a push-style chunk pipe over an object's content
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks, StoreError>;

    /// Remove a single object
    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// Remove a batch of objects in one store call
    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError>;

    /// Produce a presigned download URL valid for `expires_in`.
    /// Does not check that the object exists.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StoreError>;
}
