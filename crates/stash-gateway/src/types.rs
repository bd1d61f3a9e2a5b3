//! Transient request/response records
//!
//! Nothing here is persisted state; the object store owns persistence. These
//! records are constructed per request and dropped when the operation ends.

use crate::StoreError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A push-style pipe of payload chunks: the producer side feeds chunks in as
/// the network delivers them, the consumer drains them in a single pass.
pub type ByteChunks = BoxStream<'static, std::result::Result<Bytes, StoreError>>;

/// Lazy listing of object keys in a bucket. Finite but unbounded in length;
/// dropping the stream releases the underlying listing cursor.
pub type KeyStream = BoxStream<'static, std::result::Result<String, StoreError>>;

/// A bucket visible to the store credentials
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BucketInfo {
    /// Bucket name
    pub name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Metadata-only view of a stored object
#[derive(Clone, Debug)]
pub struct ObjectStat {
    /// Size in bytes
    pub size: u64,
    /// Content type, if the store recorded one
    pub content_type: Option<String>,
    /// Whether the latest version is a delete marker
    pub delete_marker: bool,
}

/// An upload request: payload stream plus its declared shape.
///
/// The declared length must match the stream's actual byte count; the store
/// enforces this and a mismatch surfaces as a failure.
pub struct TransferPayload {
    /// Payload chunks
    pub body: ByteChunks,
    /// Declared byte length
    pub length: u64,
    /// Content type sent with the put
    pub content_type: String,
}

impl TransferPayload {
    /// Build a payload from an already-buffered body
    pub fn from_bytes(data: Bytes, content_type: impl Into<String>) -> Self {
        let length = data.len() as u64;
        Self {
            body: stream::once(async move { Ok(data) }).boxed(),
            length,
            content_type: content_type.into(),
        }
    }

    /// Build a payload from a chunk stream with a declared length
    pub fn from_stream(body: ByteChunks, length: u64, content_type: impl Into<String>) -> Self {
        Self {
            body,
            length,
            content_type: content_type.into(),
        }
    }
}

impl std::fmt::Debug for TransferPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferPayload")
            .field("length", &self.length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A time-limited URL granting direct read access to one object
#[derive(Clone, Debug, Serialize)]
pub struct PresignedDownload {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
    /// The presigned URL
    pub url: String,
    /// How long the grant stays valid
    pub expires_in: Duration,
}

/// One bulk-delete call that the store rejected during teardown
#[derive(Clone, Debug)]
pub struct BatchFailure {
    /// Keys that were in the failed batch
    pub keys: Vec<String>,
    /// The store's error message
    pub message: String,
}

/// Outcome of a bucket teardown.
///
/// Teardown is best-effort per batch: failed flushes are recorded here
/// rather than aborting the sweep, so a "successful" teardown may still
/// leave the keys listed in `failed_batches` behind.
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Bulk-delete calls that succeeded
    pub batches_flushed: usize,
    /// Bulk-delete calls that failed, in listing order
    pub failed_batches: Vec<BatchFailure>,
}

impl TeardownReport {
    /// True when every flush succeeded
    pub fn is_clean(&self) -> bool {
        self.failed_batches.is_empty()
    }

    /// Total keys left behind by failed flushes
    pub fn keys_left_behind(&self) -> usize {
        self.failed_batches.iter().map(|b| b.keys.len()).sum()
    }
}
