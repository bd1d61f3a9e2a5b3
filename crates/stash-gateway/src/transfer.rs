//! Single-object transfer paths

use crate::{GatewayError, ObjectStore, Result, TransferPayload};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::debug;

/// Content type every download is delivered with
pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

/// Performs single-object upload and download against the store,
/// owning the stream lifetimes involved.
pub struct TransferExecutor {
    store: Arc<dyn ObjectStore>,
}

impl TransferExecutor {
    /// Create an executor over the given store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Issue one put carrying the payload stream, its declared length and
    /// content type. The stream is consumed by the call and released when it
    /// returns, success or failure.
    pub async fn upload(&self, bucket: &str, key: &str, payload: TransferPayload) -> Result<()> {
        debug!(bucket, key, length = payload.length, "uploading object");
        self.store.put_object(bucket, key, payload).await?;
        Ok(())
    }

    /// Stat-then-get. Absent or delete-marked objects fail with `NotFound`;
    /// otherwise the whole object is drained into one in-memory buffer.
    ///
    /// Memory use is bounded only by object size — an accepted trade-off for
    /// this gateway, not a pattern for very large objects.
    pub async fn download(&self, bucket: &str, key: &str) -> Result<(Bytes, &'static str)> {
        let stat = self
            .store
            .stat_object(bucket, key)
            .await?
            .filter(|s| !s.delete_marker)
            .ok_or_else(|| GatewayError::not_found(bucket, key))?;

        let mut chunks = self.store.get_object(bucket, key).await?;
        let mut buf = BytesMut::with_capacity(stat.size as usize);
        while let Some(chunk) = chunks.try_next().await? {
            buf.extend_from_slice(&chunk);
        }

        debug!(bucket, key, bytes = buf.len(), "downloaded object");
        Ok((buf.freeze(), OCTET_STREAM))
    }
}
