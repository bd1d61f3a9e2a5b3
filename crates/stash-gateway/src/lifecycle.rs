//! Bucket lifecycle: idempotent creation and batched teardown

use crate::{BatchFailure, ObjectStore, StoreError, TeardownReport};
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ensures buckets exist before writes and performs full bucket teardown.
pub struct BucketLifecycleManager {
    store: Arc<dyn ObjectStore>,
}

impl BucketLifecycleManager {
    /// Create a manager over the given store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Create the bucket if it does not exist yet.
    ///
    /// Check-then-act without a transactional guard: two concurrent calls can
    /// both observe "missing", but creation is idempotent at the store level
    /// so the race is harmless.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        if self.store.bucket_exists(bucket).await? {
            return Ok(());
        }
        debug!(bucket, "bucket missing, creating");
        self.store.make_bucket(bucket).await
    }

    /// Drain every object out of the bucket via paged bulk deletes, then
    /// remove the bucket itself.
    ///
    /// Keys are accumulated from a single sequential pass over the listing
    /// and flushed as soon as the group grows past `pack_size` (strictly
    /// greater, so flushed batches hold `pack_size + 1` keys). `pack_size`
    /// of zero is legal and flushes every key on its own.
    ///
    /// A failed flush is recorded in the report and the sweep continues;
    /// only a listing error or the final bucket removal failing is fatal.
    pub async fn teardown_bucket(
        &self,
        bucket: &str,
        pack_size: usize,
    ) -> Result<TeardownReport, StoreError> {
        let mut report = TeardownReport::default();
        let mut batch: Vec<String> = Vec::new();

        {
            let mut keys = self.store.list_objects(bucket);
            while let Some(key) = keys.try_next().await? {
                batch.push(key);
                if batch.len() > pack_size {
                    self.flush_batch(bucket, &mut batch, &mut report).await;
                }
            }
            // Listing cursor released here, before the bucket goes away.
        }

        if !batch.is_empty() {
            self.flush_batch(bucket, &mut batch, &mut report).await;
        }

        self.store.remove_bucket(bucket).await?;

        info!(
            bucket,
            batches = report.batches_flushed,
            failed_batches = report.failed_batches.len(),
            "bucket teardown complete"
        );
        Ok(report)
    }

    /// Issue one bulk delete for the accumulated keys and clear the group.
    /// Failures are reported, never propagated.
    async fn flush_batch(
        &self,
        bucket: &str,
        batch: &mut Vec<String>,
        report: &mut TeardownReport,
    ) {
        let keys = std::mem::take(batch);
        match self.store.remove_objects(bucket, &keys).await {
            Ok(()) => {
                debug!(bucket, keys = keys.len(), "flushed delete batch");
                report.batches_flushed += 1;
            }
            Err(e) => {
                warn!(
                    bucket,
                    keys = keys.len(),
                    error = %e,
                    "bulk delete failed, continuing teardown"
                );
                report.failed_batches.push(BatchFailure {
                    keys,
                    message: e.to_string(),
                });
            }
        }
    }
}
