//! End-to-end gateway behavior against a recording in-memory store.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::TryStreamExt;
use stash_gateway::{
    BucketInfo, ByteChunks, GatewayError, GatewayService, KeyStream, ObjectStat, ObjectStore,
    ServiceConfig, StoreError, TransferPayload,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Every store call, in issue order
#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    BucketExists(String),
    MakeBucket(String),
    RemoveBucket(String),
    ListBuckets,
    ListObjects(String),
    Stat(String, String),
    Put(String, String),
    Get(String, String),
    RemoveObject(String, String),
    RemoveObjects(String, Vec<String>),
    Presign(String, String),
}

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    delete_marker: bool,
}

#[derive(Default)]
struct Inner {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    calls: Vec<Call>,
    /// 0-based indices of remove_objects calls that should fail
    failing_flushes: HashSet<usize>,
    flushes_seen: usize,
}

/// In-memory store that records every call and can inject bulk-delete faults
#[derive(Default)]
struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_bucket(self: Arc<Self>, bucket: &str, keys: &[&str]) -> Arc<Self> {
        {
            let mut inner = self.inner.lock().unwrap();
            let objects = inner.buckets.entry(bucket.to_string()).or_default();
            for key in keys {
                objects.insert(
                    key.to_string(),
                    StoredObject {
                        data: Bytes::from_static(b"x"),
                        content_type: "application/octet-stream".to_string(),
                        delete_marker: false,
                    },
                );
            }
        }
        self
    }

    fn fail_flush(&self, index: usize) {
        self.inner.lock().unwrap().failing_flushes.insert(index);
    }

    fn mark_deleted(&self, bucket: &str, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(obj) = inner
            .buckets
            .get_mut(bucket)
            .and_then(|objects| objects.get_mut(key))
        {
            obj.delete_marker = true;
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn flushed_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::RemoveObjects(_, keys) => Some(keys),
                _ => None,
            })
            .collect()
    }

    fn bucket_names(&self) -> Vec<String> {
        self.inner.lock().unwrap().buckets.keys().cloned().collect()
    }

    fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.inner
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| o.data.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::BucketExists(bucket.to_string()));
        Ok(inner.buckets.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::MakeBucket(bucket.to_string()));
        // Idempotent, like the real adapter's already-exists guard.
        inner.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::RemoveBucket(bucket.to_string()));
        inner.buckets.remove(bucket);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListBuckets);
        Ok(inner
            .buckets
            .keys()
            .map(|name| BucketInfo {
                name: name.clone(),
                created_at: Utc::now(),
            })
            .collect())
    }

    fn list_objects(&self, bucket: &str) -> KeyStream {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListObjects(bucket.to_string()));
        let keys: Vec<String> = inner
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        stream::iter(keys.into_iter().map(Ok)).boxed()
    }

    async fn stat_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStat>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::Stat(bucket.to_string(), key.to_string()));
        Ok(inner
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| ObjectStat {
                size: o.data.len() as u64,
                content_type: Some(o.content_type.clone()),
                delete_marker: o.delete_marker,
            }))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: TransferPayload,
    ) -> Result<(), StoreError> {
        let declared = payload.length;
        let content_type = payload.content_type.clone();
        let chunks: Vec<Bytes> = payload.body.try_collect().await?;
        let data: Bytes = chunks.concat().into();
        if data.len() as u64 != declared {
            return Err(StoreError::new("declared length mismatch"));
        }

        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::Put(bucket.to_string(), key.to_string()));
        inner
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::new(format!("no such bucket: {bucket}")))?
            .insert(
                key.to_string(),
                StoredObject {
                    data,
                    content_type,
                    delete_marker: false,
                },
            );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::Get(bucket.to_string(), key.to_string()));
        let data = inner
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| o.data.clone())
            .ok_or_else(|| StoreError::new(format!("no such key: {bucket}/{key}")))?;

        // Deliver in two chunks to exercise the accumulating copy.
        let mid = data.len() / 2;
        let chunks = vec![Ok(data.slice(..mid)), Ok(data.slice(mid..))];
        Ok(stream::iter(chunks).boxed())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::RemoveObject(bucket.to_string(), key.to_string()));
        if let Some(objects) = inner.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::RemoveObjects(bucket.to_string(), keys.to_vec()));
        let index = inner.flushes_seen;
        inner.flushes_seen += 1;
        if inner.failing_flushes.contains(&index) {
            return Err(StoreError::new("simulated store fault"));
        }
        if let Some(objects) = inner.buckets.get_mut(bucket) {
            for key in keys {
                objects.remove(key);
            }
        }
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::Presign(bucket.to_string(), key.to_string()));
        Ok(format!(
            "http://store.local/{bucket}/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}

fn service(store: Arc<MemoryStore>) -> GatewayService {
    GatewayService::new(store, ServiceConfig::default())
}

fn payload(data: &'static [u8]) -> TransferPayload {
    TransferPayload::from_bytes(Bytes::from_static(data), "text/plain")
}

// ==================== Teardown batching ====================

#[tokio::test]
async fn teardown_flushes_in_listing_order_past_pack_size() {
    let store = MemoryStore::new().with_bucket("media", &["a", "b", "c", "d", "e"]);
    let report = service(store.clone())
        .teardown_bucket("media", Some(2))
        .await
        .unwrap();

    // Third key trips the strictly-greater-than check, remainder goes last.
    assert_eq!(
        store.flushed_batches(),
        vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string(), "e".to_string()],
        ]
    );
    assert_eq!(report.batches_flushed, 2);
    assert!(report.is_clean());
    assert!(store.bucket_names().is_empty());
}

#[tokio::test]
async fn teardown_batch_count_follows_ceil_law() {
    // 10 keys, pack size 3 -> ceil(10 / 4) = 3 calls sized 4, 4, 2.
    let keys: Vec<String> = (0..10).map(|i| format!("k{i:02}")).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let store = MemoryStore::new().with_bucket("bulk", &key_refs);

    let report = service(store.clone())
        .teardown_bucket("bulk", Some(3))
        .await
        .unwrap();

    let batches = store.flushed_batches();
    assert_eq!(batches.len(), 3);
    assert_eq!(
        batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![4, 4, 2]
    );
    assert_eq!(report.batches_flushed, 3);
}

#[tokio::test]
async fn teardown_pack_size_zero_deletes_one_key_at_a_time() {
    let store = MemoryStore::new().with_bucket("tiny", &["a", "b", "c"]);
    service(store.clone())
        .teardown_bucket("tiny", Some(0))
        .await
        .unwrap();

    let batches = store.flushed_batches();
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() == 1));
}

#[tokio::test]
async fn teardown_empty_bucket_goes_straight_to_removal() {
    let store = MemoryStore::new().with_bucket("empty", &[]);
    let report = service(store.clone())
        .teardown_bucket("empty", Some(5))
        .await
        .unwrap();

    assert!(store.flushed_batches().is_empty());
    assert_eq!(report.batches_flushed, 0);
    assert_eq!(
        store
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::RemoveBucket(_)))
            .count(),
        1
    );
}

#[tokio::test]
async fn teardown_continues_past_failed_flush() {
    let store = MemoryStore::new().with_bucket("media", &["a", "b", "c", "d", "e"]);
    store.fail_flush(0);

    let report = service(store.clone())
        .teardown_bucket("media", Some(2))
        .await
        .unwrap();

    // Both batches were still attempted, and the bucket removal ran.
    assert_eq!(store.flushed_batches().len(), 2);
    assert!(store
        .calls()
        .iter()
        .any(|c| matches!(c, Call::RemoveBucket(_))));

    assert_eq!(report.batches_flushed, 1);
    assert_eq!(report.failed_batches.len(), 1);
    assert_eq!(
        report.failed_batches[0].keys,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert!(report.failed_batches[0].message.contains("simulated store fault"));
    assert_eq!(report.keys_left_behind(), 3);
}

// ==================== Transfers ====================

#[tokio::test]
async fn upload_then_download_round_trips_bytes() {
    let store = MemoryStore::new();
    let svc = service(store.clone());

    let key = svc
        .upload(
            Some("media".to_string()),
            Some("notes.txt".to_string()),
            payload(b"the quick brown fox"),
        )
        .await
        .unwrap();
    assert_eq!(key, "notes.txt");

    let (data, content_type) = svc.download("media", "notes.txt").await.unwrap();
    assert_eq!(&data[..], b"the quick brown fox");
    assert_eq!(content_type, "application/octet-stream");
}

#[tokio::test]
async fn upload_overwrites_existing_object() {
    let store = MemoryStore::new().with_bucket("media", &["notes.txt"]);
    let svc = service(store.clone());

    svc.replace("media", "notes.txt", payload(b"second version"))
        .await
        .unwrap();

    assert_eq!(
        store.object("media", "notes.txt").unwrap(),
        Bytes::from_static(b"second version")
    );
}

#[tokio::test]
async fn upload_with_empty_body_is_rejected_before_any_store_call() {
    let store = MemoryStore::new();
    let err = service(store.clone())
        .upload(None, None, payload(b""))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn upload_without_names_uses_defaults() {
    let store = MemoryStore::new();
    let key = service(store.clone())
        .upload(None, None, payload(b"payload"))
        .await
        .unwrap();

    assert!(key.starts_with("uploaded-file-"));
    assert_eq!(store.bucket_names(), vec!["uploads".to_string()]);
    // Bucket was created on demand: existence check first, then creation.
    let calls = store.calls();
    assert_eq!(calls[0], Call::BucketExists("uploads".to_string()));
    assert_eq!(calls[1], Call::MakeBucket("uploads".to_string()));
}

#[tokio::test]
async fn download_of_missing_key_is_not_found() {
    let store = MemoryStore::new().with_bucket("media", &[]);
    let err = service(store)
        .download("media", "never-written")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn download_of_delete_marked_object_is_not_found() {
    let store = MemoryStore::new().with_bucket("media", &["ghost"]);
    store.mark_deleted("media", "ghost");

    let err = service(store.clone()).download("media", "ghost").await.unwrap_err();
    assert!(err.is_not_found());
    // Stat decided the outcome; no content fetch was issued.
    assert!(!store.calls().iter().any(|c| matches!(c, Call::Get(_, _))));
}

// ==================== Deletion ====================

#[tokio::test]
async fn delete_object_stats_then_removes() {
    let store = MemoryStore::new().with_bucket("media", &["old.log"]);
    service(store.clone())
        .delete_object("media", "old.log")
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![
            Call::Stat("media".to_string(), "old.log".to_string()),
            Call::RemoveObject("media".to_string(), "old.log".to_string()),
        ]
    );
    assert!(store.object("media", "old.log").is_none());
}

#[tokio::test]
async fn delete_of_missing_object_makes_no_remove_call() {
    let store = MemoryStore::new().with_bucket("media", &[]);
    let err = service(store.clone())
        .delete_object("media", "missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!store
        .calls()
        .iter()
        .any(|c| matches!(c, Call::RemoveObject(_, _))));
}

// ==================== Presign and listing ====================

#[tokio::test]
async fn presign_never_checks_object_existence() {
    let store = MemoryStore::new();
    let grant = service(store.clone())
        .presign_download("media", "future-object")
        .await
        .unwrap();

    assert_eq!(grant.expires_in, Duration::from_secs(24 * 60 * 60));
    assert!(grant.url.contains("media/future-object"));
    assert_eq!(
        store.calls(),
        vec![Call::Presign("media".to_string(), "future-object".to_string())]
    );
}

#[tokio::test]
async fn presign_rejects_blank_names_locally() {
    let store = MemoryStore::new();
    let err = service(store.clone())
        .presign_download("", "key")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn list_objects_returns_every_key() {
    let store = MemoryStore::new().with_bucket("media", &["a.txt", "b.txt"]);
    let keys = service(store).list_objects("media").await.unwrap();
    assert_eq!(keys, vec!["a.txt".to_string(), "b.txt".to_string()]);
}

#[tokio::test]
async fn list_buckets_returns_names_and_creation_times() {
    let store = MemoryStore::new()
        .with_bucket("alpha", &[])
        .with_bucket("beta", &[]);
    let buckets = service(store).list_buckets().await.unwrap();
    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

// ==================== Bucket creation race ====================

#[tokio::test]
async fn concurrent_ensure_bucket_leaves_one_bucket_and_no_error() {
    let store = MemoryStore::new();
    let svc = Arc::new(service(store.clone()));

    let a = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.upload(None, None, payload(b"one")).await })
    };
    let b = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.upload(None, None, payload(b"two")).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(store.bucket_names(), vec!["uploads".to_string()]);
}
