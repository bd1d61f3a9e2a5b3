//! S3-compatible store client
//!
//! [`ObjectStore`] implementation over `aws-sdk-s3`, pointed at a custom
//! endpoint with path-style addressing so it works against MinIO and other
//! S3-compatible stores as well as AWS itself.

use crate::{
    BucketInfo, ByteChunks, KeyStream, ObjectStat, ObjectStore, StoreError, TransferPayload,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::BytesMut;
use futures::channel::mpsc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the remote store
#[derive(Clone, Debug)]
pub struct S3Config {
    /// Store endpoint URL
    pub endpoint: String,
    /// Region name (S3-compatible stores usually accept anything)
    pub region: String,
    /// Access key
    pub access_key: String,
    /// Secret key
    pub secret_key: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
        }
    }
}

/// Object store backed by an S3-compatible service
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint
    pub fn connect(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key,
            config.secret_key,
            None,
            None,
            "stash-gateway",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .endpoint_url(config.endpoint)
            .credentials_provider(credentials)
            // MinIO serves buckets as path segments, not subdomains
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
        }
    }

    /// Wrap an already-configured SDK client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Flatten an SDK error into the opaque store error, keeping the full
/// error context in the message.
fn store_err<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    StoreError::new(DisplayErrorContext(&err))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            // Two concurrent creations can both observe "missing" first;
            // treat the loser's error as success.
            Err(e)
                if e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                }) =>
            {
                debug!(bucket, "bucket already present, creation treated as no-op");
                Ok(())
            }
            Err(e) => Err(store_err(e)),
        }
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StoreError> {
        let resp = self.client.list_buckets().send().await.map_err(store_err)?;

        Ok(resp
            .buckets()
            .iter()
            .filter_map(|b| {
                let name = b.name()?.to_string();
                let created_at = b
                    .creation_date()
                    .and_then(|d| chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos()))
                    .unwrap_or_default();
                Some(BucketInfo { name, created_at })
            })
            .collect())
    }

    fn list_objects(&self, bucket: &str) -> KeyStream {
        let client = self.client.clone();
        let bucket = bucket.to_string();

        // One page per unfold step, flattened into a key-at-a-time stream.
        // The cursor state dies with the stream, so early drop is cheap.
        let pages = stream::try_unfold(
            (client, bucket, None::<String>, false),
            |(client, bucket, token, done)| async move {
                if done {
                    return Ok(None);
                }

                let mut req = client.list_objects_v2().bucket(&bucket);
                if let Some(token) = &token {
                    req = req.continuation_token(token);
                }
                let resp = req.send().await.map_err(store_err)?;

                let keys: Vec<String> = resp
                    .contents()
                    .iter()
                    .filter_map(|o| o.key().map(String::from))
                    .collect();
                let next = resp.next_continuation_token().map(String::from);
                let done = next.is_none();

                Ok(Some((keys, (client, bucket, next, done))))
            },
        );

        pages
            .map_ok(|keys| stream::iter(keys.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    async fn stat_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStat>, StoreError> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(head) => Ok(Some(ObjectStat {
                size: head.content_length().unwrap_or(0).max(0) as u64,
                content_type: head.content_type().map(String::from),
                delete_marker: head.delete_marker().unwrap_or(false),
            })),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(None),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: TransferPayload,
    ) -> Result<(), StoreError> {
        let TransferPayload {
            mut body,
            length,
            content_type,
        } = payload;

        let mut buf = BytesMut::with_capacity(length as usize);
        while let Some(chunk) = body.try_next().await? {
            buf.extend_from_slice(&chunk);
        }

        if buf.len() as u64 != length {
            return Err(StoreError::new(format!(
                "declared length {} does not match payload of {} bytes",
                length,
                buf.len()
            )));
        }

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(buf.freeze()))
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(store_err)?;

        // Pump the SDK body into a channel so the caller sees a plain chunk
        // pipe that completes on end-of-stream or error.
        let (tx, rx) = mpsc::unbounded();
        let mut body = resp.body;
        tokio::spawn(async move {
            loop {
                match body.try_next().await {
                    Ok(Some(chunk)) => {
                        if tx.unbounded_send(Ok(chunk)).is_err() {
                            // Receiver dropped; stop reading.
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.unbounded_send(Err(StoreError::new(e)));
                        break;
                    }
                }
            }
        });

        Ok(rx.boxed())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError> {
        let identifiers = keys
            .iter()
            .map(|key| {
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(StoreError::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(StoreError::new)?;

        let resp = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(store_err)?;

        // A 200 response can still carry per-key failures.
        let errors = resp.errors();
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.key().unwrap_or("<unknown key>"),
                        e.message().unwrap_or("unspecified error")
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::new(format!(
                "{} of {} keys not deleted ({detail})",
                errors.len(),
                keys.len()
            )));
        }

        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StoreError> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(StoreError::new)?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(store_err)?;

        Ok(presigned.uri().to_string())
    }
}
