//! # Stash Gateway
//!
//! Object-lifecycle gateway core over a remote S3-compatible object store
//! (MinIO, AWS S3, and friends). The crate maps storage intents — upload,
//! download, delete, presign, listing, bucket teardown — onto a narrow
//! [`ObjectStore`] capability interface and normalizes every outcome into a
//! small error taxonomy.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stash_gateway::{GatewayService, S3Config, S3ObjectStore, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = S3ObjectStore::connect(S3Config {
//!         endpoint: "http://localhost:9000".to_string(),
//!         ..Default::default()
//!     });
//!     let service = GatewayService::new(Arc::new(store), ServiceConfig::default());
//!
//!     let grant = service.presign_download("my-bucket", "report.pdf").await?;
//!     println!("{}", grant.url);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod lifecycle;
mod s3;
mod service;
mod store;
mod transfer;
mod types;

pub use error::{GatewayError, Result, StoreError};
pub use lifecycle::BucketLifecycleManager;
pub use s3::{S3Config, S3ObjectStore};
pub use service::{GatewayService, ServiceConfig, DOWNLOAD_CONTENT_TYPE, PRESIGN_EXPIRY};
pub use store::ObjectStore;
pub use transfer::TransferExecutor;
pub use types::{
    BatchFailure, BucketInfo, ByteChunks, KeyStream, ObjectStat, PresignedDownload,
    TeardownReport, TransferPayload,
};
