//! Request handlers

mod bucket;
mod object;
mod service;

pub use bucket::{list_objects, teardown_bucket};
pub use object::{create_object, delete_object, download_object, presign_download, replace_object};
pub use service::list_buckets;
