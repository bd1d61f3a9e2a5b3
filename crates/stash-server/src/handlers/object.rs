//! Object-level handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use stash_gateway::TransferPayload;
use std::sync::Arc;

/// Query parameters for object creation
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    /// Target bucket; falls back to the configured default
    pub bucket: Option<String>,
    /// Object name; falls back to a generated unique name
    pub name: Option<String>,
}

/// GET /s3/{bucket}/{key} - Issue a presigned download URL (24h expiry)
pub async fn presign_download(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let grant = state.service.presign_download(&bucket, &key).await?;
    Ok(grant.url)
}

/// POST /s3 - Upload a new object from a multipart form
pub async fn create_object(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateParams>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    let payload = TransferPayload::from_bytes(file.data, file.content_type);
    let key = state
        .service
        .upload(params.bucket, params.name, payload)
        .await?;
    Ok(key)
}

/// PUT /s3/{bucket}/{key} - Replace an object's content
pub async fn replace_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    let payload = TransferPayload::from_bytes(file.data, file.content_type);
    let key = state.service.replace(&bucket, &key, payload).await?;
    Ok(key)
}

/// GET /s3/file/{bucket}/{key} - Download an object's full content
pub async fn download_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (data, content_type) = state.service.download(&bucket, &key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{key}\""),
            ),
        ],
        data,
    )
        .into_response())
}

/// DELETE /s3/{bucket}/{key} - Delete one object
pub async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_object(&bucket, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

struct UploadedFile {
    data: Bytes,
    content_type: String,
}

/// Pull the `file` field out of a multipart form
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(String::from)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field.bytes().await?;
            return Ok(UploadedFile { data, content_type });
        }
    }
    Err(ApiError::bad_request("multipart field 'file' is required"))
}
