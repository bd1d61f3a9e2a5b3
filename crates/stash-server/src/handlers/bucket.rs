//! Bucket-level handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for bucket teardown
#[derive(Debug, Deserialize)]
pub struct TeardownParams {
    /// Batch pack size; falls back to the configured default
    pub pack_size: Option<usize>,
}

/// GET /s3/{bucket}/files - List every object key in the bucket
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    Path(bucket): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let keys = state.service.list_objects(&bucket).await?;
    Ok(Json(keys))
}

/// DELETE /s3/{bucket} - Drain and remove the whole bucket
///
/// Per-batch delete failures are best-effort: they are logged and the
/// teardown still reports success, matching the gateway contract.
pub async fn teardown_bucket(
    State(state): State<Arc<AppState>>,
    Path(bucket): Path<String>,
    Query(params): Query<TeardownParams>,
) -> Result<StatusCode, ApiError> {
    let report = state
        .service
        .teardown_bucket(&bucket, params.pack_size)
        .await?;

    if !report.is_clean() {
        tracing::warn!(
            bucket,
            failed_batches = report.failed_batches.len(),
            keys_left = report.keys_left_behind(),
            "bucket teardown left objects behind"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}
