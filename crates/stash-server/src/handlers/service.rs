//! Service-level handlers

use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use stash_gateway::BucketInfo;
use std::sync::Arc;

/// GET /s3 - List all buckets visible to the store credentials
pub async fn list_buckets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BucketInfo>>, ApiError> {
    let buckets = state.service.list_buckets().await?;
    Ok(Json(buckets))
}
