//! API Handlers
//!
//! HTTP request handlers for the peer protocol and the public API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::HealthResponse;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    /// Creates a new AppState around the given registry.
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }
}

/// Handler for GET <base_path>:group/:key and GET /api/:group/:key
///
/// Looks up the group and key and answers with the raw value bytes. Other
/// nodes of the cluster and public clients share this path.
pub async fn get_value_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response> {
    let group = state
        .registry
        .get(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;

    let view = group.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.bytes(),
    )
        .into_response())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
