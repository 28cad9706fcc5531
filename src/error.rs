//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for cache groups, peers and the HTTP layer.
///
/// The type is `Clone` because a single coalesced load hands the same
/// result to every caller waiting on that key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Empty key passed to a group lookup
    #[error("key is required")]
    InvalidKey,

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// The user-supplied loader failed; shown as the loader reported it
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// Remote fetch from a peer failed
    #[error("peer request failed: {0}")]
    Peer(String),

    /// Setup-time misconfiguration
    #[error("configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Wraps a loader failure.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Peer(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) | CacheError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
