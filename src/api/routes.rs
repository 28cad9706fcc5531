//! API Routes
//!
//! Configures the Axum routers for the peer protocol and the public API.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{get_value_handler, health_handler, AppState};

/// Creates the router other nodes fetch values from.
///
/// # Endpoints
/// - `GET <base_path>:group/:key` - Raw value bytes for a key in a group
///
/// `base_path` must start and end with `/` (see [`HttpPool::base_path`]).
///
/// [`HttpPool::base_path`]: crate::peers::HttpPool::base_path
pub fn create_peer_router(state: AppState, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{}:group/:key", base_path), get(get_value_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the public API router.
///
/// # Endpoints
/// - `GET /api/:group/:key` - Read-through lookup of a key
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/:group/:key", get(get_value_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::group::{CacheGroup, GroupRegistry, LoaderFn};
    use crate::peers::DEFAULT_BASE_PATH;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .create(
                CacheGroup::builder("scores")
                    .cache_bytes(1024)
                    .loader(LoaderFn::new(|key: String| async move {
                        match key.as_str() {
                            "Tom" => Ok(b"630".to_vec()),
                            "a/b" => Ok(b"slash".to_vec()),
                            _ => Err(anyhow::anyhow!("{} not exist", key)),
                        }
                    })),
            )
            .unwrap();
        AppState::new(registry)
    }

    async fn get_status(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_peer_endpoint() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, body) = get_status(app, "/_gocache/scores/Tom").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"630".to_vec());
    }

    #[tokio::test]
    async fn test_peer_endpoint_decodes_key() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, body) = get_status(app, "/_gocache/scores/a%2Fb").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"slash".to_vec());
    }

    #[tokio::test]
    async fn test_peer_endpoint_unknown_group() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, _) = get_status(app, "/_gocache/nope/Tom").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_peer_endpoint_loader_failure() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, body) = get_status(app, "/_gocache/scores/kkk").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "kkk not exist");
    }

    #[tokio::test]
    async fn test_api_endpoint() {
        let app = create_api_router(test_state());

        let (status, body) = get_status(app, "/api/scores/Tom").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"630".to_vec());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_api_router(test_state());

        let (status, _) = get_status(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let app = create_peer_router(test_state(), "/cache/");

        let (status, _) = get_status(app, "/cache/scores/Tom").await;

        assert_eq!(status, StatusCode::OK);
    }
}
