//! Peer Cache - A distributed read-through cache node
//!
//! Serves one demo group backed by a slow in-memory database.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::api::{create_api_router, create_peer_router};
use peer_cache::{AppState, CacheGroup, Config, GroupRegistry, HttpPool, Loader};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the demo group in a fresh registry
/// 4. Build the peer pool and attach it to the group
/// 5. Start the peer server, and the public API when enabled
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peer Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, peer_port={}, api_enabled={}, cache_bytes={}",
        config.self_addr, config.peers, config.peer_port, config.api_enabled, config.cache_bytes
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.create(
        CacheGroup::builder(config.group_name.clone())
            .cache_bytes(config.cache_bytes)
            .loader(SlowDb::new()),
    )?;

    info!("Groups registered: {:?}", registry.names());

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr.clone(),
        &config.base_path,
        config.replicas,
        config.peer_timeout(),
    )?);
    pool.set_peers(config.peers.clone());
    group.register_peers(pool.clone())?;

    let state = AppState::new(registry);

    let api_server = if config.api_enabled {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding api server to {}", addr))?;
        info!("Public API listening on http://{}", addr);

        let app = create_api_router(state.clone());
        Some(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        }))
    } else {
        None
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.peer_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding peer server to {}", addr))?;
    info!("Peer server listening on http://{}{}", addr, pool.base_path());

    axum::serve(listener, create_peer_router(state, pool.base_path()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("peer server failed")?;

    if let Some(handle) = api_server {
        handle.await?.context("api server failed")?;
    }

    info!("Node shutdown complete");
    Ok(())
}

/// Small in-memory table that answers slowly, standing in for a real
/// database.
struct SlowDb {
    scores: HashMap<&'static str, &'static str>,
}

impl SlowDb {
    fn new() -> Self {
        Self {
            scores: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
        }
    }
}

#[async_trait]
impl Loader for SlowDb {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        info!("[SlowDB] search key {}", key);
        self.scores
            .get(key)
            .map(|value| value.as_bytes().to_vec())
            .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
