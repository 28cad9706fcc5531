//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::peers::{DEFAULT_BASE_PATH, DEFAULT_PEER_TIMEOUT, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address other nodes reach this node at; must appear in `peers`
    pub self_addr: String,
    /// Every node of the cluster, this one included
    pub peers: Vec<String>,
    /// Port of the peer protocol server
    pub peer_port: u16,
    /// Port of the public API server
    pub api_port: u16,
    /// Whether to start the public API server
    pub api_enabled: bool,
    /// Byte budget of the demo group's local cache (0 = unbounded)
    pub cache_bytes: usize,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Upper bound on one remote fetch, in milliseconds
    pub peer_timeout_ms: u64,
    /// Path prefix of the peer protocol
    pub base_path: String,
    /// Name of the demo group
    pub group_name: String,
}

const DEFAULT_SELF_ADDR: &str = "http://localhost:8001";

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - This node's address (default: http://localhost:8001)
    /// - `PEERS` - Comma-separated node addresses (default: SELF_ADDR only)
    /// - `PEER_PORT` - Peer protocol port (default: 8001)
    /// - `API_PORT` - Public API port (default: 9999)
    /// - `API_ENABLED` - Start the public API (default: false)
    /// - `CACHE_BYTES` - Local cache budget in bytes (default: 2048)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `PEER_TIMEOUT_MS` - Remote fetch timeout in ms (default: 3000)
    /// - `BASE_PATH` - Peer protocol prefix (default: /_gocache/)
    /// - `GROUP_NAME` - Demo group name (default: scores)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let self_addr = env::var("SELF_ADDR").unwrap_or(defaults.self_addr);
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            self_addr,
            peers,
            peer_port: env::var("PEER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.peer_port),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_port),
            api_enabled: env::var("API_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_enabled),
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            replicas: env::var("REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.replicas),
            peer_timeout_ms: env::var("PEER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.peer_timeout_ms),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_addr: DEFAULT_SELF_ADDR.to_string(),
            peers: vec![DEFAULT_SELF_ADDR.to_string()],
            peer_port: 8001,
            api_port: 9999,
            api_enabled: false,
            cache_bytes: 2 << 10,
            replicas: DEFAULT_REPLICAS,
            peer_timeout_ms: DEFAULT_PEER_TIMEOUT.as_millis() as u64,
            base_path: DEFAULT_BASE_PATH.to_string(),
            group_name: "scores".to_string(),
        }
    }
}

/// Splits a comma-separated peer list, dropping blanks.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.self_addr, "http://localhost:8001");
        assert_eq!(config.peers, vec!["http://localhost:8001".to_string()]);
        assert_eq!(config.peer_port, 8001);
        assert_eq!(config.api_port, 9999);
        assert!(!config.api_enabled);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.peer_timeout_ms, 3000);
        assert_eq!(config.peer_timeout(), Duration::from_secs(3));
        assert_eq!(config.base_path, "/_gocache/");
        assert_eq!(config.group_name, "scores");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "SELF_ADDR",
            "PEERS",
            "PEER_PORT",
            "API_PORT",
            "API_ENABLED",
            "CACHE_BYTES",
            "REPLICAS",
            "PEER_TIMEOUT_MS",
            "BASE_PATH",
            "GROUP_NAME",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.self_addr, "http://localhost:8001");
        assert_eq!(config.peers, vec!["http://localhost:8001".to_string()]);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.peer_timeout_ms, 3000);
    }

    #[test]
    fn test_parse_peers() {
        let peers = parse_peers(" http://a:8001, ,http://b:8002,");
        assert_eq!(
            peers,
            vec!["http://a:8001".to_string(), "http://b:8002".to_string()]
        );
        assert!(parse_peers("").is_empty());
    }
}
