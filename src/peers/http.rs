//! HTTP Peer Pool
//!
//! Peer selection and remote fetching over HTTP. A peer is addressed by its
//! base URL (e.g. `http://10.0.0.2:8001`); values are fetched from
//! `<peer><base_path><group>/<key>`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::peers::{HashRing, PeerGetter, PeerPicker};

/// Path prefix of the peer protocol
pub const DEFAULT_BASE_PATH: &str = "/_gocache/";

/// Virtual nodes per peer on the hash ring
pub const DEFAULT_REPLICAS: usize = 50;

/// Upper bound on one remote fetch, connect to last body byte
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(3);

// == HTTP Getter ==
/// Fetches values from one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: Client,
}

impl HttpGetter {
    /// Creates a getter for the peer whose protocol root is `base_url`,
    /// e.g. `http://10.0.0.2:8001/_gocache/`.
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Builds the request URL. Group and key are each encoded as a single
    /// path segment, so keys may contain `/`.
    fn url(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            CacheError::Peer(format!("invalid peer url '{}': {}", self.base_url, err))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CacheError::Peer(format!("peer url '{}' cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty().push(group).push(key);
        }

        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Bytes> {
        let url = self.url(group, key)?;
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(CacheError::Peer(format!(
                "server returned: {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|err| CacheError::Peer(format!("reading response body: {}", err)))
    }
}

// == HTTP Pool ==
/// Ring state swapped as a whole by [`HttpPool::set_peers`].
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// The set of peers this node knows about.
///
/// Picks the owner of a key with a consistent hash ring. The ring is not
/// thread-safe, so it lives behind the pool's lock: lookups share it and
/// `set_peers` replaces it exclusively.
///
/// Peer addresses are compared without their trailing `/`, so
/// `http://a:8001` and `http://a:8001/` name the same node.
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    /// Creates a pool for the node reachable at `self_addr`, using the
    /// default base path, replica count and peer timeout.
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(
            self_addr,
            DEFAULT_BASE_PATH,
            DEFAULT_REPLICAS,
            DEFAULT_PEER_TIMEOUT,
        )
    }

    /// Creates a pool with explicit settings. `timeout` bounds every remote
    /// fetch; an elapsed fetch fails like any other peer error.
    pub fn with_options(
        self_addr: impl Into<String>,
        base_path: &str,
        replicas: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let self_addr: String = self_addr.into();
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| CacheError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            self_addr: normalize_addr(&self_addr),
            base_path: normalize_base_path(base_path),
            replicas,
            client,
            state: RwLock::new(PoolState {
                ring: HashRing::new(replicas),
                getters: HashMap::new(),
            }),
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    /// Base path, always with leading and trailing `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set Peers ==
    /// Replaces the whole peer set. The list should include this node.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| normalize_addr(&Into::<String>::into(peer)))
            .collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        info!(server = %self.self_addr, peers = ?peers, "peer set replaced");
    }

    /// Current peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.read().getters.keys().cloned().collect();
        peers.sort();
        peers
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();

        match state.ring.get(key) {
            Some(peer) if peer != self.self_addr => {
                debug!(server = %self.self_addr, peer, key, "pick peer");
                let getter = state.getters.get(peer)?.clone();
                Some(getter as Arc<dyn PeerGetter>)
            }
            _ => None,
        }
    }
}

fn normalize_addr(addr: &str) -> String {
    addr.trim().trim_end_matches('/').to_string()
}

fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF: &str = "http://localhost:8001";
    const PEERS: [&str; 3] = [
        "http://localhost:8001",
        "http://localhost:8002",
        "http://localhost:8003",
    ];

    #[test]
    fn test_empty_pool_picks_nothing() {
        let pool = HttpPool::new(SELF).unwrap();
        assert!(pool.pick_peer("Tom").is_none());
        assert!(pool.peers().is_empty());
    }

    #[test]
    fn test_only_self_picks_nothing() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set_peers([SELF]);

        for i in 0..50 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_pick_follows_ring_and_skips_self() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set_peers(PEERS);

        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(PEERS);

        let mut remote = 0;
        for i in 0..200 {
            let key = format!("key{}", i);
            let owner = ring.get(&key).unwrap();
            let picked = pool.pick_peer(&key);
            if owner == SELF {
                assert!(picked.is_none(), "{} belongs to self", key);
            } else {
                assert!(picked.is_some(), "{} belongs to {}", key, owner);
                remote += 1;
            }
        }
        assert!(remote > 0);
    }

    #[test]
    fn test_set_peers_replaces_membership() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set_peers(PEERS);
        assert_eq!(pool.peers().len(), 3);

        pool.set_peers([SELF]);
        assert_eq!(pool.peers(), vec![SELF.to_string()]);
        assert!(pool.pick_peer("anything").is_none());
    }

    #[test]
    fn test_base_path_normalized() {
        let pool = |base_path| {
            HttpPool::with_options(SELF, base_path, 10, DEFAULT_PEER_TIMEOUT).unwrap()
        };
        assert_eq!(HttpPool::new(SELF).unwrap().base_path(), "/_gocache/");
        assert_eq!(pool("cache").base_path(), "/cache/");
        assert_eq!(pool("/").base_path(), "/");
    }

    #[test]
    fn test_trailing_slash_still_recognizes_self() {
        let pool = HttpPool::new("http://localhost:8001").unwrap();
        pool.set_peers(["http://localhost:8001/"]);

        for i in 0..50 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
        assert_eq!(pool.peers(), vec![SELF.to_string()]);
    }

    #[test]
    fn test_self_addr_with_trailing_slash() {
        let pool = HttpPool::new("http://localhost:8001/").unwrap();
        assert_eq!(pool.self_addr(), SELF);

        pool.set_peers(PEERS);
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(PEERS);

        for i in 0..100 {
            let key = format!("key{}", i);
            let owned_by_self = ring.get(&key) == Some(SELF);
            assert_eq!(pool.pick_peer(&key).is_none(), owned_by_self, "{}", key);
        }
    }

    #[test]
    fn test_mixed_trailing_slashes_build_one_ring() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set_peers([
            "http://localhost:8001/",
            "http://localhost:8002",
            "http://localhost:8003//",
        ]);

        assert_eq!(pool.peers(), PEERS.map(str::to_string).to_vec());
    }

    #[test]
    fn test_getter_url_escapes_segments() {
        let getter = HttpGetter::new("http://10.0.0.1:8001/_gocache/", Client::new());

        let url = getter.url("scores", "a/b c").unwrap();

        assert_eq!(
            url.as_str(),
            "http://10.0.0.1:8001/_gocache/scores/a%2Fb%20c"
        );
    }

    #[test]
    fn test_getter_invalid_base_url() {
        let getter = HttpGetter::new("not a url", Client::new());
        assert!(matches!(
            getter.url("scores", "Tom"),
            Err(CacheError::Peer(_))
        ));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let pool =
            HttpPool::with_options(SELF, DEFAULT_BASE_PATH, 10, Duration::from_millis(100))
                .unwrap();
        pool.set_peers([addr]);
        let peer = pool.pick_peer("Tom").unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), peer.get("scores", "Tom"))
            .await
            .expect("fetch should give up on its own");

        assert!(matches!(result, Err(CacheError::Peer(_))));
        drop(listener);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_peer_error() {
        let getter = HttpGetter::new("http://127.0.0.1:1/_gocache/", Client::new());

        let result = getter.get("scores", "Tom").await;

        assert!(matches!(result, Err(CacheError::Peer(_))));
    }
}
