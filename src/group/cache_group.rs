//! Cache Group Module
//!
//! A named cache namespace: local LRU cache, peer routing and loader
//! fallback tied together behind a single `get`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, ConcurrentCache, OnEvicted};
use crate::error::{CacheError, Result};
use crate::flight::RequestCoalescer;
use crate::group::Loader;
use crate::peers::{PeerGetter, PeerPicker};

// == Cache Group ==
/// A cache namespace.
///
/// Lookups go through these steps:
/// 1. Local cache hit: return it
/// 2. Miss: join or start the coalesced load for the key
/// 3. A remote owner picked by the peer locator: fetch from it, and return
///    without caching locally (the owner caches it)
/// 4. Otherwise, or when the remote fetch fails: run the loader and cache
///    the result locally
pub struct CacheGroup {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: RequestCoalescer<Result<ByteView>>,
}

impl CacheGroup {
    /// Starts building a group called `name`.
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// An empty key is rejected before the cache or loader is touched.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    // == Register Peers ==
    /// Installs the peer locator used to route misses.
    ///
    /// A group accepts exactly one locator; a second call is a configuration
    /// error.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "peer locator already registered for group '{}'",
                self.name
            ))
        })
    }

    /// Number of entries held in this node's cache.
    pub fn cached_entries(&self) -> usize {
        self.main_cache.len()
    }

    // == Load ==
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight
            .run(key, || async move {
                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            warn!(group = %self.name, key, error = %err, "failed to get from peer")
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::new(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        debug!(group = %self.name, key, "loading locally");
        let bytes = self.loader.load(key).await.map_err(CacheError::loader)?;

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for CacheGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGroup")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Group Builder ==
/// Configures a [`CacheGroup`].
///
/// `build` fails with [`CacheError::Config`] when no loader was given.
pub struct GroupBuilder {
    name: String,
    cache_bytes: usize,
    loader: Option<Arc<dyn Loader>>,
    on_evicted: Option<OnEvicted<ByteView>>,
}

impl GroupBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_bytes: 0,
            loader: None,
            on_evicted: None,
        }
    }

    /// Byte budget of the local cache (0 = unbounded).
    pub fn cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Uses a loader shared with other groups.
    pub fn shared_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Called once for every entry the local cache evicts.
    pub fn on_evicted(mut self, on_evicted: impl FnMut(&str, &ByteView) + Send + 'static) -> Self {
        self.on_evicted = Some(Box::new(on_evicted));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(self) -> Result<CacheGroup> {
        if self.name.is_empty() {
            return Err(CacheError::Config("group name is required".to_string()));
        }
        let loader = self.loader.ok_or_else(|| {
            CacheError::Config(format!("group '{}' requires a loader", self.name))
        })?;

        let main_cache = match self.on_evicted {
            Some(on_evicted) => ConcurrentCache::with_eviction(self.cache_bytes, on_evicted),
            None => ConcurrentCache::new(self.cache_bytes),
        };

        Ok(CacheGroup {
            name: self.name,
            loader,
            main_cache,
            peers: OnceLock::new(),
            flight: RequestCoalescer::new(),
        })
    }
}
