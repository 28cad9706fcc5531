//! Concurrent Cache Module
//!
//! Thread-safe wrapper around a lazily allocated [`LruStore`].

use parking_lot::Mutex;

use crate::cache::{ByteView, LruStore, OnEvicted};

/// State behind the lock. The store is allocated on the first `add`; the
/// eviction callback waits here until then.
struct Slot {
    lru: Option<LruStore<ByteView>>,
    on_evicted: Option<OnEvicted<ByteView>>,
}

// == Concurrent Cache ==
/// Serializes access to one [`LruStore`] behind a single mutex.
///
/// Recency order and byte accounting change together on every call, so the
/// whole store is locked for the duration of each operation. Only O(1)
/// in-memory work happens under the lock.
pub struct ConcurrentCache {
    cache_bytes: usize,
    slot: Mutex<Slot>,
}

impl ConcurrentCache {
    // == Constructors ==
    /// Creates a cache with a budget of `cache_bytes` (0 = unbounded).
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            slot: Mutex::new(Slot {
                lru: None,
                on_evicted: None,
            }),
        }
    }

    /// Creates a cache whose store will report evictions to `on_evicted`.
    pub fn with_eviction(cache_bytes: usize, on_evicted: OnEvicted<ByteView>) -> Self {
        Self {
            cache_bytes,
            slot: Mutex::new(Slot {
                lru: None,
                on_evicted: Some(on_evicted),
            }),
        }
    }

    // == Add ==
    /// Stores `value` under `key`, allocating the store on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut slot = self.slot.lock();
        let Slot { lru, on_evicted } = &mut *slot;

        let lru = lru.get_or_insert_with(|| match on_evicted.take() {
            Some(callback) => LruStore::with_eviction(self.cache_bytes, callback),
            None => LruStore::new(self.cache_bytes),
        });
        lru.add(key, value);
    }

    // == Get ==
    /// Looks up `key`. An unallocated store is a miss and stays unallocated.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut slot = self.slot.lock();
        slot.lru.as_mut()?.get(key).cloned()
    }

    // == Inspection ==
    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.slot.lock().lru.as_ref().map_or(0, LruStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the backing store has been allocated yet.
    pub fn is_allocated(&self) -> bool {
        self.slot.lock().lru.is_some()
    }
}

impl std::fmt::Debug for ConcurrentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentCache")
            .field("cache_bytes", &self.cache_bytes)
            .field("entries", &self.len())
            .finish()
    }
}
