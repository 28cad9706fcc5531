//! LRU Store Module
//!
//! Byte-bounded key/value storage with least-recently-used eviction.
//! Not thread-safe on its own, see [`ConcurrentCache`](crate::cache::ConcurrentCache).

use std::collections::HashMap;
use std::fmt;

// == Cache Value ==
/// Values stored in an [`LruStore`] report their size in bytes for budget
/// accounting.
pub trait CacheValue {
    /// Size of the value in bytes.
    fn byte_len(&self) -> usize;
}

impl CacheValue for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl CacheValue for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

/// Callback run once for every entry removed by eviction.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

/// Bytes an entry counts against the budget: key length plus value length.
fn entry_size<V: CacheValue>(key: &str, value: &V) -> usize {
    key.len() + value.byte_len()
}

// == Node ==
/// Entry in the recency list. `prev` points towards the most recently used
/// end, `next` towards the least recently used end.
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Store ==
/// Recency-ordered store with a byte budget.
///
/// Entries live in a vector linked into a doubly-linked list by index:
/// - `head` = Most recently used
/// - `tail` = Least recently used
///
/// `index` maps every key to its slot, so lookups, promotions and evictions
/// are all O(1). A `max_bytes` of 0 disables eviction.
pub struct LruStore<V> {
    max_bytes: usize,
    current_bytes: usize,
    nodes: Vec<Node<V>>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: CacheValue> LruStore<V> {
    // == Constructors ==
    /// Creates an empty store holding at most `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current_bytes: 0,
            nodes: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates an empty store that reports every evicted entry to `on_evicted`.
    pub fn with_eviction(max_bytes: usize, on_evicted: OnEvicted<V>) -> Self {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(on_evicted);
        store
    }

    // == Add ==
    /// Inserts or replaces `key`, marking it most recently used.
    ///
    /// Evicts from the least recently used end until the byte budget holds
    /// again, which may include the entry just written when it alone exceeds
    /// the budget.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            let node = &mut self.nodes[idx];
            self.current_bytes = self.current_bytes - node.value.byte_len() + value.byte_len();
            node.value = value;
        } else {
            let idx = self.nodes.len();
            self.current_bytes += entry_size(&key, &value);
            self.index.insert(key.clone(), idx);
            self.nodes.push(Node {
                key,
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.current_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.nodes[idx].value)
    }

    // == Remove Oldest ==
    /// Removes the least recently used entry and hands it to the eviction
    /// callback.
    ///
    /// Returns the removed entry, or None if the store is empty.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        let node = self.detach(idx);

        self.index.remove(&node.key);
        self.current_bytes -= entry_size(&node.key, &node.value);

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }

        Some((node.key, node.value))
    }

    // == Inspection ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks for `key` without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Bytes currently accounted against the budget.
    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    // == List Maintenance ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;

        match self.head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    /// Unlinks the node at `idx` and takes it out of the slot vector.
    ///
    /// The last slot is swapped into the hole, so its neighbours and index
    /// entry are repointed at `idx`.
    fn detach(&mut self, idx: usize) -> Node<V> {
        self.unlink(idx);
        let node = self.nodes.swap_remove(idx);

        if idx < self.nodes.len() {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

            match prev {
                Some(prev) => self.nodes[prev].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(next) => self.nodes[next].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        node
    }
}

impl<V> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("entries", &self.nodes.len())
            .field("current_bytes", &self.current_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
