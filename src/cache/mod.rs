//! Cache Module
//!
//! Local storage for a cache group: a byte-bounded LRU store, the immutable
//! value type it holds, and the thread-safe wrapper groups use.

mod byte_view;
mod concurrent;
mod lru;


// Re-export public types
pub use byte_view::ByteView;
pub use concurrent::ConcurrentCache;
pub use lru::{CacheValue, LruStore, OnEvicted};
