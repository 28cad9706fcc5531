//! Peer Cache - A distributed read-through cache
//!
//! Each node keeps a byte-bounded LRU cache per named group. On a miss the
//! owning node is chosen on a consistent hash ring; other nodes fetch from it
//! over HTTP, and the owner loads from the source of truth. Concurrent loads
//! of the same key are coalesced into one.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod peers;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{CacheGroup, GroupBuilder, GroupRegistry, Loader, LoaderFn};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
