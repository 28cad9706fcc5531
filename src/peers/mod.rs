//! Peers Module
//!
//! Routing of keys to the node that owns them and fetching values from it.
//!
//! # Components
//! - `PeerPicker`: chooses the owning peer for a key
//! - `PeerGetter`: fetches a value for a group and key from one peer
//! - `HashRing`: consistent hash ring behind peer selection
//! - `HttpPool`: HTTP realization of both sides of the peer protocol

mod http;
mod ring;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use http::{HttpGetter, HttpPool, DEFAULT_BASE_PATH, DEFAULT_PEER_TIMEOUT, DEFAULT_REPLICAS};
pub use ring::{HashFn, HashRing};

/// Chooses which peer owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote peer owning `key`, or None when the key should be
    /// resolved on this node (no peers, or the owner is this node).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches values from a single remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches the value of `key` in the peer's group `group`.
    async fn get(&self, group: &str, key: &str) -> Result<Bytes>;
}
