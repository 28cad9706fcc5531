//! Consistent hash ring with virtual nodes
//!
//! Maps arbitrary keys onto a set of peer names. Every peer is placed on the
//! ring `replicas` times so load stays even with only a handful of peers.
//!
//! The ring has no internal locking and no removal: callers that change
//! membership build a fresh ring under their own lock.

use std::collections::HashMap;
use std::fmt;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Consistent hash ring.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash -> peer name
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring hashing with CRC-32 (IEEE).
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, Box::new(crc32fast::hash))
    }

    /// Creates an empty ring with a custom hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Places each peer on the ring `replicas` times.
    ///
    /// Virtual node `i` of peer `p` sits at `hash("{i}{p}")`.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.keys.push(hash);
                self.owners.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the peer owning `key`, or None when the ring is empty.
    ///
    /// The owner is the first virtual node at or after the key's hash,
    /// wrapping around to the start of the ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&node| node < hash);
        let node = self.keys[idx % self.keys.len()];

        self.owners.get(&node).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.keys.len())
            .finish()
    }
}
