//! Group Registry Module
//!
//! Name -> group directory shared by the HTTP layers of one process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{CacheGroup, GroupBuilder};

// == Group Registry ==
/// Directory of the cache groups served by this process.
///
/// Groups are created once during startup and never removed. Lookups take
/// the read lock, creation the write lock. The registry is an ordinary value
/// passed to whatever needs it, so tests can each use their own.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<CacheGroup>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Create ==
    /// Builds the group and registers it under its name.
    ///
    /// Fails with [`CacheError::Config`] when the builder is incomplete or the
    /// name is already taken.
    pub fn create(&self, builder: GroupBuilder) -> Result<Arc<CacheGroup>> {
        let mut groups = self.groups.write();
        if groups.contains_key(builder.name()) {
            return Err(CacheError::Config(format!(
                "group '{}' already exists",
                builder.name()
            )));
        }

        let group = Arc::new(builder.build()?);
        groups.insert(group.name().to_string(), group.clone());
        info!(group = %group.name(), "cache group created");

        Ok(group)
    }

    // == Get ==
    /// Returns the group called `name`, or None if there is none.
    pub fn get(&self, name: &str) -> Option<Arc<CacheGroup>> {
        self.groups.read().get(name).cloned()
    }

    /// Names of all registered groups, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
