//! Group Module
//!
//! Cache groups, the loaders behind them and the registry that names them.

mod cache_group;
mod loader;
mod registry;

pub use cache_group::{CacheGroup, GroupBuilder};
pub use loader::{Loader, LoaderFn};
pub use registry::GroupRegistry;
