//! In-Flight Request Module
//!
//! Single-flight deduplication of concurrent loads.
//!
//! # Components
//! - RequestCoalescer: runs one execution per key while calls overlap

mod coalescer;

pub use coalescer::RequestCoalescer;
