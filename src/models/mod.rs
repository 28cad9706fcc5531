//! Response models for the HTTP layer
//!
//! JSON bodies returned next to the raw value bytes: health checks and
//! error reports.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse};
