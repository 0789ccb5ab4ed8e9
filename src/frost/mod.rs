//! FROST / SensorThings API access
//!
//! Query construction, the HTTP client and the upstream entity types.

mod client;
/// Upstream entity types
pub mod model;
/// OData query construction
pub mod query;

pub use client::{FrostClient, Payload};
pub use query::{QueryOptions, ResultFormat};
