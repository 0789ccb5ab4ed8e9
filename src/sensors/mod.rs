//! Sensor data tools
//!
//! [`SensorService`] implements the multi-tool surface; [`DocumentSearch`]
//! adapts the same projections to the two-tool search/fetch convention.

pub mod documents;
pub mod params;
pub mod projection;
mod service;

pub use documents::{Document, DocumentSearch, SearchHit, SearchResults};
pub use service::SensorService;
