//! BGS Sensor MCP - SensorThings tools for AI agents
//!
//! This crate exposes the British Geological Survey FROST server (an OGC
//! SensorThings API v1.1 service) as a set of MCP tools: sensor discovery,
//! sensor details, datastreams, observations, locations, observed
//! properties, sensor hardware, features of interest and service metadata.
//!
//! # Architecture
//!
//! ```text
//! MCP client ──▶ transport (SSE / POST /mcp / stdio)
//!                     │
//!                     ▼
//!                McpServer ──▶ ToolRegistry ──▶ SensorService / DocumentSearch
//!                                                     │
//!                                                     ▼
//!                                 QueryOptions ──▶ FrostClient ──▶ FROST API
//!                                                     │
//!                                                     ▼
//!                                          projection (JSON envelopes)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bgs_sensor_mcp::config::ServiceConfig;
//! use bgs_sensor_mcp::sensors::params::SearchParams;
//! use bgs_sensor_mcp::sensors::SensorService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SensorService::from_config(ServiceConfig::default())?;
//!
//!     let params = SearchParams {
//!         query: Some("borehole".to_string()),
//!         ..SearchParams::default()
//!     };
//!     println!("{}", service.search_sensors(&params).await?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod cors;
pub mod error;
pub mod frost;
pub mod handlers;
pub mod mcp;
pub mod sensors;

// Re-exports for convenience
pub use config::{ServerConfig, ServiceConfig};
pub use error::{Error, Result};
pub use frost::FrostClient;
pub use mcp::{McpServer, McpTool, ToolSurface};
pub use sensors::{DocumentSearch, SensorService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
