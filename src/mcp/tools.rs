//! MCP tool definitions and registry
//!
//! This module defines the sensor tools, their input schemas, and the
//! registry that routes `tools/call` to [`SensorService`] or
//! [`DocumentSearch`] depending on the configured [`ToolSurface`].

use crate::error::{Error, McpError, Result};
use crate::mcp::types::{McpToolDefinition, ToolCallResult};
use crate::sensors::params::{DocumentFetchParams, DocumentSearchParams};
use crate::sensors::{DocumentSearch, SensorService};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

/// A registered MCP tool
pub trait McpTool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;
    /// Tool description
    fn description(&self) -> &str;
    /// Input schema as JSON
    fn input_schema(&self) -> Value;
    /// Get tool definition
    fn definition(&self) -> McpToolDefinition {
        McpToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Which set of tools the server advertises
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ToolSurface {
    /// Every sensor tool, with `search`/`fetch` as aliases
    #[default]
    Full,
    /// Only the document-style `search` and `fetch`
    SearchFetch,
}

impl ToolSurface {
    /// Tool names advertised on this surface, in listing order
    pub fn tool_names(self) -> &'static [&'static str] {
        match self {
            ToolSurface::Full => AVAILABLE_TOOLS,
            ToolSurface::SearchFetch => SEARCH_FETCH_TOOLS,
        }
    }
}

/// Tool registry holding the tools of one surface
pub struct ToolRegistry {
    tools: Vec<Box<dyn McpTool>>,
    surface: ToolSurface,
    service: SensorService,
    documents: DocumentSearch,
}

impl ToolRegistry {
    /// Create a registry exposing `surface` over `service`
    pub fn new(service: SensorService, surface: ToolSurface) -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            surface,
            documents: DocumentSearch::new(service.clone()),
            service,
        };

        match surface {
            ToolSurface::Full => {
                registry.register(Box::new(SensorSearchTool { name: "search" }));
                registry.register(Box::new(SensorDetailTool { name: "fetch" }));
                registry.register(Box::new(SensorSearchTool {
                    name: "search_sensors",
                }));
                registry.register(Box::new(SensorDetailTool {
                    name: "get_sensor_details",
                }));
                registry.register(Box::new(DatastreamsTool));
                registry.register(Box::new(ObservationsTool));
                registry.register(Box::new(LocationsTool));
                registry.register(Box::new(ObservedPropertiesTool));
                registry.register(Box::new(HardwareTool));
                registry.register(Box::new(FeaturesTool));
                registry.register(Box::new(ApiInfoTool));
            }
            ToolSurface::SearchFetch => {
                registry.register(Box::new(DocumentSearchTool));
                registry.register(Box::new(DocumentFetchTool));
            }
        }

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Surface this registry was built for
    pub fn surface(&self) -> ToolSurface {
        self.surface
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<McpToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name
    #[instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: Value) -> ToolCallResult {
        info!("Executing tool: {}", name);

        if !self.tools.iter().any(|t| t.name() == name) {
            return ToolCallResult::error(McpError::ToolNotFound(name.to_string()).to_string());
        }

        // Clients may send `null` or omit arguments for parameterless tools
        let args = match args {
            Value::Null => json!({}),
            other => other,
        };

        match self.dispatch(name, args).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                error!(tool = name, "Tool failed: {}", e);
                ToolCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<String> {
        let svc = &self.service;

        match (self.surface, name) {
            (ToolSurface::SearchFetch, "search") => {
                let params: DocumentSearchParams = parse_args(name, args)?;
                self.documents.search_json(&params.query).await
            }
            (ToolSurface::SearchFetch, "fetch") => {
                let params: DocumentFetchParams = parse_args(name, args)?;
                self.documents.fetch_json(&params).await
            }
            (_, "search" | "search_sensors") => svc.search_sensors(&parse_args(name, args)?).await,
            (_, "fetch" | "get_sensor_details") => {
                svc.get_sensor_details(&parse_args(name, args)?).await
            }
            (_, "get_datastreams") => svc.get_datastreams(&parse_args(name, args)?).await,
            (_, "get_observations") => svc.get_observations(&parse_args(name, args)?).await,
            (_, "get_locations") => svc.get_locations(&parse_args(name, args)?).await,
            (_, "get_observed_properties") => {
                svc.get_observed_properties(&parse_args(name, args)?).await
            }
            (_, "get_sensors_hardware") => svc.get_sensors_hardware(&parse_args(name, args)?).await,
            (_, "get_features_of_interest") => {
                svc.get_features_of_interest(&parse_args(name, args)?).await
            }
            (_, "get_api_info") => svc.get_api_info().await,
            _ => Err(McpError::ToolNotFound(name.to_string()).into()),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        Error::Mcp(McpError::InvalidParams(format!(
            "invalid arguments for {}: {}",
            tool, e
        )))
    })
}

// ============================================================================
// Tool Definitions
// ============================================================================

const LIMIT_DESCRIPTION: &str = "Maximum number of results to return";

fn format_schema(default: &str) -> Value {
    json!({
        "type": "string",
        "enum": ["json", "geojson", "csv"],
        "description": format!("Output format (default: {})", default),
        "default": default
    })
}

fn limit_schema(default: u32) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": LIMIT_DESCRIPTION,
        "default": default
    })
}

/// Sensor discovery (`search` and `search_sensors`)
struct SensorSearchTool {
    name: &'static str,
}

impl McpTool for SensorSearchTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Search and discover sensors/things with free text, OData or geographic filtering"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Case-insensitive text matched against sensor name and description"
                },
                "limit": limit_schema(20),
                "filter": {
                    "type": "string",
                    "description": "Raw OData $filter expression"
                },
                "location_filter": {
                    "type": "string",
                    "description": "Bounding box 'lat1,lng1,lat2,lng2' or circle 'lat,lng,radius_km'"
                },
                "format": format_schema("json")
            }
        })
    }
}

/// Sensor details (`fetch` and `get_sensor_details`)
struct SensorDetailTool {
    name: &'static str,
}

impl McpTool for SensorDetailTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Get comprehensive details about a specific sensor"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sensor_id": {
                    "type": ["string", "integer"],
                    "description": "Thing identifier"
                },
                "include_datastreams": {
                    "type": "boolean",
                    "description": "Include datastreams with observed property and hardware (default: true)",
                    "default": true
                },
                "include_locations": {
                    "type": "boolean",
                    "description": "Include locations (default: true)",
                    "default": true
                },
                "include_observations": {
                    "type": "boolean",
                    "description": "Include the 10 most recent observations (default: false)",
                    "default": false
                }
            },
            "required": ["sensor_id"]
        })
    }
}

struct DatastreamsTool;

impl McpTool for DatastreamsTool {
    fn name(&self) -> &str {
        "get_datastreams"
    }

    fn description(&self) -> &str {
        "Get datastreams (measurement series) with observed property, unit and hardware"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sensor_id": {
                    "type": ["string", "integer"],
                    "description": "Only datastreams of this thing"
                },
                "property_name": {
                    "type": "string",
                    "description": "Substring of the observed property name"
                },
                "unit_name": {
                    "type": "string",
                    "description": "Substring of the unit of measurement name"
                },
                "limit": limit_schema(20),
                "filter": {
                    "type": "string",
                    "description": "Raw OData $filter expression"
                }
            }
        })
    }
}

struct ObservationsTool;

impl McpTool for ObservationsTool {
    fn name(&self) -> &str {
        "get_observations"
    }

    fn description(&self) -> &str {
        "Get sensor observations, newest first, optionally bounded in time"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "datastream_id": {
                    "type": ["string", "integer"],
                    "description": "Only observations of this datastream (takes precedence over sensor_id)"
                },
                "sensor_id": {
                    "type": ["string", "integer"],
                    "description": "Only observations of this thing"
                },
                "start_time": {
                    "type": "string",
                    "description": "Inclusive lower bound on phenomenonTime (ISO 8601)"
                },
                "end_time": {
                    "type": "string",
                    "description": "Inclusive upper bound on phenomenonTime (ISO 8601)"
                },
                "limit": limit_schema(50),
                "format": format_schema("json"),
                "aggregate": {
                    "type": "string",
                    "description": "Aggregation label echoed back in the result"
                }
            }
        })
    }
}

struct LocationsTool;

impl McpTool for LocationsTool {
    fn name(&self) -> &str {
        "get_locations"
    }

    fn description(&self) -> &str {
        "Get sensor locations, optionally within a bounding box or radius"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "bbox": {
                    "type": "string",
                    "description": "Bounding box 'lat1,lng1,lat2,lng2'"
                },
                "point": {
                    "type": "string",
                    "description": "Circle 'lat,lng,radius_km'"
                },
                "limit": limit_schema(20),
                "format": format_schema("geojson")
            }
        })
    }
}

struct ObservedPropertiesTool;

impl McpTool for ObservedPropertiesTool {
    fn name(&self) -> &str {
        "get_observed_properties"
    }

    fn description(&self) -> &str {
        "Get all available measurement types/properties"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {
                    "type": "string",
                    "description": "Text matched against property name and description"
                },
                "limit": limit_schema(50)
            }
        })
    }
}

struct HardwareTool;

impl McpTool for HardwareTool {
    fn name(&self) -> &str {
        "get_sensors_hardware"
    }

    fn description(&self) -> &str {
        "Get sensor hardware descriptions, filtered by manufacturer or model text"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "manufacturer": {
                    "type": "string",
                    "description": "Text matched against hardware name and description"
                },
                "model": {
                    "type": "string",
                    "description": "Text matched against hardware name and description"
                },
                "limit": limit_schema(20)
            }
        })
    }
}

struct FeaturesTool;

impl McpTool for FeaturesTool {
    fn name(&self) -> &str {
        "get_features_of_interest"
    }

    fn description(&self) -> &str {
        "Get features of interest (the things being observed)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {
                    "type": "string",
                    "description": "Text matched against feature name and description"
                },
                "geometry_type": {
                    "type": "string",
                    "description": "Exact GeoJSON geometry type, e.g. 'Point'"
                },
                "limit": limit_schema(20)
            }
        })
    }
}

struct ApiInfoTool;

impl McpTool for ApiInfoTool {
    fn name(&self) -> &str {
        "get_api_info"
    }

    fn description(&self) -> &str {
        "Get BGS FROST API capabilities and metadata"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }
}

/// `search` on the two-tool surface
struct DocumentSearchTool;

impl McpTool for DocumentSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search BGS sensors by free text; returns ids to pass to fetch"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search text"
                }
            },
            "required": ["query"]
        })
    }
}

/// `fetch` on the two-tool surface
struct DocumentFetchTool;

impl McpTool for DocumentFetchTool {
    fn name(&self) -> &str {
        "fetch"
    }

    fn description(&self) -> &str {
        "Fetch the full description of one sensor by id"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": ["string", "integer"],
                    "description": "Sensor id returned by search"
                }
            },
            "required": ["id"]
        })
    }
}

/// Tools on the full surface
pub const AVAILABLE_TOOLS: &[&str] = &[
    "search",
    "fetch",
    "search_sensors",
    "get_sensor_details",
    "get_datastreams",
    "get_observations",
    "get_locations",
    "get_observed_properties",
    "get_sensors_hardware",
    "get_features_of_interest",
    "get_api_info",
];

/// Tools on the two-tool surface
pub const SEARCH_FETCH_TOOLS: &[&str] = &["search", "fetch"];
