//! Tool arguments.
//!
//! Each struct mirrors one tool's input schema. Defaults match the values
//! advertised in the schemas.

use crate::frost::ResultFormat;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn default_limit() -> u32 {
    20
}

fn default_wide_limit() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_geojson() -> ResultFormat {
    ResultFormat::GeoJson
}

/// Accept ids given as JSON strings or numbers.
fn optional_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

/// Trimmed, non-empty id
pub(crate) fn present(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `search` / `search_sensors`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    /// Free text matched against name and description
    #[serde(default)]
    pub query: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Raw OData predicate
    #[serde(default)]
    pub filter: Option<String>,
    /// `lat1,lng1,lat2,lng2` or `lat,lng,radius_km`
    #[serde(default)]
    pub location_filter: Option<String>,
    /// Output format
    #[serde(default)]
    pub format: ResultFormat,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            limit: default_limit(),
            filter: None,
            location_filter: None,
            format: ResultFormat::Json,
        }
    }
}

/// `fetch` / `get_sensor_details`
#[derive(Debug, Clone, Deserialize)]
pub struct DetailParams {
    /// Thing id (required)
    #[serde(default, deserialize_with = "optional_id")]
    pub sensor_id: Option<String>,
    /// Expand datastreams with observed property and hardware
    #[serde(default = "default_true")]
    pub include_datastreams: bool,
    /// Expand locations
    #[serde(default = "default_true")]
    pub include_locations: bool,
    /// Append the 10 most recent observations
    #[serde(default)]
    pub include_observations: bool,
}

impl DetailParams {
    /// Details for `sensor_id` with the default expansions
    pub fn for_sensor(sensor_id: impl Into<String>) -> Self {
        Self {
            sensor_id: Some(sensor_id.into()),
            include_datastreams: true,
            include_locations: true,
            include_observations: false,
        }
    }
}

/// `get_datastreams`
#[derive(Debug, Clone, Deserialize)]
pub struct DatastreamParams {
    /// Restrict to one thing
    #[serde(default, deserialize_with = "optional_id")]
    pub sensor_id: Option<String>,
    /// Substring of the observed property name
    #[serde(default)]
    pub property_name: Option<String>,
    /// Substring of the unit name
    #[serde(default)]
    pub unit_name: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Raw OData predicate
    #[serde(default)]
    pub filter: Option<String>,
}

/// `get_observations`
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationParams {
    /// Restrict to one datastream (takes precedence over `sensor_id`)
    #[serde(default, deserialize_with = "optional_id")]
    pub datastream_id: Option<String>,
    /// Restrict to one thing
    #[serde(default, deserialize_with = "optional_id")]
    pub sensor_id: Option<String>,
    /// Inclusive lower phenomenon-time bound (ISO 8601)
    #[serde(default)]
    pub start_time: Option<String>,
    /// Inclusive upper phenomenon-time bound (ISO 8601)
    #[serde(default)]
    pub end_time: Option<String>,
    /// Page size
    #[serde(default = "default_wide_limit")]
    pub limit: u32,
    /// Output format
    #[serde(default)]
    pub format: ResultFormat,
    /// Label echoed back as `aggregation`
    #[serde(default)]
    pub aggregate: Option<String>,
}

/// `get_locations`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationParams {
    /// `lat1,lng1,lat2,lng2`
    #[serde(default)]
    pub bbox: Option<String>,
    /// `lat,lng,radius_km`
    #[serde(default)]
    pub point: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Output format (GeoJSON unless asked otherwise)
    #[serde(default = "default_geojson")]
    pub format: ResultFormat,
}

/// `get_observed_properties`
#[derive(Debug, Clone, Deserialize)]
pub struct ObservedPropertyParams {
    /// Free text matched against name and description
    #[serde(default)]
    pub search: Option<String>,
    /// Page size
    #[serde(default = "default_wide_limit")]
    pub limit: u32,
}

/// `get_sensors_hardware`
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareParams {
    /// Manufacturer text
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Model text
    #[serde(default)]
    pub model: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// `get_features_of_interest`
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureParams {
    /// Free text matched against name and description
    #[serde(default)]
    pub search: Option<String>,
    /// Exact GeoJSON geometry type, e.g. `Point`
    #[serde(default)]
    pub geometry_type: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Two-tool convention: `search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSearchParams {
    /// Free text
    #[serde(default)]
    pub query: String,
}

/// Two-tool convention: `fetch`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentFetchParams {
    /// Thing id
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
}
