//! SensorThings entity types as returned by the FROST server.
//!
//! Deserialization is lenient: apart from the collection envelope every
//! field is optional, so a missing attribute becomes `None`/empty instead
//! of failing the whole response. Ids stay raw JSON values because FROST
//! can be configured for numeric or string ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity id (`@iot.id`), numeric or string depending on server setup
pub type IotId = Value;

/// Plain text of an id; see [`crate::frost::query::entity_path`] for paths
pub fn id_text(id: &IotId) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Collection envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    /// Total row count, present when `$count=true`
    #[serde(rename = "@iot.count")]
    pub count: Option<u64>,
    /// Link to the next page (not followed)
    #[serde(rename = "@iot.nextLink")]
    pub next_link: Option<String>,
    /// Entities on this page
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> Collection<T> {
    /// Server-reported total, falling back to the page length
    pub fn total_count(&self) -> u64 {
        self.count.unwrap_or(self.value.len() as u64)
    }
}

/// GeoJSON-shaped geometry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Geometry type (`Point`, `Polygon`, ...)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Coordinate sequence, shape depends on `kind`
    pub coordinates: Option<Value>,
}

/// Unit of measurement attached to a datastream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitOfMeasurement {
    /// Unit name, e.g. `metre`
    pub name: Option<String>,
    /// Unit symbol, e.g. `m`
    pub symbol: Option<String>,
    /// Definition URI
    pub definition: Option<String>,
}

/// A sensor/observed entity ("sensor" in tool vocabulary)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thing {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Free-form properties
    pub properties: Option<Value>,
    /// Expanded locations
    #[serde(rename = "Locations")]
    pub locations: Vec<Location>,
    /// Expanded datastreams
    #[serde(rename = "Datastreams")]
    pub datastreams: Vec<Datastream>,
}

/// Where a thing is
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Encoding of `location`, normally `application/geo+json`
    #[serde(rename = "encodingType")]
    pub encoding_type: Option<String>,
    /// Geometry
    pub location: Option<Geometry>,
    /// Expanded things at this location
    #[serde(rename = "Things")]
    pub things: Vec<Thing>,
}

/// Time-series channel of a thing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Datastream {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Unit of measurement
    #[serde(rename = "unitOfMeasurement")]
    pub unit_of_measurement: Option<UnitOfMeasurement>,
    /// Expanded observed property
    #[serde(rename = "ObservedProperty")]
    pub observed_property: Option<ObservedProperty>,
    /// Expanded hardware sensor
    #[serde(rename = "Sensor")]
    pub sensor: Option<Sensor>,
    /// Expanded owning thing
    #[serde(rename = "Thing")]
    pub thing: Option<Box<Thing>>,
}

/// Measured phenomenon definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObservedProperty {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Definition URI
    pub definition: Option<String>,
    /// Description
    pub description: Option<String>,
}

/// Physical sensor hardware
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sensor {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Encoding of `metadata`
    #[serde(rename = "encodingType")]
    pub encoding_type: Option<String>,
    /// Datasheet link or inline metadata
    pub metadata: Option<Value>,
}

/// Single measurement
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Observation {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Measured value
    pub result: Option<Value>,
    /// When the phenomenon happened
    #[serde(rename = "phenomenonTime")]
    pub phenomenon_time: Option<String>,
    /// When the result was produced
    #[serde(rename = "resultTime")]
    pub result_time: Option<String>,
    /// Quality flag(s)
    #[serde(rename = "resultQuality")]
    pub result_quality: Option<Value>,
    /// Expanded datastream
    #[serde(rename = "Datastream")]
    pub datastream: Option<Datastream>,
}

/// What an observation is about
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeatureOfInterest {
    /// Entity id
    #[serde(rename = "@iot.id")]
    pub id: IotId,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Encoding of `feature`
    #[serde(rename = "encodingType")]
    pub encoding_type: Option<String>,
    /// Geometry
    pub feature: Option<Geometry>,
}

/// Service root document (`GET <base>/`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceRoot {
    /// Entity sets offered by the server
    pub value: Vec<EntitySet>,
    /// Conformance classes and extension settings
    #[serde(rename = "serverSettings")]
    pub server_settings: Option<Value>,
}

/// Entry of the service root listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySet {
    /// Entity set name, e.g. `Things`
    pub name: Option<String>,
    /// Absolute URL of the entity set
    pub url: Option<String>,
}
