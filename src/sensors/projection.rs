//! Flattened tool output.
//!
//! Upstream entities are projected into smaller, renamed structures. Field
//! order here is the field order in the serialized JSON.

#![allow(missing_docs)]

use crate::frost::model::{
    Collection, Datastream, FeatureOfInterest, Geometry, IotId, Location, ObservedProperty,
    Observation, Sensor, ServiceRoot, Thing, UnitOfMeasurement,
};
use serde::Serialize;
use serde_json::Value;

/// Datastreams listed inline per sensor in search results
pub const SEARCH_DATASTREAM_PREVIEW: usize = 3;

/// Conformance key under which FROST advertises its MQTT endpoints
const MQTT_CREATE_OBSERVATIONS: &str =
    "http://www.opengis.net/spec/iot_sensing/1.1/req/create-observations-via-mqtt/observations-creation";

// ============================================================================
// Sensor search
// ============================================================================

/// Envelope returned by `search_sensors`
#[derive(Debug, Clone, Serialize)]
pub struct SensorSearchResult {
    pub message: String,
    pub total_count: u64,
    pub sensors: Vec<SensorSummary>,
}

/// One thing in search results
#[derive(Debug, Clone, Serialize)]
pub struct SensorSummary {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub properties: Option<Value>,
    pub location: Option<LocationSummary>,
    pub datastream_count: usize,
    pub datastreams: Vec<DatastreamPreview>,
}

/// First location of a thing
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub name: Option<String>,
    pub coordinates: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Short datastream entry
#[derive(Debug, Clone, Serialize)]
pub struct DatastreamPreview {
    pub id: IotId,
    pub name: Option<String>,
    pub unit: Option<String>,
}

pub fn sensor_search(page: Collection<Thing>) -> SensorSearchResult {
    let total_count = page.total_count();
    let sensors: Vec<SensorSummary> = page.value.into_iter().map(sensor_summary).collect();

    SensorSearchResult {
        message: format!("Found {} sensors", sensors.len()),
        total_count,
        sensors,
    }
}

pub fn sensor_summary(thing: Thing) -> SensorSummary {
    let location = thing.locations.first().map(|loc| {
        let geometry = loc.location.clone().unwrap_or_default();
        LocationSummary {
            name: loc.name.clone(),
            coordinates: geometry.coordinates,
            kind: geometry.kind,
        }
    });

    let datastreams = thing
        .datastreams
        .iter()
        .take(SEARCH_DATASTREAM_PREVIEW)
        .map(|ds| DatastreamPreview {
            id: ds.id.clone(),
            name: ds.name.clone(),
            unit: ds
                .unit_of_measurement
                .as_ref()
                .and_then(|u| u.symbol.clone()),
        })
        .collect();

    SensorSummary {
        id: thing.id,
        name: thing.name,
        description: thing.description,
        properties: thing.properties,
        location,
        datastream_count: thing.datastreams.len(),
        datastreams,
    }
}

// ============================================================================
// Sensor detail
// ============================================================================

/// Envelope returned by `get_sensor_details`
#[derive(Debug, Clone, Serialize)]
pub struct SensorDetailResult {
    pub sensor: SensorDetail,
}

/// Full nested view of one thing
#[derive(Debug, Clone, Serialize)]
pub struct SensorDetail {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub properties: Option<Value>,
    pub locations: Vec<LocationDetail>,
    pub datastream_count: usize,
    pub datastreams: Vec<DatastreamDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_observations: Option<Vec<RecentObservation>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDetail {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub coordinates: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub encoding_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatastreamDetail {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<UnitOfMeasurement>,
    pub observed_property: PropertyRef,
    pub sensor_hardware: HardwareRef,
}

/// Observed property reference; all fields null when not expanded
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyRef {
    pub id: Option<IotId>,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub description: Option<String>,
}

/// Hardware sensor reference; all fields null when not expanded
#[derive(Debug, Clone, Default, Serialize)]
pub struct HardwareRef {
    pub id: Option<IotId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentObservation {
    pub id: IotId,
    pub result: Option<Value>,
    pub time: Option<String>,
    pub datastream_name: Option<String>,
}

impl From<Option<ObservedProperty>> for PropertyRef {
    fn from(op: Option<ObservedProperty>) -> Self {
        op.map(|op| PropertyRef {
            id: Some(op.id),
            name: op.name,
            definition: op.definition,
            description: op.description,
        })
        .unwrap_or_default()
    }
}

impl From<Option<Sensor>> for HardwareRef {
    fn from(sensor: Option<Sensor>) -> Self {
        sensor
            .map(|s| HardwareRef {
                id: Some(s.id),
                name: s.name,
                description: s.description,
                metadata: s.metadata,
            })
            .unwrap_or_default()
    }
}

pub fn sensor_detail(thing: Thing) -> SensorDetail {
    let locations = thing.locations.into_iter().map(location_detail).collect();
    let datastream_count = thing.datastreams.len();
    let datastreams = thing
        .datastreams
        .into_iter()
        .map(|ds| DatastreamDetail {
            id: ds.id,
            name: ds.name,
            description: ds.description,
            unit: ds.unit_of_measurement,
            observed_property: ds.observed_property.into(),
            sensor_hardware: ds.sensor.into(),
        })
        .collect();

    SensorDetail {
        id: thing.id,
        name: thing.name,
        description: thing.description,
        properties: thing.properties,
        locations,
        datastream_count,
        datastreams,
        recent_observations: None,
    }
}

fn location_detail(loc: Location) -> LocationDetail {
    let geometry = loc.location.unwrap_or_default();
    LocationDetail {
        id: loc.id,
        name: loc.name,
        description: loc.description,
        coordinates: geometry.coordinates,
        kind: geometry.kind,
        encoding_type: loc.encoding_type,
    }
}

pub fn recent_observations(page: Collection<Observation>) -> Vec<RecentObservation> {
    page.value
        .into_iter()
        .map(|obs| RecentObservation {
            id: obs.id,
            result: obs.result,
            time: obs.phenomenon_time,
            datastream_name: obs.datastream.and_then(|ds| ds.name),
        })
        .collect()
}

// ============================================================================
// Datastreams
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DatastreamListResult {
    pub message: String,
    pub total_count: u64,
    pub datastreams: Vec<DatastreamEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatastreamEntry {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: UnitOfMeasurement,
    pub observed_property: PropertyRef,
    pub sensor: ThingRef,
    pub hardware: HardwareBrief,
}

/// Owning thing of a datastream
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThingRef {
    pub id: Option<IotId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HardwareBrief {
    pub id: Option<IotId>,
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn datastream_list(page: Collection<Datastream>) -> DatastreamListResult {
    let total_count = page.total_count();
    let datastreams: Vec<DatastreamEntry> = page
        .value
        .into_iter()
        .map(|ds| DatastreamEntry {
            id: ds.id,
            name: ds.name,
            description: ds.description,
            unit: ds.unit_of_measurement.unwrap_or_default(),
            observed_property: ds.observed_property.into(),
            sensor: ds
                .thing
                .map(|t| ThingRef {
                    id: Some(t.id),
                    name: t.name,
                })
                .unwrap_or_default(),
            hardware: ds
                .sensor
                .map(|s| HardwareBrief {
                    id: Some(s.id),
                    name: s.name,
                    description: s.description,
                })
                .unwrap_or_default(),
        })
        .collect();

    DatastreamListResult {
        message: format!("Found {} datastreams", datastreams.len()),
        total_count,
        datastreams,
    }
}

// ============================================================================
// Observations
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ObservationListResult {
    pub message: String,
    pub total_count: u64,
    pub time_range: TimeRange,
    pub aggregation: String,
    pub observations: Vec<ObservationEntry>,
}

/// Span covered by the returned page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeRange {
    /// Earliest phenomenon time on the page
    pub start: Option<String>,
    /// Latest phenomenon time on the page
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservationEntry {
    pub id: IotId,
    pub result: Option<Value>,
    pub phenomenon_time: Option<String>,
    pub result_time: Option<String>,
    pub quality: Option<Value>,
    pub datastream: ObservationDatastream,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObservationDatastream {
    pub id: Option<IotId>,
    pub name: Option<String>,
    pub unit: Option<UnitOfMeasurement>,
    pub property: Option<String>,
    pub sensor_name: Option<String>,
}

/// Project a page of observations sorted by phenomenon time, newest first.
pub fn observation_list(
    page: Collection<Observation>,
    aggregate: Option<String>,
) -> ObservationListResult {
    let total_count = page.total_count();
    let observations: Vec<ObservationEntry> = page
        .value
        .into_iter()
        .map(|obs| ObservationEntry {
            id: obs.id,
            result: obs.result,
            phenomenon_time: obs.phenomenon_time,
            result_time: obs.result_time,
            quality: obs.result_quality,
            datastream: obs
                .datastream
                .map(|ds| ObservationDatastream {
                    id: Some(ds.id),
                    name: ds.name,
                    unit: ds.unit_of_measurement,
                    property: ds.observed_property.and_then(|op| op.name),
                    sensor_name: ds.thing.and_then(|t| t.name),
                })
                .unwrap_or_default(),
        })
        .collect();

    // Newest first, so the last entry is the earliest.
    let time_range = TimeRange {
        start: observations
            .last()
            .and_then(|o| o.phenomenon_time.clone()),
        end: observations
            .first()
            .and_then(|o| o.phenomenon_time.clone()),
    };

    ObservationListResult {
        message: format!("Found {} observations", observations.len()),
        total_count,
        time_range,
        aggregation: aggregate.unwrap_or_else(|| "none".to_string()),
        observations,
    }
}

// ============================================================================
// Locations
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LocationListResult {
    pub message: String,
    pub total_count: u64,
    pub locations: Vec<LocationEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationEntry {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub encoding_type: Option<String>,
    pub geometry: Geometry,
    pub sensors: Vec<LocatedSensor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocatedSensor {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub datastream_count: usize,
}

pub fn location_list(page: Collection<Location>) -> LocationListResult {
    let total_count = page.total_count();
    let locations: Vec<LocationEntry> = page
        .value
        .into_iter()
        .map(|loc| LocationEntry {
            id: loc.id,
            name: loc.name,
            description: loc.description,
            encoding_type: loc.encoding_type,
            geometry: loc.location.unwrap_or_default(),
            sensors: loc
                .things
                .into_iter()
                .map(|t| LocatedSensor {
                    id: t.id,
                    name: t.name,
                    description: t.description,
                    datastream_count: t.datastreams.len(),
                })
                .collect(),
        })
        .collect();

    LocationListResult {
        message: format!("Found {} locations", locations.len()),
        total_count,
        locations,
    }
}

// ============================================================================
// Observed properties, hardware, features of interest
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ObservedPropertyListResult {
    pub message: String,
    pub total_count: u64,
    pub properties: Vec<PropertyEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyEntry {
    pub id: IotId,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub description: Option<String>,
}

pub fn observed_property_list(page: Collection<ObservedProperty>) -> ObservedPropertyListResult {
    let total_count = page.total_count();
    let properties: Vec<PropertyEntry> = page
        .value
        .into_iter()
        .map(|op| PropertyEntry {
            id: op.id,
            name: op.name,
            definition: op.definition,
            description: op.description,
        })
        .collect();

    ObservedPropertyListResult {
        message: format!("Found {} observed properties", properties.len()),
        total_count,
        properties,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HardwareListResult {
    pub message: String,
    pub total_count: u64,
    pub sensors: Vec<HardwareEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HardwareEntry {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub encoding_type: Option<String>,
    pub metadata: Option<Value>,
}

pub fn hardware_list(page: Collection<Sensor>) -> HardwareListResult {
    let total_count = page.total_count();
    let sensors: Vec<HardwareEntry> = page
        .value
        .into_iter()
        .map(|s| HardwareEntry {
            id: s.id,
            name: s.name,
            description: s.description,
            encoding_type: s.encoding_type,
            metadata: s.metadata,
        })
        .collect();

    HardwareListResult {
        message: format!("Found {} sensors", sensors.len()),
        total_count,
        sensors,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureListResult {
    pub message: String,
    pub total_count: u64,
    pub features: Vec<FeatureEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureEntry {
    pub id: IotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub encoding_type: Option<String>,
    pub geometry: Geometry,
}

pub fn feature_list(page: Collection<FeatureOfInterest>) -> FeatureListResult {
    let total_count = page.total_count();
    let features: Vec<FeatureEntry> = page
        .value
        .into_iter()
        .map(|f| FeatureEntry {
            id: f.id,
            name: f.name,
            description: f.description,
            encoding_type: f.encoding_type,
            geometry: f.feature.unwrap_or_default(),
        })
        .collect();

    FeatureListResult {
        message: format!("Found {} features of interest", features.len()),
        total_count,
        features,
    }
}

// ============================================================================
// API info
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ApiInfoResult {
    pub api_info: ApiInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub base_url: String,
    pub version: &'static str,
    pub server_name: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointEntry>,
    pub capabilities: Value,
    pub mqtt_endpoints: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointEntry {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Returned by `get_api_info` when the service root is unreachable
#[derive(Debug, Clone, Serialize)]
pub struct ApiInfoUnavailable {
    pub error: &'static str,
    pub base_url: String,
    pub message: &'static str,
}

pub const SERVER_NAME: &str = "BGS FROST Server";
pub const SERVER_DESCRIPTION: &str = "British Geological Survey Sensor Things API";

pub fn api_info(base_url: &str, root: ServiceRoot) -> ApiInfoResult {
    let settings = root.server_settings.unwrap_or(Value::Null);
    let capabilities = settings
        .get("conformance")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let mqtt_endpoints = settings
        .get(MQTT_CREATE_OBSERVATIONS)
        .and_then(|mqtt| mqtt.get("endpoints"))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    ApiInfoResult {
        api_info: ApiInfo {
            base_url: base_url.to_string(),
            version: "1.1",
            server_name: SERVER_NAME,
            description: SERVER_DESCRIPTION,
            endpoints: root
                .value
                .into_iter()
                .map(|e| EndpointEntry {
                    name: e.name,
                    url: e.url,
                })
                .collect(),
            capabilities,
            mqtt_endpoints,
        },
    }
}

pub fn api_info_unavailable(base_url: &str) -> ApiInfoUnavailable {
    ApiInfoUnavailable {
        error: "Could not retrieve API information",
        base_url: base_url.to_string(),
        message: "BGS FROST Server - British Geological Survey Sensor Things API",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn things(value: Value) -> Collection<Thing> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sensor_search_projection() {
        let page = things(json!({
            "@iot.count": 57,
            "value": [{
                "@iot.id": 1,
                "name": "Borehole A",
                "description": "Test site",
                "properties": { "depth_m": 30 },
                "Locations": [
                    { "name": "Site A", "location": { "type": "Point", "coordinates": [-1.2, 52.9] } },
                    { "name": "Site B", "location": { "type": "Point", "coordinates": [0.0, 0.0] } }
                ],
                "Datastreams": [
                    { "@iot.id": 10, "name": "Level", "unitOfMeasurement": { "symbol": "m" } },
                    { "@iot.id": 11, "name": "Temp", "unitOfMeasurement": { "symbol": "degC" } },
                    { "@iot.id": 12, "name": "EC" },
                    { "@iot.id": 13, "name": "pH" }
                ]
            }]
        }));

        let out = serde_json::to_value(sensor_search(page)).unwrap();
        assert_eq!(out["message"], "Found 1 sensors");
        assert_eq!(out["total_count"], 57);

        let sensor = &out["sensors"][0];
        assert_eq!(sensor["location"]["name"], "Site A");
        assert_eq!(sensor["location"]["type"], "Point");
        assert_eq!(sensor["location"]["coordinates"], json!([-1.2, 52.9]));
        assert_eq!(sensor["datastream_count"], 4);
        assert_eq!(sensor["datastreams"].as_array().unwrap().len(), 3);
        assert_eq!(sensor["datastreams"][0]["unit"], "m");
        assert_eq!(sensor["datastreams"][2]["unit"], Value::Null);
    }

    #[test]
    fn test_sensor_without_location_renders_null() {
        let page = things(json!({ "value": [{ "@iot.id": 2, "name": "Lonely" }] }));
        let out = serde_json::to_value(sensor_search(page)).unwrap();

        assert_eq!(out["total_count"], 1);
        assert_eq!(out["sensors"][0]["location"], Value::Null);
        assert_eq!(out["sensors"][0]["description"], Value::Null);
        assert_eq!(out["sensors"][0]["datastream_count"], 0);
    }

    #[test]
    fn test_sensor_detail_empty_relations() {
        let thing: Thing = serde_json::from_value(json!({
            "@iot.id": 5,
            "name": "Bare thing",
            "description": "no relations"
        }))
        .unwrap();

        let out = serde_json::to_value(sensor_detail(thing)).unwrap();
        assert_eq!(out["locations"], json!([]));
        assert_eq!(out["datastream_count"], 0);
        assert_eq!(out["datastreams"], json!([]));
        assert!(out.get("recent_observations").is_none());
    }

    #[test]
    fn test_sensor_detail_nested_refs() {
        let thing: Thing = serde_json::from_value(json!({
            "@iot.id": 5,
            "Datastreams": [{
                "@iot.id": 8,
                "name": "Level",
                "unitOfMeasurement": { "name": "metre", "symbol": "m", "definition": "http://qudt.org/vocab/unit/M" },
                "ObservedProperty": { "@iot.id": 3, "name": "Water level" },
                "Sensor": { "@iot.id": 4, "name": "Diver", "metadata": "https://example.org/diver.pdf" }
            }, {
                "@iot.id": 9,
                "name": "Unexpanded"
            }]
        }))
        .unwrap();

        let out = serde_json::to_value(sensor_detail(thing)).unwrap();
        let first = &out["datastreams"][0];
        assert_eq!(first["unit"]["symbol"], "m");
        assert_eq!(first["observed_property"]["id"], 3);
        assert_eq!(first["sensor_hardware"]["name"], "Diver");

        let second = &out["datastreams"][1];
        assert_eq!(second["unit"], Value::Null);
        assert_eq!(
            second["observed_property"],
            json!({ "id": null, "name": null, "definition": null, "description": null })
        );
    }

    #[test]
    fn test_observation_time_range_spans_page() {
        let page: Collection<Observation> = serde_json::from_value(json!({
            "value": [
                { "@iot.id": 3, "result": 1.3, "phenomenonTime": "2024-03-03T00:00:00Z" },
                { "@iot.id": 2, "result": 1.2, "phenomenonTime": "2024-03-02T00:00:00Z" },
                { "@iot.id": 1, "result": 1.1, "phenomenonTime": "2024-03-01T00:00:00Z" }
            ]
        }))
        .unwrap();

        let out = observation_list(page, None);
        assert_eq!(
            out.time_range,
            TimeRange {
                start: Some("2024-03-01T00:00:00Z".to_string()),
                end: Some("2024-03-03T00:00:00Z".to_string()),
            }
        );
        assert_eq!(out.aggregation, "none");
        assert_eq!(out.total_count, 3);
    }

    #[test]
    fn test_observation_empty_page() {
        let page: Collection<Observation> = serde_json::from_value(json!({ "value": [] })).unwrap();
        let out = observation_list(page, Some("daily_mean".to_string()));

        assert_eq!(out.time_range, TimeRange::default());
        assert_eq!(out.aggregation, "daily_mean");
        assert_eq!(out.message, "Found 0 observations");
    }

    #[test]
    fn test_observation_datastream_flattening() {
        let page: Collection<Observation> = serde_json::from_value(json!({
            "value": [{
                "@iot.id": 1,
                "result": 4.2,
                "phenomenonTime": "2024-03-01T00:00:00Z",
                "resultQuality": "good",
                "Datastream": {
                    "@iot.id": 77,
                    "name": "Level",
                    "unitOfMeasurement": { "symbol": "m" },
                    "ObservedProperty": { "name": "Water level" },
                    "Thing": { "name": "Borehole A" }
                }
            }]
        }))
        .unwrap();

        let out = serde_json::to_value(observation_list(page, None)).unwrap();
        let ds = &out["observations"][0]["datastream"];
        assert_eq!(ds["id"], 77);
        assert_eq!(ds["property"], "Water level");
        assert_eq!(ds["sensor_name"], "Borehole A");
        assert_eq!(out["observations"][0]["quality"], "good");
        assert_eq!(out["observations"][0]["result_time"], Value::Null);
    }

    #[test]
    fn test_location_list_counts_datastreams() {
        let page: Collection<Location> = serde_json::from_value(json!({
            "@iot.count": 1,
            "value": [{
                "@iot.id": 1,
                "name": "Site A",
                "encodingType": "application/geo+json",
                "location": { "type": "Point", "coordinates": [-1.2, 52.9] },
                "Things": [{ "@iot.id": 9, "name": "Borehole A", "Datastreams": [{}, {}] }]
            }]
        }))
        .unwrap();

        let out = serde_json::to_value(location_list(page)).unwrap();
        assert_eq!(out["locations"][0]["geometry"]["type"], "Point");
        assert_eq!(out["locations"][0]["sensors"][0]["datastream_count"], 2);
    }

    #[test]
    fn test_api_info_extracts_settings() {
        let root: ServiceRoot = serde_json::from_value(json!({
            "value": [{ "name": "Things", "url": "https://x/v1.1/Things" }],
            "serverSettings": {
                "conformance": ["http://www.opengis.net/spec/iot_sensing/1.1/req/datamodel"],
                MQTT_CREATE_OBSERVATIONS: { "endpoints": ["mqtt://x:1883"] }
            }
        }))
        .unwrap();

        let out = serde_json::to_value(api_info("https://x/v1.1", root)).unwrap();
        assert_eq!(out["api_info"]["endpoints"][0]["name"], "Things");
        assert_eq!(out["api_info"]["capabilities"].as_array().unwrap().len(), 1);
        assert_eq!(out["api_info"]["mqtt_endpoints"], json!(["mqtt://x:1883"]));
        assert_eq!(out["api_info"]["version"], "1.1");
    }

    #[test]
    fn test_api_info_without_settings() {
        let out = serde_json::to_value(api_info("https://x", ServiceRoot::default())).unwrap();
        assert_eq!(out["api_info"]["capabilities"], json!([]));
        assert_eq!(out["api_info"]["mqtt_endpoints"], json!([]));
    }
}
