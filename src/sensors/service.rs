//! Tool implementations over the FROST client.
//!
//! Every method builds its query, performs one request (two for sensor
//! details with recent observations) and renders the projected result as
//! pretty JSON. GeoJSON and CSV responses are passed through untouched.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::frost::model::{
    Collection, Datastream, FeatureOfInterest, Location, ObservedProperty, Observation, Sensor,
    ServiceRoot, Thing,
};
use crate::frost::query::{self, QueryOptions, ResultFormat};
use crate::frost::FrostClient;
use crate::sensors::params::{
    present, DatastreamParams, DetailParams, FeatureParams, HardwareParams, LocationParams,
    ObservationParams, ObservedPropertyParams, SearchParams,
};
use crate::sensors::projection::{self, SensorDetailResult, SensorSearchResult};
use serde::Serialize;
use tracing::{info, instrument, warn};

const SEARCH_EXPAND: &str = "Locations,Datastreams";
const DETAIL_DATASTREAM_EXPAND: &str = "Datastreams($expand=ObservedProperty,Sensor)";
const DATASTREAM_EXPAND: &str = "Thing,ObservedProperty,Sensor";
const OBSERVATION_EXPAND: &str = "Datastream($expand=ObservedProperty,Thing)";
const LOCATION_EXPAND: &str = "Things($expand=Datastreams)";
const NEWEST_FIRST: &str = "phenomenonTime desc";
const RECENT_OBSERVATION_LIMIT: u32 = 10;

/// Sensor data tools backed by one FROST server
#[derive(Debug, Clone)]
pub struct SensorService {
    client: FrostClient,
}

impl SensorService {
    /// Create a service over `client`
    pub fn new(client: FrostClient) -> Self {
        Self { client }
    }

    /// Build the client from configuration and wrap it
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        Ok(Self::new(FrostClient::new(config)?))
    }

    /// Upstream configuration
    pub fn config(&self) -> &ServiceConfig {
        self.client.config()
    }

    // ------------------------------------------------------------------
    // Sensors (Things)
    // ------------------------------------------------------------------

    fn search_options(params: &SearchParams) -> Result<QueryOptions> {
        let mut predicates = Vec::new();

        if let Some(q) = params.query.as_deref().filter(|q| !q.is_empty()) {
            predicates.push(query::text_search(q));
        }
        if let Some(loc) = params.location_filter.as_deref() {
            if let Some(geo) = query::location_filter(loc)? {
                predicates.push(geo);
            }
        }
        if let Some(raw) = params.filter.as_deref().filter(|f| !f.is_empty()) {
            predicates.push(raw.to_string());
        }

        Ok(QueryOptions::new()
            .limit(params.limit)
            .expand(SEARCH_EXPAND)
            .with_count()
            .filter(query::join_predicates(predicates))
            .format(params.format))
    }

    /// Search things and project them, ignoring `params.format`.
    #[instrument(skip(self))]
    pub async fn find_sensors(&self, params: &SearchParams) -> Result<SensorSearchResult> {
        let options = Self::search_options(params)?.format(ResultFormat::Json);
        let page: Collection<Thing> = self.client.get("Things", &options).await?;
        info!(found = page.value.len(), "sensor search");
        Ok(projection::sensor_search(page))
    }

    /// `search_sensors` tool
    #[instrument(skip(self))]
    pub async fn search_sensors(&self, params: &SearchParams) -> Result<String> {
        if params.format != ResultFormat::Json {
            let options = Self::search_options(params)?;
            return self.client.request("Things", &options).await?.into_text();
        }
        pretty(&self.find_sensors(params).await?)
    }

    /// Fetch one thing with its relations and, optionally, its most recent
    /// observations.
    #[instrument(skip(self))]
    pub async fn sensor_detail(&self, params: &DetailParams) -> Result<SensorDetailResult> {
        let sensor_id = present(&params.sensor_id).ok_or(Error::MissingParameter("sensor_id"))?;

        let mut expand = Vec::new();
        if params.include_locations {
            expand.push("Locations");
        }
        if params.include_datastreams {
            expand.push(DETAIL_DATASTREAM_EXPAND);
        }
        let mut options = QueryOptions::new();
        if !expand.is_empty() {
            options = options.expand(expand.join(","));
        }

        let thing: Thing = self
            .client
            .get(&query::entity_path("Things", sensor_id), &options)
            .await?;
        let mut sensor = projection::sensor_detail(thing);

        if params.include_observations {
            sensor.recent_observations = Some(self.recent_observations(sensor_id).await?);
        }

        Ok(SensorDetailResult { sensor })
    }

    /// Latest observations across all datastreams of a thing. Upstream
    /// failures degrade to an empty list.
    async fn recent_observations(
        &self,
        sensor_id: &str,
    ) -> Result<Vec<projection::RecentObservation>> {
        let options = QueryOptions::new()
            .limit(RECENT_OBSERVATION_LIMIT)
            .orderby(NEWEST_FIRST)
            .expand("Datastream");
        let endpoint = format!(
            "{}/Datastreams/Observations",
            query::entity_path("Things", sensor_id)
        );

        match self.client.get::<Collection<Observation>>(&endpoint, &options).await {
            Ok(page) => Ok(projection::recent_observations(page)),
            Err(e) if e.is_upstream_failure() => {
                warn!(sensor_id, "recent observations unavailable: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// `get_sensor_details` tool
    #[instrument(skip(self))]
    pub async fn get_sensor_details(&self, params: &DetailParams) -> Result<String> {
        pretty(&self.sensor_detail(params).await?)
    }

    // ------------------------------------------------------------------
    // Datastreams and observations
    // ------------------------------------------------------------------

    /// `get_datastreams` tool
    #[instrument(skip(self))]
    pub async fn get_datastreams(&self, params: &DatastreamParams) -> Result<String> {
        let endpoint = match present(&params.sensor_id) {
            Some(id) => format!("{}/Datastreams", query::entity_path("Things", id)),
            None => "Datastreams".to_string(),
        };

        let mut predicates = Vec::new();
        if let Some(name) = params.property_name.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(query::contains_ci("ObservedProperty/name", name));
        }
        if let Some(unit) = params.unit_name.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(query::contains_ci("unitOfMeasurement/name", unit));
        }
        if let Some(raw) = params.filter.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(raw.to_string());
        }

        let options = QueryOptions::new()
            .limit(params.limit)
            .expand(DATASTREAM_EXPAND)
            .with_count()
            .filter(query::join_predicates(predicates));

        let page: Collection<Datastream> = self.client.get(&endpoint, &options).await?;
        pretty(&projection::datastream_list(page))
    }

    /// `get_observations` tool
    #[instrument(skip(self))]
    pub async fn get_observations(&self, params: &ObservationParams) -> Result<String> {
        let endpoint = if let Some(ds) = present(&params.datastream_id) {
            format!("{}/Observations", query::entity_path("Datastreams", ds))
        } else if let Some(thing) = present(&params.sensor_id) {
            format!(
                "{}/Datastreams/Observations",
                query::entity_path("Things", thing)
            )
        } else {
            "Observations".to_string()
        };

        let filter = query::time_range(
            params.start_time.as_deref().filter(|s| !s.is_empty()),
            params.end_time.as_deref().filter(|s| !s.is_empty()),
        );

        let options = QueryOptions::new()
            .limit(params.limit)
            .orderby(NEWEST_FIRST)
            .expand(OBSERVATION_EXPAND)
            .with_count()
            .filter(filter)
            .format(params.format);

        let payload = self.client.request(&endpoint, &options).await?;
        if params.format != ResultFormat::Json {
            return payload.into_text();
        }

        let page: Collection<Observation> = payload.decode()?;
        pretty(&projection::observation_list(page, params.aggregate.clone()))
    }

    // ------------------------------------------------------------------
    // Locations and catalogue listings
    // ------------------------------------------------------------------

    /// `get_locations` tool
    #[instrument(skip(self))]
    pub async fn get_locations(&self, params: &LocationParams) -> Result<String> {
        let mut predicates = Vec::new();
        for literal in [&params.bbox, &params.point].into_iter().flatten() {
            if let Some(geo) = query::location_filter(literal)? {
                predicates.push(geo);
            }
        }

        let options = QueryOptions::new()
            .limit(params.limit)
            .expand(LOCATION_EXPAND)
            .with_count()
            .filter(query::join_predicates(predicates))
            .format(params.format);

        let payload = self.client.request("Locations", &options).await?;
        if params.format != ResultFormat::Json {
            return payload.into_text();
        }

        let page: Collection<Location> = payload.decode()?;
        pretty(&projection::location_list(page))
    }

    /// `get_observed_properties` tool
    #[instrument(skip(self))]
    pub async fn get_observed_properties(&self, params: &ObservedPropertyParams) -> Result<String> {
        let predicates = text_predicates([params.search.as_deref()]);
        let options = QueryOptions::new()
            .limit(params.limit)
            .with_count()
            .filter(query::join_predicates(predicates));

        let page: Collection<ObservedProperty> =
            self.client.get("ObservedProperties", &options).await?;
        pretty(&projection::observed_property_list(page))
    }

    /// `get_sensors_hardware` tool
    #[instrument(skip(self))]
    pub async fn get_sensors_hardware(&self, params: &HardwareParams) -> Result<String> {
        let predicates =
            text_predicates([params.manufacturer.as_deref(), params.model.as_deref()]);
        let options = QueryOptions::new()
            .limit(params.limit)
            .with_count()
            .filter(query::join_predicates(predicates));

        let page: Collection<Sensor> = self.client.get("Sensors", &options).await?;
        pretty(&projection::hardware_list(page))
    }

    /// `get_features_of_interest` tool
    #[instrument(skip(self))]
    pub async fn get_features_of_interest(&self, params: &FeatureParams) -> Result<String> {
        let mut predicates = text_predicates([params.search.as_deref()]);
        if let Some(kind) = params.geometry_type.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(format!("feature/type eq {}", query::quote_literal(kind)));
        }

        let options = QueryOptions::new()
            .limit(params.limit)
            .with_count()
            .filter(query::join_predicates(predicates));

        let page: Collection<FeatureOfInterest> =
            self.client.get("FeaturesOfInterest", &options).await?;
        pretty(&projection::feature_list(page))
    }

    /// `get_api_info` tool. Never fails on upstream trouble; returns a
    /// degraded envelope instead.
    #[instrument(skip(self))]
    pub async fn get_api_info(&self) -> Result<String> {
        let base_url = &self.config().base_url;

        match self.client.get::<ServiceRoot>("", &QueryOptions::new()).await {
            Ok(root) => pretty(&projection::api_info(base_url, root)),
            Err(e) if e.is_upstream_failure() || matches!(e, Error::Json(_)) => {
                warn!("service root unavailable: {}", e);
                pretty(&projection::api_info_unavailable(base_url))
            }
            Err(e) => Err(e),
        }
    }
}

fn text_predicates<'a>(terms: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    terms
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .map(query::text_search)
        .collect()
}

/// Two-space indented JSON
pub(crate) fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
