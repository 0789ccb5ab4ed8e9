//! Search/fetch document view of the sensor catalogue.
//!
//! Some MCP clients only call two tools: `search(query)` returning a list
//! of `{id, title, text, url}` hits and `fetch(id)` returning one full
//! document. Both are thin renderings of the sensor search and detail
//! projections.

use crate::error::{Error, Result};
use crate::frost::model::id_text;
use crate::sensors::params::{present, DetailParams, DocumentFetchParams, SearchParams};
use crate::sensors::projection::{SensorDetail, SensorSummary};
use crate::sensors::service::{pretty, SensorService};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write as _;
use tracing::{debug, instrument};

/// Characters of description kept in a search hit
pub const SNIPPET_CHARS: usize = 200;

/// `search` result envelope
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Matching sensors
    pub results: Vec<SearchHit>,
}

/// One search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Thing id
    pub id: String,
    /// Sensor name
    pub title: String,
    /// Human-readable summary
    pub text: String,
    /// Canonical entity URL
    pub url: String,
}

/// `fetch` result
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Thing id
    pub id: String,
    /// Sensor name
    pub title: String,
    /// Full multi-line description
    pub text: String,
    /// Canonical entity URL
    pub url: String,
    /// Structured extras
    pub metadata: Value,
}

/// Two-tool adapter over [`SensorService`]
#[derive(Debug, Clone)]
pub struct DocumentSearch {
    service: SensorService,
}

impl DocumentSearch {
    /// Wrap a sensor service
    pub fn new(service: SensorService) -> Self {
        Self { service }
    }

    /// Free-text sensor search. Blank queries return no hits without
    /// touching the network.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            debug!("blank query, skipping upstream search");
            return Ok(SearchResults::default());
        }

        let params = SearchParams {
            query: Some(query.to_string()),
            ..SearchParams::default()
        };
        let found = self.service.find_sensors(&params).await?;

        let results = found
            .sensors
            .iter()
            .map(|sensor| {
                let id = id_text(&sensor.id);
                SearchHit {
                    url: self.service.config().thing_url(&id),
                    title: title_of(sensor.name.as_deref(), &id),
                    text: summary_text(sensor),
                    id,
                }
            })
            .collect();

        Ok(SearchResults { results })
    }

    /// Full document for one sensor.
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: &str) -> Result<Document> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::MissingParameter("id"));
        }

        let detail = self
            .service
            .sensor_detail(&DetailParams::for_sensor(id))
            .await?
            .sensor;

        let id = match id_text(&detail.id) {
            upstream if !upstream.is_empty() => upstream,
            _ => id.to_string(),
        };

        Ok(Document {
            url: self.service.config().thing_url(&id),
            title: title_of(detail.name.as_deref(), &id),
            text: detail_text(&detail),
            metadata: json!({
                "properties": detail.properties,
                "location_count": detail.locations.len(),
                "datastream_count": detail.datastream_count,
            }),
            id,
        })
    }

    /// `search` tool output
    pub async fn search_json(&self, query: &str) -> Result<String> {
        pretty(&self.search(query).await?)
    }

    /// `fetch` tool output
    pub async fn fetch_json(&self, params: &DocumentFetchParams) -> Result<String> {
        let id = present(&params.id).ok_or(Error::MissingParameter("id"))?;
        pretty(&self.fetch(id).await?)
    }
}

fn title_of(name: Option<&str>, id: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Sensor {id}"),
    }
}

/// First `max` characters of `text`, with `...` appended when cut.
pub fn snippet(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn coordinates_text(coordinates: &Option<Value>) -> String {
    coordinates
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "no coordinates".to_string())
}

fn summary_text(sensor: &SensorSummary) -> String {
    let name = sensor.name.as_deref().unwrap_or("Unnamed sensor");
    let description = sensor.description.as_deref().unwrap_or("");

    let location = match &sensor.location {
        Some(loc) => format!(
            "Location: {} {}",
            loc.name.as_deref().unwrap_or("unnamed"),
            coordinates_text(&loc.coordinates)
        ),
        None => "Location: unknown".to_string(),
    };

    format!(
        "Sensor: {}\nDescription: {}\n{}\nDatastreams: {}",
        name,
        snippet(description, SNIPPET_CHARS),
        location,
        sensor.datastream_count
    )
}

fn detail_text(detail: &SensorDetail) -> String {
    let mut text = String::new();

    let _ = writeln!(
        text,
        "Name: {}",
        detail.name.as_deref().unwrap_or("Unnamed sensor")
    );
    let _ = writeln!(
        text,
        "Description: {}",
        detail.description.as_deref().unwrap_or("")
    );

    let _ = writeln!(text, "\nLocations ({}):", detail.locations.len());
    for loc in &detail.locations {
        let _ = writeln!(
            text,
            "- {} [{}] {}",
            loc.name.as_deref().unwrap_or("unnamed"),
            loc.kind.as_deref().unwrap_or("unknown"),
            coordinates_text(&loc.coordinates)
        );
    }

    let _ = writeln!(text, "\nDatastreams ({}):", detail.datastream_count);
    for ds in &detail.datastreams {
        let unit = ds
            .unit
            .as_ref()
            .and_then(|u| u.symbol.as_deref())
            .unwrap_or("-");
        let property = ds.observed_property.name.as_deref().unwrap_or("unknown property");
        let _ = writeln!(
            text,
            "- {} ({}) measuring {}",
            ds.name.as_deref().unwrap_or("unnamed"),
            unit,
            property
        );
    }

    if let Some(properties) = &detail.properties {
        let rendered =
            serde_json::to_string_pretty(properties).unwrap_or_else(|_| properties.to_string());
        let _ = write!(text, "\nProperties:\n{}", rendered);
    }

    text.trim_end().to_string()
}
