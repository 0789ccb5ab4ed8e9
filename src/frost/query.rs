//! OData query construction for the SensorThings API.
//!
//! Tools describe what they want with [`QueryOptions`] and the predicate
//! helpers below; [`QueryOptions::to_query_pairs`] turns that into the
//! `$`-prefixed parameters the FROST server understands.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Response representation requested from the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// Regular SensorThings JSON (no `$resultFormat`)
    #[default]
    Json,
    /// `$resultFormat=GeoJSON`
    GeoJson,
    /// `$resultFormat=CSV`, returned as raw text
    Csv,
}

impl ResultFormat {
    /// Value for `$resultFormat`, if any
    pub fn result_format_param(self) -> Option<&'static str> {
        match self {
            ResultFormat::Json => None,
            ResultFormat::GeoJson => Some("GeoJSON"),
            ResultFormat::Csv => Some("CSV"),
        }
    }

    /// `Accept` header for this format
    pub fn accept_header(self) -> &'static str {
        match self {
            ResultFormat::Csv => "text/csv",
            _ => "application/json",
        }
    }
}

/// Logical query options for one upstream request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Page size (`$top`)
    pub limit: Option<u32>,
    /// Boolean predicate (`$filter`)
    pub filter: Option<String>,
    /// Inline related entities (`$expand`)
    pub expand: Option<String>,
    /// Sort expression (`$orderby`)
    pub orderby: Option<String>,
    /// Field projection (`$select`)
    pub select: Option<String>,
    /// Paging offset (`$skip`)
    pub skip: Option<u32>,
    /// Ask for `@iot.count` in the envelope (`$count=true`)
    pub count: bool,
    /// Response representation
    pub format: ResultFormat,
}

impl QueryOptions {
    /// Empty option set (JSON, no parameters)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `$top`
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set `$filter` from already-joined predicates; `None` leaves it unset
    pub fn filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set `$expand`
    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    /// Set `$orderby`
    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    /// Set `$select`
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Set `$skip`
    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Request `$count=true`
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Set the response format
    pub fn format(mut self, format: ResultFormat) -> Self {
        self.format = format;
        self
    }

    /// Render the options as ordered query-string pairs.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(limit) = self.limit {
            pairs.push(("$top", limit.to_string()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.clone()));
        }
        if let Some(expand) = &self.expand {
            pairs.push(("$expand", expand.clone()));
        }
        if let Some(orderby) = &self.orderby {
            pairs.push(("$orderby", orderby.clone()));
        }
        if let Some(select) = &self.select {
            pairs.push(("$select", select.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        if self.count {
            pairs.push(("$count", "true".to_string()));
        }
        if let Some(format) = self.format.result_format_param() {
            pairs.push(("$resultFormat", format.to_string()));
        }

        pairs
    }
}

/// Quote a string literal for an OData expression.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Key segment for an entity path. Integer ids go in bare, anything else
/// is a quoted string key.
pub fn entity_key(id: &str) -> String {
    if id.parse::<i64>().is_ok() {
        id.to_string()
    } else {
        quote_literal(id)
    }
}

/// Path of one entity, e.g. `Things(42)` or `Things('abc')`.
pub fn entity_path(entity_set: &str, id: &str) -> String {
    format!("{}({})", entity_set, entity_key(id))
}

/// Case-insensitive substring predicate on a single field.
pub fn contains_ci(field: &str, needle: &str) -> String {
    format!(
        "contains(tolower({}), {})",
        field,
        quote_literal(&needle.to_lowercase())
    )
}

/// Free-text predicate: substring of `name` OR `description`, ignoring case.
pub fn text_search(query: &str) -> String {
    format!(
        "({} or {})",
        contains_ci("name", query),
        contains_ci("description", query)
    )
}

/// Geographic predicate from a comma-separated literal.
///
/// * `lat1,lng1,lat2,lng2` intersects the rectangle with those corners
/// * `lat,lng,radius_km` lies within `radius_km` of the point
///
/// Anything without a comma, or with another number of parts, yields
/// `Ok(None)`. Non-numeric parts are an error.
pub fn location_filter(input: &str) -> Result<Option<String>> {
    if !input.contains(',') {
        return Ok(None);
    }

    let parts: Vec<&str> = input.split(',').collect();
    match parts.len() {
        4 => {
            let [lat1, lng1, lat2, lng2] = parse_coordinates::<4>(input, &parts)?;
            Ok(Some(format!(
                "geo.intersects(location, geography'POLYGON(({lng1} {lat1}, {lng2} {lat1}, {lng2} {lat2}, {lng1} {lat2}, {lng1} {lat1}))')"
            )))
        }
        3 => {
            let [lat, lng, radius_km] = parse_coordinates::<3>(input, &parts)?;
            let radius_m = radius_km * 1000.0;
            Ok(Some(format!(
                "geo.distance(location, geography'POINT({lng} {lat})') le {radius_m}"
            )))
        }
        _ => Ok(None),
    }
}

fn parse_coordinates<const N: usize>(input: &str, parts: &[&str]) -> Result<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidGeoFilter {
                input: input.to_string(),
                reason: format!("'{}': {}", part.trim(), e),
            })?;
    }
    Ok(out)
}

/// Inclusive phenomenon-time window. Either bound may be omitted.
pub fn time_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!(
            "phenomenonTime ge {start} and phenomenonTime le {end}"
        )),
        (Some(start), None) => Some(format!("phenomenonTime ge {start}")),
        (None, Some(end)) => Some(format!("phenomenonTime le {end}")),
        (None, None) => None,
    }
}

/// AND-join predicates in the order given; `None` when there are none.
pub fn join_predicates(predicates: Vec<String>) -> Option<String> {
    if predicates.is_empty() {
        None
    } else {
        Some(predicates.join(" and "))
    }
}
