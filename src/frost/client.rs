//! HTTP client for the FROST server.
//!
//! One GET per call, no retries. Non-success statuses become
//! [`Error::Upstream`] carrying the body so callers can report it.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::frost::query::{QueryOptions, ResultFormat};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// Raw upstream payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON (regular and GeoJSON responses)
    Json(Value),
    /// Body text exactly as received (CSV responses)
    Text(String),
}

impl Payload {
    /// Deserialize a JSON payload into an upstream model type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Text(_) => Err(Error::generic("expected a JSON payload, got text")),
        }
    }

    /// Render the payload as tool output text without reshaping it.
    pub fn into_text(self) -> Result<String> {
        match self {
            Payload::Json(value) => Ok(serde_json::to_string(&value)?),
            Payload::Text(text) => Ok(text),
        }
    }
}

/// Client for one SensorThings service
#[derive(Debug, Clone)]
pub struct FrostClient {
    http: reqwest::Client,
    config: Arc<ServiceConfig>,
}

impl FrostClient {
    /// Build a client from configuration
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        // Fail at startup rather than on the first tool call.
        Url::parse(&config.base_url)?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Shared configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Full request URL for `endpoint` with the encoded query string.
    ///
    /// An empty endpoint addresses the service root (`<base>/`).
    pub fn url_for(&self, endpoint: &str, options: &QueryOptions) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.config.base_url, endpoint))?;

        let pairs = options.to_query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GET `endpoint` with `options`.
    ///
    /// CSV responses come back as [`Payload::Text`] untouched; everything
    /// else must parse as JSON.
    #[instrument(skip(self, options), fields(format = ?options.format))]
    pub async fn request(&self, endpoint: &str, options: &QueryOptions) -> Result<Payload> {
        let url = self.url_for(endpoint, options)?;
        debug!(%url, "FROST request");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, options.format.accept_header())
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!("FROST request failed: {}", e);
                Error::Network(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "FROST server returned an error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        if options.format == ResultFormat::Csv {
            return Ok(Payload::Text(body));
        }

        Ok(Payload::Json(serde_json::from_str(&body)?))
    }

    /// GET and decode straight into a model type (JSON format only).
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &QueryOptions,
    ) -> Result<T> {
        self.request(endpoint, options).await?.decode()
    }
}
