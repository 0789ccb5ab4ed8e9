//! Service configuration.
//!
//! Configuration is assembled once at startup (from CLI flags and the
//! environment) and handed to the components that need it. Nothing reads
//! global state after that.

use crate::frost::query::entity_path;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default FROST endpoint (British Geological Survey, SensorThings v1.1).
pub const DEFAULT_BASE_URL: &str = "https://sensors.bgs.ac.uk/FROST-Server/v1.1";

/// Default listen port for the HTTP transports.
pub const DEFAULT_PORT: u16 = 8000;

/// Upstream API configuration shared by every tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the SensorThings service, without trailing slash.
    pub base_url: String,

    /// Value sent as `User-Agent` on every upstream request.
    pub user_agent: String,

    /// Request timeout; `None` keeps the transport default.
    #[serde(default, with = "optional_secs")]
    pub timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
            timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Override the identifying client header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set an explicit request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Canonical URL of a single Thing, e.g. `<base>/Things(42)`.
    pub fn thing_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, entity_path("Things", id))
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("bgs-sensor-mcp/"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        let config = ServiceConfig::new("http://localhost:8080/FROST-Server/v1.1//");
        assert_eq!(config.base_url, "http://localhost:8080/FROST-Server/v1.1");
    }

    #[test]
    fn test_thing_url() {
        let config = ServiceConfig::default();
        assert_eq!(
            config.thing_url("42"),
            "https://sensors.bgs.ac.uk/FROST-Server/v1.1/Things(42)"
        );
        assert_eq!(
            config.thing_url("abc"),
            "https://sensors.bgs.ac.uk/FROST-Server/v1.1/Things('abc')"
        );
    }

    #[test]
    fn test_server_listen_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.listen_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_timeout_serializes_as_seconds() {
        let config = ServiceConfig::default().with_timeout(Duration::from_secs(30));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout"], 30);

        let back: ServiceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.timeout, Some(Duration::from_secs(30)));
    }
}
