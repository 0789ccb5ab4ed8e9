//! Error types for the BGS sensor MCP server
//!
//! This module provides the error hierarchy using `thiserror`. Upstream
//! failures, malformed caller input and MCP protocol problems each get
//! their own variant so callers can decide which ones to recover from.

use thiserror::Error;

/// The main error type for sensor API operations
#[derive(Error, Debug)]
pub enum Error {
    /// The FROST server answered with a non-success status
    #[error("Upstream HTTP error {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        body: String,
    },

    /// The request never produced a response (connect, TLS, timeout, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A geographic filter literal with non-numeric components
    #[error("Invalid location filter '{input}': {reason}")]
    InvalidGeoFilter {
        /// The literal as supplied by the caller
        input: String,
        /// Parse failure detail
        reason: String,
    },

    /// A required identifier was absent or blank
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The configured base URL or a derived request URL is not valid
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// MCP protocol errors
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    /// Invalid JSON-RPC request
    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Unknown or expired transport session
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// Result type alias for sensor API operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Whether this error came from talking to the FROST server, as opposed
    /// to bad input or a bug on our side.
    ///
    /// The documented fallbacks (recent observations, API info) recover from
    /// these and nothing else.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, Error::Upstream { .. } | Error::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = Error::Upstream {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_geo_filter_error_display() {
        let err = Error::InvalidGeoFilter {
            input: "52.1,abc,3".to_string(),
            reason: "invalid float literal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid location filter '52.1,abc,3': invalid float literal"
        );
    }

    #[test]
    fn test_missing_parameter() {
        let err = Error::MissingParameter("sensor_id");
        assert_eq!(err.to_string(), "Missing required parameter: sensor_id");
        assert!(!err.is_upstream_failure());
    }

    #[test]
    fn test_upstream_failure_classification() {
        let upstream = Error::Upstream {
            status: 404,
            body: String::new(),
        };
        assert!(upstream.is_upstream_failure());

        let json = Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(!json.is_upstream_failure());
        assert!(!Error::generic("boom").is_upstream_failure());
    }

    #[test]
    fn test_mcp_error() {
        let err = McpError::ToolNotFound("unknown_tool".to_string());
        assert_eq!(err.to_string(), "Tool not found: unknown_tool");
    }
}
