//! MCP server implementation
//!
//! [`McpServer`] turns JSON-RPC requests into tool registry calls. It is
//! transport-agnostic: [`McpServer::run_stdio`] drives it from
//! newline-delimited stdin/stdout, and the HTTP handlers feed it requests
//! received over SSE sessions or plain POSTs.

use crate::error::{Error, McpError, Result};
use crate::mcp::tools::{ToolRegistry, ToolSurface};
use crate::mcp::types::{
    JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo, ToolCallParams,
    PROTOCOL_VERSION,
};
use crate::sensors::SensorService;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Text returned to clients in the `initialize` result
pub const INSTRUCTIONS: &str = "Provides access to the British Geological Survey FROST Server \
API for sensor data discovery and observations.";

/// MCP server state
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
    /// Server info
    info: McpServerInfo,
    /// Whether the server has been initialized
    initialized: RwLock<bool>,
}

impl McpServer {
    /// Create a server exposing `surface` over `service`
    pub fn new(service: SensorService, surface: ToolSurface) -> Self {
        Self::with_registry(ToolRegistry::new(service, surface))
    }

    /// Create a server around an existing registry
    pub fn with_registry(tools: ToolRegistry) -> Self {
        Self {
            tools,
            info: McpServerInfo::default(),
            initialized: RwLock::new(false),
        }
    }

    /// Server name and version
    pub fn info(&self) -> &McpServerInfo {
        &self.info
    }

    /// Tool surface being served
    pub fn surface(&self) -> ToolSurface {
        self.tools.surface()
    }

    /// Whether `initialize` has been received (and no `shutdown` since)
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF
    #[instrument(skip(self))]
    pub async fn run_stdio(&self) -> Result<()> {
        info!(
            "Starting MCP server on stdio: {} v{} ({:?} surface)",
            self.info.name,
            self.info.version,
            self.surface()
        );

        let stdin = BufReader::new(tokio::io::stdin());
        self.serve_lines(stdin, tokio::io::stdout()).await?;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC from `input`, writing one response
    /// line per request to `output`.
    pub async fn serve_lines<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: tokio::io::AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(resp) = self.handle_line(&line).await {
                let json = encode_response(&resp);
                debug!("Sending: {}", json);

                output.write_all(json.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single line of input
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::parse_error());
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request. Notifications yield `None`.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let method = request.method.as_str();

        info!("Handling method: {}", method);

        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return Some(JsonRpcResponse::invalid_request(id, &err.to_string()));
        }

        let result = match method {
            // Lifecycle methods
            "initialize" => self.handle_initialize(request.params).await,
            "initialized" | "notifications/initialized" => {
                return None;
            }
            "shutdown" => self.handle_shutdown().await,

            // Tool methods
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params).await,

            "ping" => Ok(json!({})),

            _ => {
                if id.is_none() {
                    debug!("Ignoring unknown notification: {}", method);
                    return None;
                }
                warn!("Unknown method: {}", method);
                return Some(JsonRpcResponse::method_not_found(id, method));
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(Error::Mcp(McpError::InvalidParams(msg))) => {
                JsonRpcResponse::invalid_params(id, &msg)
            }
            Err(e) => JsonRpcResponse::internal_error(id, &e.to_string()),
        })
    }

    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        if let Some(version) = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
        {
            debug!("Client protocol version: {}", version);
        }

        *self.initialized.write().await = true;

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": McpCapabilities::default(),
            "serverInfo": self.info,
            "instructions": INSTRUCTIONS
        }))
    }

    async fn handle_shutdown(&self) -> Result<Value> {
        info!("Handling shutdown");
        *self.initialized.write().await = false;
        Ok(json!(null))
    }

    async fn handle_tools_list(&self) -> Result<Value> {
        Ok(json!({
            "tools": self.tools.definitions()
        }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value> {
        let params =
            params.ok_or_else(|| McpError::InvalidParams("missing tools/call params".into()))?;

        let tool_params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let result = self
            .tools
            .execute(&tool_params.name, tool_params.arguments)
            .await;

        Ok(serde_json::to_value(result)?)
    }
}

/// Serialize a response, falling back to a fixed internal error
pub fn encode_response(resp: &JsonRpcResponse) -> String {
    serde_json::to_string(resp).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use pretty_assertions::assert_eq;

    fn server(surface: ToolSurface) -> McpServer {
        let service =
            SensorService::from_config(ServiceConfig::new("http://127.0.0.1:9/v1.1")).unwrap();
        McpServer::new(service, surface)
    }

    fn request(method: &str, params: Option<Value>, id: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server(ToolSurface::Full);
        assert!(!server.is_initialized().await);

        let resp = server
            .handle_request(request(
                "initialize",
                Some(json!({ "protocolVersion": "2024-11-05" })),
                Some(json!(1)),
            ))
            .await
            .unwrap();

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "BGS Sensor API");
        assert_eq!(result["instructions"], INSTRUCTIONS);
        assert!(server.is_initialized().await);
    }

    #[tokio::test]
    async fn test_shutdown_clears_initialized() {
        let server = server(ToolSurface::Full);
        server
            .handle_request(request("initialize", None, Some(json!(1))))
            .await;
        server
            .handle_request(request("shutdown", None, Some(json!(2))))
            .await;
        assert!(!server.is_initialized().await);
    }

    #[tokio::test]
    async fn test_initialized_notification_has_no_response() {
        let server = server(ToolSurface::Full);
        assert!(server
            .handle_request(request("initialized", None, None))
            .await
            .is_none());
        assert!(server
            .handle_request(request("notifications/initialized", None, None))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = server(ToolSurface::Full)
            .handle_request(request("resources/list", None, Some(json!(7))))
            .await
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(resp.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut req = request("ping", None, Some(json!(4)));
        req.jsonrpc = "1.0".to_string();
        let resp = server(ToolSurface::Full).handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let resp = server(ToolSurface::Full)
            .handle_request(request("tools/call", None, Some(json!(3))))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let resp = server(ToolSurface::Full)
            .handle_line("{not json")
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_serve_lines_skips_blank_and_notifications() {
        let server = server(ToolSurface::SearchFetch);
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"ping","id":1}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"tools/list","id":2}"#,
            "\n"
        );
        let mut output = Vec::new();

        server
            .serve_lines(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 2);
    }
}
