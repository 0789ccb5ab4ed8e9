//! MCP server integration tests
//!
//! These tests drive the protocol layer end to end against a mock FROST
//! server.

mod common;

use bgs_sensor_mcp::mcp::types::{JsonRpcRequest, JsonRpcResponse};
use bgs_sensor_mcp::mcp::{McpServer, ToolRegistry, ToolSurface, AVAILABLE_TOOLS};
use common::MockFrost;
use serde_json::{json, Value};

fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: "tools/call".to_string(),
        params: Some(json!({ "name": name, "arguments": arguments })),
        id: Some(json!(id)),
    }
}

fn tool_text(resp: &JsonRpcResponse) -> (bool, String) {
    let result = resp.result.as_ref().expect("tools/call returned a JSON-RPC error");
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    (is_error, text)
}

#[test]
fn test_jsonrpc_request_parsing() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "tools/list",
        "id": 1
    }"#;

    let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.method, "tools/list");
    assert_eq!(request.id, Some(json!(1)));
    assert!(request.params.is_none());
}

#[tokio::test]
async fn test_tool_registry_full_surface() {
    let mock = MockFrost::start().await;
    let registry = ToolRegistry::new(mock.service(), ToolSurface::Full);

    let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(names, AVAILABLE_TOOLS);
}

#[tokio::test]
async fn test_tools_list_over_jsonrpc() {
    let mock = MockFrost::start().await;
    let server = McpServer::new(mock.service(), ToolSurface::SearchFetch);

    let resp = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"tools/list","id":"a"}"#)
        .await
        .unwrap();

    let tools = resp.result.unwrap()["tools"].clone();
    assert_eq!(tools[0]["name"], "search");
    assert_eq!(tools[1]["name"], "fetch");
    assert_eq!(tools[1]["inputSchema"]["required"], json!(["id"]));
}

#[tokio::test]
async fn test_search_alias_matches_search_sensors() {
    let mock = MockFrost::start().await;
    mock.json(
        "Things",
        json!({ "value": [{ "@iot.id": 1, "name": "Borehole A" }] }),
    );
    let server = McpServer::new(mock.service(), ToolSurface::Full);

    let aliased = server
        .handle_request(call(1, "search", json!({ "query": "bore" })))
        .await
        .unwrap();
    let direct = server
        .handle_request(call(2, "search_sensors", json!({ "query": "bore" })))
        .await
        .unwrap();

    assert_eq!(tool_text(&aliased), tool_text(&direct));
    let body: Value = serde_json::from_str(&tool_text(&direct).1).unwrap();
    assert_eq!(body["sensors"][0]["name"], "Borehole A");
}

#[tokio::test]
async fn test_fetch_alias_takes_sensor_id() {
    let mock = MockFrost::start().await;
    mock.json("Things(12)", json!({ "@iot.id": 12, "name": "Gauge" }));
    let server = McpServer::new(mock.service(), ToolSurface::Full);

    let resp = server
        .handle_request(call(1, "fetch", json!({ "sensor_id": 12 })))
        .await
        .unwrap();

    let (is_error, text) = tool_text(&resp);
    assert!(!is_error);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["sensor"]["name"], "Gauge");
}

#[tokio::test]
async fn test_upstream_failure_is_tool_error() {
    let mock = MockFrost::start().await;
    mock.fail("ObservedProperties", 502, "bad gateway");
    let server = McpServer::new(mock.service(), ToolSurface::Full);

    let resp = server
        .handle_request(call(1, "get_observed_properties", json!({})))
        .await
        .unwrap();

    assert!(resp.error.is_none());
    let (is_error, text) = tool_text(&resp);
    assert!(is_error);
    assert_eq!(text, "Upstream HTTP error 502: bad gateway");
}

#[tokio::test]
async fn test_api_info_without_arguments() {
    let mock = MockFrost::start().await;
    mock.fail("", 404, "");
    let server = McpServer::new(mock.service(), ToolSurface::Full);

    let mut request = call(1, "get_api_info", Value::Null);
    request.params = Some(json!({ "name": "get_api_info" }));
    let resp = server.handle_request(request).await.unwrap();

    let (is_error, text) = tool_text(&resp);
    assert!(!is_error);
    assert!(text.contains("Could not retrieve API information"));
}

#[tokio::test]
async fn test_two_tool_fetch_requires_id() {
    let mock = MockFrost::start().await;
    let server = McpServer::new(mock.service(), ToolSurface::SearchFetch);

    let resp = server
        .handle_request(call(1, "fetch", json!({})))
        .await
        .unwrap();

    let (is_error, text) = tool_text(&resp);
    assert!(is_error);
    assert_eq!(text, "Missing required parameter: id");
    assert!(mock.hits().is_empty());
}
