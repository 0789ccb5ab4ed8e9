//! Model Context Protocol (MCP) server module
//!
//! This module implements the MCP server for AI agent integration,
//! exposing the BGS sensor tools through the MCP protocol.

mod server;
mod tools;
/// MCP protocol types
pub mod types;

pub use server::{encode_response, McpServer, INSTRUCTIONS};
pub use tools::{McpTool, ToolRegistry, ToolSurface, AVAILABLE_TOOLS, SEARCH_FETCH_TOOLS};
pub use types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo,
    McpToolDefinition, ToolCallParams, ToolCallResult, ToolContent,
};
