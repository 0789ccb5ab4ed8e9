//! HTTP transport.
//!
//! Routes:
//! - `GET /sse` + `POST /messages?session_id=..` - MCP over server-sent events
//! - `POST /mcp` - one JSON-RPC request per POST, response in the body
//! - `GET /health`, `GET /status` - probes and counters

pub mod rpc;
pub mod sse;
pub mod status;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cors::{cors_layer, CorsPolicy};
use crate::error::Result;
use crate::mcp::{JsonRpcRequest, JsonRpcResponse, McpServer};

pub use status::ServerStats;

/// Outgoing messages buffered per SSE session
pub const SESSION_BUFFER: usize = 32;

/// Open SSE sessions, keyed by session id
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<String, mpsc::Sender<String>>>>,
}

impl Sessions {
    /// Register a new session and return its id and message receiver
    pub fn open(&self) -> (String, mpsc::Receiver<String>) {
        let id = Uuid::new_v4().simple().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.inner.write().insert(id.clone(), tx);
        (id, rx)
    }

    /// Sender for `id`, if the session is still open
    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<String>> {
        self.inner.read().get(id).cloned()
    }

    /// Forget a session
    pub fn close(&self, id: &str) -> bool {
        self.inner.write().remove(id).is_some()
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no session is open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    /// Protocol handler
    pub mcp: Arc<McpServer>,
    /// Counters for `/status`
    pub stats: Arc<ServerStats>,
    /// SSE session table
    pub sessions: Sessions,
    /// FROST base URL, reported by `/status`
    pub upstream: Arc<str>,
}

impl AppState {
    /// State for `mcp`, talking to `upstream`
    pub fn new(mcp: McpServer, upstream: impl Into<Arc<str>>) -> Self {
        Self {
            mcp: Arc::new(mcp),
            stats: Arc::new(ServerStats::new()),
            sessions: Sessions::default(),
            upstream: upstream.into(),
        }
    }

    /// Handle one JSON-RPC message body and record it in the counters
    pub async fn dispatch(&self, body: &str) -> Option<JsonRpcResponse> {
        let started = Instant::now();

        let request: JsonRpcRequest = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                self.stats.record_request(false, true, started.elapsed());
                return Some(JsonRpcResponse::parse_error());
            }
        };

        let is_tool_call = request.method == "tools/call";
        let response = self.mcp.handle_request(request).await;

        let failed = response.as_ref().is_some_and(|r| {
            r.error.is_some()
                || r.result
                    .as_ref()
                    .and_then(|v| v.get("isError"))
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false)
        });
        self.stats
            .record_request(is_tool_call, failed, started.elapsed());

        response
    }
}

/// Build the application router
pub fn router(state: AppState, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/sse", get(sse::sse_handler))
        .route("/messages", post(sse::message_handler))
        .route("/messages/", post(sse::message_handler))
        .route("/mcp", post(rpc::mcp_handler))
        .route("/health", get(status::health_handler))
        .route("/status", get(status::status_handler))
        .layer(cors_layer(cors))
        .with_state(state)
}

/// Serve `state` on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState, cors: CorsPolicy) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Listening on http://{} (SSE endpoint /sse)", addr);

    axum::serve(listener, router(state, cors))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
