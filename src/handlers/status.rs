//! Status and health check handlers.
//!
//! - `/health` - liveness probe for load balancers
//! - `/status` - counters and latency percentiles for MCP traffic
//!
//! # Example Response
//!
//! ```json
//! {
//!   "name": "bgs-sensor-mcp",
//!   "version": "0.1.0",
//!   "uptime_seconds": 3600,
//!   "surface": "full",
//!   "upstream": "https://sensors.bgs.ac.uk/FROST-Server/v1.1",
//!   "requests": 1024,
//!   "tool_calls": 310,
//!   "errors": 4,
//!   "active_sse_connections": 2,
//!   "latency": { "p50_ms": 180.2, "p95_ms": 640.0, "p99_ms": 1210.5 }
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::handlers::AppState;
use crate::mcp::ToolSurface;

// ============================================================================
// Response Types
// ============================================================================

/// Liveness probe body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// `/status` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Advertised tool surface
    pub surface: String,
    /// FROST base URL
    pub upstream: String,
    /// JSON-RPC requests handled over HTTP
    pub requests: u64,
    /// `tools/call` requests among them
    pub tool_calls: u64,
    /// Responses carrying a JSON-RPC error or a failed tool result
    pub errors: u64,
    /// Open SSE streams
    pub active_sse_connections: u64,
    /// Request latency
    pub latency: LatencyMetrics,
    /// RFC 3339 time of this snapshot
    pub timestamp: String,
}

/// Latency percentiles in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Median
    pub p50_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
    /// Mean
    pub mean_ms: f64,
    /// Slowest recorded request
    pub max_ms: f64,
}

// ============================================================================
// Latency Histogram
// ============================================================================

/// Thread-safe request latency histogram (microsecond resolution)
#[derive(Debug)]
pub struct LatencyHistogram {
    inner: RwLock<Histogram<u64>>,
}

impl LatencyHistogram {
    /// Track 1us to 5 minutes with 3 significant figures
    pub fn new() -> Self {
        // Constant bounds; construction only fails for low >= high or sigfig > 5
        let histogram =
            Histogram::new_with_bounds(1, 300_000_000, 3).expect("valid histogram bounds");
        Self {
            inner: RwLock::new(histogram),
        }
    }

    /// Record one request duration. Out-of-range values are clamped.
    pub fn record(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.inner.write().saturating_record(micros.max(1));
    }

    /// Number of recorded samples
    pub fn count(&self) -> u64 {
        self.inner.read().len()
    }

    /// Snapshot of the percentiles
    pub fn metrics(&self) -> LatencyMetrics {
        let hist = self.inner.read();
        if hist.is_empty() {
            return LatencyMetrics::default();
        }
        LatencyMetrics {
            p50_ms: hist.value_at_quantile(0.50) as f64 / 1000.0,
            p95_ms: hist.value_at_quantile(0.95) as f64 / 1000.0,
            p99_ms: hist.value_at_quantile(0.99) as f64 / 1000.0,
            mean_ms: hist.mean() / 1000.0,
            max_ms: hist.max() as f64 / 1000.0,
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Process-wide counters for the HTTP transport
#[derive(Debug)]
pub struct ServerStats {
    start_time: Instant,
    requests: AtomicU64,
    tool_calls: AtomicU64,
    errors: AtomicU64,
    active_sse_connections: AtomicU64,
    latency: LatencyHistogram,
}

impl ServerStats {
    /// Fresh counters starting now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            active_sse_connections: AtomicU64::new(0),
            latency: LatencyHistogram::new(),
        }
    }

    /// Seconds since startup
    #[inline]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Record one handled JSON-RPC request
    pub fn record_request(&self, is_tool_call: bool, failed: bool, elapsed: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if is_tool_call {
            self.tool_calls.fetch_add(1, Ordering::Relaxed);
        }
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.latency.record(elapsed);
    }

    /// JSON-RPC requests handled
    #[inline]
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// `tools/call` requests handled
    #[inline]
    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }

    /// Failed requests
    #[inline]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Open SSE streams
    #[inline]
    pub fn active_sse_connections(&self) -> u64 {
        self.active_sse_connections.load(Ordering::Relaxed)
    }

    /// A new SSE stream opened
    #[inline]
    pub fn increment_sse_connections(&self) -> u64 {
        self.active_sse_connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// An SSE stream closed; never goes below zero
    pub fn decrement_sse_connections(&self) -> u64 {
        let previous = self
            .active_sse_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    /// Latency snapshot
    pub fn latency_metrics(&self) -> LatencyMetrics {
        self.latency.metrics()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

fn surface_label(surface: ToolSurface) -> &'static str {
    match surface {
        ToolSurface::Full => "full",
        ToolSurface::SearchFetch => "search-fetch",
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// `GET /health`
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// `GET /status`
#[instrument(skip_all)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Status check requested");

    let stats = &state.stats;
    let response = StatusResponse {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        uptime_seconds: stats.uptime_seconds(),
        surface: surface_label(state.mcp.surface()).to_string(),
        upstream: state.upstream.to_string(),
        requests: stats.requests(),
        tool_calls: stats.tool_calls(),
        errors: stats.errors(),
        active_sse_connections: stats.active_sse_connections(),
        latency: stats.latency_metrics(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_default() {
        assert_eq!(HealthResponse::default().status, "healthy");
    }

    #[test]
    fn test_stats_counters() {
        let stats = ServerStats::new();
        stats.record_request(true, false, Duration::from_millis(120));
        stats.record_request(false, false, Duration::from_millis(2));
        stats.record_request(true, true, Duration::from_millis(900));

        assert_eq!(stats.requests(), 3);
        assert_eq!(stats.tool_calls(), 2);
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.latency.count(), 3);
    }

    #[test]
    fn test_sse_connections_never_underflow() {
        let stats = ServerStats::new();
        assert_eq!(stats.increment_sse_connections(), 1);
        assert_eq!(stats.decrement_sse_connections(), 0);
        assert_eq!(stats.decrement_sse_connections(), 0);
        assert_eq!(stats.active_sse_connections(), 0);
    }

    #[test]
    fn test_latency_metrics_empty_and_filled() {
        let hist = LatencyHistogram::new();
        assert_eq!(hist.metrics().p50_ms, 0.0);

        for ms in [10u64, 20, 30, 40, 1000] {
            hist.record(Duration::from_millis(ms));
        }
        let metrics = hist.metrics();
        assert!(metrics.p50_ms >= 29.0 && metrics.p50_ms <= 31.0);
        assert!(metrics.max_ms >= 999.0);
    }

    #[test]
    fn test_zero_duration_is_recorded() {
        let hist = LatencyHistogram::new();
        hist.record(Duration::ZERO);
        assert_eq!(hist.count(), 1);
    }
}
