//! In-process stand-in for a FROST server.
//!
//! Serves canned bodies keyed by the path below the base URL and records
//! every request so tests can assert on the query string and headers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bgs_sensor_mcp::config::ServiceConfig;
use bgs_sensor_mcp::SensorService;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

/// Path prefix the mock serves under, mirroring the real deployment
pub const BASE_PATH: &str = "/FROST-Server/v1.1";

/// One request seen by the mock
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Path below the base URL, e.g. `Things(1)`
    pub path: String,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    /// `Accept` header
    pub accept: Option<String>,
    /// `User-Agent` header
    pub user_agent: Option<String>,
}

impl Recorded {
    /// Query parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Debug, Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    hits: Arc<Mutex<Vec<Recorded>>>,
}

/// Running mock server
pub struct MockFrost {
    /// Base URL to configure the client with
    pub base_url: String,
    state: MockState,
}

impl MockFrost {
    /// Bind an ephemeral port and start serving
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}{}", addr, BASE_PATH),
            state,
        }
    }

    fn route(&self, path: &str, canned: Canned) {
        self.state.routes.lock().insert(path.to_string(), canned);
    }

    /// Answer `path` with a JSON body
    pub fn json(&self, path: &str, body: Value) {
        self.route(
            path,
            Canned {
                status: StatusCode::OK,
                content_type: "application/json",
                body: body.to_string(),
            },
        );
    }

    /// Answer `path` with a CSV body
    pub fn csv(&self, path: &str, body: &str) {
        self.route(
            path,
            Canned {
                status: StatusCode::OK,
                content_type: "text/csv",
                body: body.to_string(),
            },
        );
    }

    /// Answer `path` with an error status
    pub fn fail(&self, path: &str, status: u16, body: &str) {
        self.route(
            path,
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                content_type: "text/plain",
                body: body.to_string(),
            },
        );
    }

    /// Every request seen so far
    pub fn hits(&self) -> Vec<Recorded> {
        self.state.hits.lock().clone()
    }

    /// Most recent request
    pub fn last(&self) -> Recorded {
        self.hits().pop().expect("no request reached the mock")
    }

    /// Client configuration pointing at the mock
    pub fn config(&self) -> ServiceConfig {
        ServiceConfig::new(&self.base_url).with_user_agent("bgs-sensor-mcp-tests/1.0")
    }

    /// Sensor service pointing at the mock
    pub fn service(&self) -> SensorService {
        SensorService::from_config(self.config()).unwrap()
    }
}

async fn handle(State(state): State<MockState>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri
        .path()
        .strip_prefix(BASE_PATH)
        .unwrap_or(uri.path())
        .trim_start_matches('/')
        .to_string();

    let query = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .into_owned()
        .collect();

    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.hits.lock().push(Recorded {
        path: path.clone(),
        query,
        accept: header_text(header::ACCEPT),
        user_agent: header_text(header::USER_AGENT),
    });

    let canned = state.routes.lock().get(&path).cloned();
    match canned {
        Some(c) => (c.status, [(header::CONTENT_TYPE, c.content_type)], c.body).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no route for {}", path)).into_response(),
    }
}
