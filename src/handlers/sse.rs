//! MCP over server-sent events.
//!
//! A client opens `GET /sse` and first receives an `endpoint` event naming
//! the URL to POST its requests to. Each POST to that URL is answered with
//! `202 Accepted`; the JSON-RPC response arrives later as a `message` event
//! on the open stream.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::error::McpError;
use crate::handlers::AppState;
use crate::mcp::encode_response;

/// Query string of `POST /messages`
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Session id from the `endpoint` event
    pub session_id: String,
}

/// Closes the session when the SSE stream is dropped
struct SessionGuard {
    id: String,
    state: AppState,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.sessions.close(&self.id);
        let open = self.state.stats.decrement_sse_connections();
        info!(session = %self.id, open, "SSE session closed");
    }
}

/// Path a client posts to for `session_id`
pub fn endpoint_path(session_id: &str) -> String {
    format!("/messages?session_id={}", session_id)
}

/// `GET /sse`
#[instrument(skip_all)]
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, rx) = state.sessions.open();
    let open = state.stats.increment_sse_connections();
    info!(session = %id, open, "SSE session opened");

    let endpoint = Event::default().event("endpoint").data(endpoint_path(&id));
    let guard = SessionGuard { id, state };

    Sse::new(stream::once(async move { Ok(endpoint) }).chain(messages(rx, guard)))
        .keep_alive(KeepAlive::default())
}

fn messages(
    rx: mpsc::Receiver<String>,
    guard: SessionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        let event = Event::default().event("message").data(message);
        Some((Ok(event), (rx, guard)))
    })
}

/// `POST /messages?session_id=..`
#[instrument(skip_all)]
pub async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(tx) = state.sessions.sender(&query.session_id) else {
        warn!(session = %query.session_id, "POST for unknown session");
        let err = McpError::UnknownSession(query.session_id);
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    };

    tokio::spawn(async move {
        if let Some(resp) = state.dispatch(&body).await {
            if tx.send(encode_response(&resp)).await.is_err() {
                debug!("SSE stream closed before the response was sent");
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
