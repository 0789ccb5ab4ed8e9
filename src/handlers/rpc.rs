//! Plain request/response JSON-RPC over `POST /mcp`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::instrument;

use crate::handlers::AppState;

/// `POST /mcp`. Notifications get `202 Accepted` with an empty body.
#[instrument(skip_all)]
pub async fn mcp_handler(State(state): State<AppState>, body: String) -> Response {
    match state.dispatch(&body).await {
        Some(resp) => (StatusCode::OK, Json(resp)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
