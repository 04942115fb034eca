//! Log query handlers
//!
//! Wire shapes live in `jlog-core`; these handlers only adapt them to HTTP.

use axum::extract::State;
use axum::Json;

use jlog_core::{ListResponse, LogEntry, QueryFilter};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /logs/v1/list
/// Boot sessions (newest first) and installed unit names, ring-buffer
/// sentinel last. Degraded listings come back empty, never as an error.
pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(state.gateway().list())
}

/// POST /logs/v1/load
/// One bounded page of log entries, newest first, for the filter in the
/// request body.
pub async fn load(
    State(state): State<AppState>,
    Json(filter): Json<QueryFilter>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let entries = state.gateway().load(filter).await?;
    Ok(Json(entries))
}

/// POST /logs/v1/cancel-load
/// Signal the in-flight load; idempotent, always succeeds.
pub async fn cancel_load(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.gateway().cancel_load();
    Json(serde_json::json!({}))
}
