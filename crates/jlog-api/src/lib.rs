//! jlog-api - HTTP RPC layer for the journal gateway
//!
//! Exposes the three gateway methods over JSON:
//!
//! - `GET  /logs/v1/list` - boot sessions and unit names
//! - `POST /logs/v1/load` - one page of log entries for a filter
//! - `POST /logs/v1/cancel-load` - signal the in-flight load
//!
//! The layer is backend-agnostic: it only talks to
//! [`jlog_journal::LogGateway`] through [`AppState`].

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the RPC router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Log query RPC surface
        .route("/logs/v1/list", get(handlers::logs::list))
        .route("/logs/v1/load", post(handlers::logs::load))
        .route("/logs/v1/cancel-load", post(handlers::logs::cancel_load))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
