//! Application state for the RPC layer

use std::sync::Arc;

use jlog_journal::LogGateway;

/// State shared across all handlers
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<LogGateway>,
}

impl AppState {
    /// Create state around a gateway instance
    pub fn new(gateway: Arc<LogGateway>) -> Self {
        Self { gateway }
    }

    /// The gateway serving this process
    pub fn gateway(&self) -> &LogGateway {
        &self.gateway
    }
}
