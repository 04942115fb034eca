//! Error taxonomy for the journal gateway

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while serving a gateway request.
///
/// Only `Pattern` and `ScanSetup` ever reach an RPC caller: they mean no
/// meaningful response could be formed. The remaining variants are absorbed
/// where they occur (logged, with a degraded but successful response).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller-supplied regular expression failed to compile
    #[error("invalid pattern: {reason}")]
    Pattern { reason: String },

    /// Journal open or seek failed before any record was read
    #[error("journal scan setup failed: {0}")]
    ScanSetup(String),

    /// Mid-scan iteration failure; the scan keeps what it already has
    #[error("journal step failed: {0}")]
    Step(String),

    /// Boot or unit listing command failed
    #[error("listing failed: {0}")]
    Listing(String),

    /// One malformed row in the boot-session listing
    #[error("malformed boot record '{line}': {reason}")]
    BootParse { line: String, reason: String },
}

impl GatewayError {
    /// True when the error must be surfaced to the RPC caller instead of
    /// being absorbed into a partial response.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, Self::Pattern { .. } | Self::ScanSetup(_))
    }
}
