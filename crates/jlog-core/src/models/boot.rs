//! Boot session records

use serde::{Deserialize, Serialize};

use crate::models::LogEntry;

/// One boot session of the host, as listed by the journal.
///
/// Records are kept most-recent-first. The list is computed once at gateway
/// startup and cached for the process lifetime; a boot occurring after that
/// is invisible to `List` until restart (accepted staleness).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootRecord {
    /// Opaque session identifier
    pub hash: String,
    /// Session start, UTC seconds
    pub start: i64,
    /// Session end, UTC seconds; absent for the currently running session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

/// Reply payload of the `List` RPC method
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    /// Boot sessions, most recent first
    pub boots: Vec<BootRecord>,
    /// Installed unit names (type suffix preserved), with the kernel
    /// ring-buffer sentinel appended last
    pub services: Vec<String>,
}

/// Reply payload of the `Load` RPC method
pub type LoadResponse = Vec<LogEntry>;
