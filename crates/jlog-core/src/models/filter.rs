//! Query filter derived from a `Load` request

use serde::{Deserialize, Serialize};

/// Hard cap on rows returned by a single `Load` call
pub const MAX_LOG_RECORDS: usize = 100;

/// Resume direction carried by a request cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// Continue towards newer records
    Forward,
    /// Continue towards older records
    Backward,
}

/// Opaque resume position plus direction, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorRef {
    /// Position token from a previous result page
    pub id: String,
    /// Which way to continue from it
    pub direction: CursorDirection,
}

/// Structured description of one `Load` request.
///
/// Wire field names are part of the RPC contract. Precedence: a `time`
/// bound overrides any `cursor`; with neither present the scan starts at
/// the journal tail and proceeds backward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilter {
    /// Boot session hash to restrict the scan to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot: Option<String>,
    /// Unit to restrict the scan to, or the ring-buffer sentinel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Upper time bound, UTC seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Severities to keep; empty means all. Values outside 0..=7 are
    /// skipped during planning, not rejected here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<u32>,
    /// Text or regex pattern messages must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Whether pattern matching is case sensitive (default true)
    #[serde(rename = "case-sensitive", skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    /// Whether the pattern is a regular expression (default false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<bool>,
    /// Resume position from a previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorRef>,
    /// Requested row count, clamped to `0..=MAX_LOG_RECORDS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryFilter {
    /// Effective case sensitivity
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(true)
    }

    /// Effective regex mode
    pub fn is_regex(&self) -> bool {
        self.regex.unwrap_or(false)
    }

    /// Pattern text, empty when none was supplied
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or("")
    }

    /// Row cap for this request: `min(MAX_LOG_RECORDS, limit)`,
    /// defaulting to `MAX_LOG_RECORDS`
    pub fn max_entries(&self) -> usize {
        self.limit
            .map(|l| l as usize)
            .unwrap_or(MAX_LOG_RECORDS)
            .min(MAX_LOG_RECORDS)
    }

    /// Requested service, with empty strings treated as absent
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref().filter(|s| !s.is_empty())
    }

    /// Requested boot hash, with empty strings treated as absent
    pub fn boot(&self) -> Option<&str> {
        self.boot.as_deref().filter(|b| !b.is_empty())
    }
}
