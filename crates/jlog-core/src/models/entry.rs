//! Log entry model and raw-field normalization

use serde::{Deserialize, Serialize};

/// Severity journald assigns to records whose submitter set no priority.
/// Entries carrying this raw priority get no `level` field on the wire.
pub const UNPRIORITIZED_LEVEL: u8 = 6;

/// Message prefixes of the legacy logging convention, mapped to syslog
/// severities. A recognized prefix overrides the record's raw `PRIORITY`.
const PREFIX_LEVELS: &[(&str, u8)] = &[("ERROR:", 3), ("WARNING:", 4), ("DEBUG:", 7)];

/// One log entry as returned to RPC callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Message text
    #[serde(rename = "msg")]
    pub message: String,
    /// Originating unit with any `.service` suffix stripped; only populated
    /// when the request did not pin a single service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Syslog severity 0..=7; absent for unprioritized records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Milliseconds since epoch, UTC
    #[serde(rename = "time", skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<i64>,
    /// Opaque journal position token; trimmed to page boundaries by the
    /// gateway after the result list is assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Accumulator for the raw fields of one journal record.
///
/// Message, priority, timestamp, cursor and unit arrive as separate named
/// fields of the same logical record; they are merged here and shaped into
/// a [`LogEntry`] once the record is complete.
#[derive(Debug, Default)]
pub struct RawRecord {
    message: Option<String>,
    prefix_level: Option<u8>,
    priority: Option<u8>,
    realtime_usec: Option<u64>,
    cursor: Option<String>,
    unit: Option<String>,
}

impl RawRecord {
    /// Set the message text, deriving a severity from its prefix when the
    /// legacy convention applies
    pub fn set_message(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.prefix_level = PREFIX_LEVELS
            .iter()
            .find(|(prefix, _)| raw.starts_with(prefix))
            .map(|&(_, level)| level);
        self.message = Some(raw);
    }

    /// Set the raw `PRIORITY` field; values outside 0..=7 are ignored
    pub fn set_priority(&mut self, raw: &str) {
        self.priority = raw.trim().parse::<u8>().ok().filter(|&p| p <= 7);
    }

    /// Set the record's realtime timestamp in microseconds since epoch
    pub fn set_realtime_usec(&mut self, usec: u64) {
        self.realtime_usec = Some(usec);
    }

    /// Set the opaque journal position token
    pub fn set_cursor(&mut self, cursor: impl Into<String>) {
        self.cursor = Some(cursor.into());
    }

    /// Set the originating systemd unit name
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = Some(unit.into());
    }

    /// Shape the accumulated fields into an entry.
    ///
    /// Returns `None` when no message was seen. A prefix-derived severity
    /// wins over the raw priority; raw priority 6 with no recognized prefix
    /// yields no severity at all. The unit is carried over (suffix stripped)
    /// only when `include_service` is set, i.e. when the request did not
    /// already pin a single service.
    pub fn into_entry(self, include_service: bool) -> Option<LogEntry> {
        let message = self.message?;
        let level = self
            .prefix_level
            .or(self.priority.filter(|&p| p != UNPRIORITIZED_LEVEL));
        let service = if include_service {
            self.unit
                .map(|u| u.strip_suffix(".service").unwrap_or(&u).to_string())
        } else {
            None
        };
        Some(LogEntry {
            message,
            service,
            level,
            time_ms: self.realtime_usec.map(|usec| (usec / 1000) as i64),
            cursor: self.cursor,
        })
    }
}
