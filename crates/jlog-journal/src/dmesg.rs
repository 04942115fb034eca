//! Kernel ring buffer reader
//!
//! Parses the line-oriented `dmesg` dump: a leading `[<seconds>.<fraction>]`
//! prefix is an offset from boot time, the remainder (minus one optional
//! space) is the message. Lines without the prefix become timestamp-less
//! entries. Output keeps the source's natural chronological order - the
//! buffer is small and bounded, so this path intentionally does not reverse
//! to newest-first like the journal path does.

use std::fs;

use jlog_core::{GatewayError, GatewayResult, LogEntry};

use crate::command::CommandRunner;
use crate::pattern::PatternMatcher;

/// Parse one dump line into message text and absolute timestamp
fn parse_line(line: &str, boot_time_ms: i64) -> (&str, Option<i64>) {
    if let Some(rest) = line.strip_prefix('[') {
        if let Some((stamp, message)) = rest.split_once(']') {
            if let Ok(offset_secs) = stamp.trim().parse::<f64>() {
                let message = message.strip_prefix(' ').unwrap_or(message);
                let time_ms = boot_time_ms.saturating_add((offset_secs * 1000.0) as i64);
                return (message, Some(time_ms));
            }
        }
    }
    (line, None)
}

/// Shape matching dump lines into entries.
///
/// Ring-buffer entries never carry `level`, `service` or `cursor`; no limit
/// is applied at this layer.
pub fn parse_ring_buffer<I, S>(lines: I, matcher: &PatternMatcher, boot_time_ms: i64) -> Vec<LogEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        let (message, time_ms) = parse_line(line, boot_time_ms);
        if !matcher.matches(message) {
            continue;
        }
        entries.push(LogEntry {
            message: message.to_string(),
            time_ms,
            ..Default::default()
        });
    }
    entries
}

/// Dump the ring buffer through the command collaborator and parse it
pub fn read_ring_buffer(
    runner: &dyn CommandRunner,
    program: &str,
    matcher: &PatternMatcher,
    boot_time_ms: i64,
) -> GatewayResult<Vec<LogEntry>> {
    let lines = runner
        .run(program, &["--color=never"])
        .map_err(|e| GatewayError::ScanSetup(format!("ring buffer dump failed: {e}")))?;
    Ok(parse_ring_buffer(lines, matcher, boot_time_ms))
}

/// Boot time in milliseconds since epoch: now minus `/proc/uptime`
pub fn boot_time_ms() -> GatewayResult<i64> {
    let uptime = fs::read_to_string("/proc/uptime")
        .map_err(|e| GatewayError::ScanSetup(format!("cannot read uptime: {e}")))?;
    let uptime_secs: f64 = uptime
        .split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| GatewayError::ScanSetup("malformed /proc/uptime".into()))?;
    let now_ms = chrono::Utc::now().timestamp_millis();
    Ok(now_ms - (uptime_secs * 1000.0) as i64)
}
