//! Boot session and unit listings
//!
//! Both listings come from command output rows. The boot grammar is the
//! `journalctl --list-boots` row: relative index, session hash, then the
//! first-entry stamp and (em-dash separated) last-entry stamp in
//! `%a %Y-%m-%d %H:%M:%S UTC` form. Index 0 is the running session; its
//! end stamp is ignored.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use jlog_core::{BootRecord, GatewayError, GatewayResult};

use crate::command::CommandRunner;

const BOOT_STAMP_FORMAT: &str = "%a %Y-%m-%d %H:%M:%S UTC";

fn parse_stamp(raw: &str, line: &str) -> GatewayResult<i64> {
    NaiveDateTime::parse_from_str(raw.trim(), BOOT_STAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|e| GatewayError::BootParse {
            line: line.to_string(),
            reason: format!("bad time '{}': {e}", raw.trim()),
        })
}

/// Parse one `--list-boots` row
pub fn parse_boot_record(line: &str) -> GatewayResult<BootRecord> {
    let bad = |reason: &str| GatewayError::BootParse {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (head, tail) = match line.split_once('—') {
        Some((head, tail)) => (head, Some(tail)),
        None => (line, None),
    };
    let mut tokens = head.split_whitespace();
    let index: i64 = tokens
        .next()
        .ok_or_else(|| bad("empty row"))?
        .parse()
        .map_err(|_| bad("missing boot index"))?;
    let hash = tokens.next().ok_or_else(|| bad("missing hash"))?.to_string();
    let start_raw: Vec<&str> = tokens.collect();
    if start_raw.is_empty() {
        return Err(bad("missing start time"));
    }
    let start = parse_stamp(&start_raw.join(" "), line)?;

    // The running session (index 0) has no meaningful end
    let end = if index != 0 {
        let raw = tail.ok_or_else(|| bad("missing end time"))?;
        Some(parse_stamp(raw, line)?)
    } else {
        None
    };

    Ok(BootRecord { hash, start, end })
}

/// Gather boot sessions, most recent first.
///
/// A failed listing command logs a warning and yields an empty cache;
/// individual malformed rows (column headers included) are skipped.
pub fn gather_boots(runner: &dyn CommandRunner, journalctl: &str) -> Vec<BootRecord> {
    let lines = match runner.run(journalctl, &["--list-boots"]) {
        Ok(lines) => lines,
        Err(e) => {
            warn!(error = %e, "boot listing failed");
            return Vec::new();
        }
    };
    let mut boots = Vec::new();
    for line in lines.iter().rev() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_boot_record(line) {
            Ok(record) => boots.push(record),
            Err(e) => debug!(error = %e, "skipping boot row"),
        }
    }
    boots
}

/// Gather installed unit names, suffix preserved.
///
/// Rows without a `.service` substring (headers, footers) are dropped, the
/// way the original listing consumer did.
pub fn gather_services(runner: &dyn CommandRunner, systemctl: &str) -> GatewayResult<Vec<String>> {
    let lines = runner
        .run(systemctl, &["list-unit-files", "*.service"])
        .map_err(|e| GatewayError::Listing(e.to_string()))?;
    let mut services = Vec::new();
    for line in lines {
        if let Some(pos) = line.find(".service") {
            services.push(line[..pos + ".service".len()].to_string());
        }
    }
    Ok(services)
}
