//! Journal scanner - executes a scan plan record by record
//!
//! Drives a [`JournalCursor`] in the plan's physical direction, applying the
//! pattern matcher and field normalization per visited record, honoring the
//! cancellation token and the row cap. The returned page is always ordered
//! newest-first: forward scans are reversed after the loop.

use tracing::{debug, warn};

use jlog_core::{CancelToken, GatewayError, GatewayResult, LogEntry, RawRecord};

use crate::pattern::PatternMatcher;
use crate::planner::{ScanDirection, ScanPlan};
use crate::store::{JournalCursor, JournalStore, FIELD_MESSAGE, FIELD_PRIORITY, FIELD_UNIT};

/// Run one scan and return the accumulated page, newest first.
///
/// Exhaustion, reaching `max_entries` and cancellation all end the loop
/// cleanly. A step failure after at least one successful step degrades to a
/// warning and a partial page; a step failure before any record was read is
/// a setup failure, surfaced like an open error. The store handle is
/// released on every exit path when the cursor drops.
pub fn scan(
    store: &dyn JournalStore,
    plan: &ScanPlan,
    matcher: &PatternMatcher,
    cancel: &CancelToken,
) -> GatewayResult<Vec<LogEntry>> {
    let mut cursor = store.open(plan)?;
    let include_service = !plan.has_unit_match();
    let mut entries = Vec::new();
    let mut stepped = false;

    while entries.len() < plan.max_entries {
        if plan.stop_on_cancel && cancel.is_cancelled() {
            debug!("scan cancelled, returning {} entries", entries.len());
            break;
        }
        let advanced = match step(cursor.as_mut(), plan.direction) {
            Ok(advanced) => advanced,
            Err(e) if stepped => {
                warn!(error = %e, "journal step failed, returning partial page");
                break;
            }
            Err(e) => return Err(GatewayError::ScanSetup(e.to_string())),
        };
        if !advanced {
            break;
        }
        stepped = true;

        let Some(message) = cursor.field(FIELD_MESSAGE) else {
            continue;
        };
        if !matcher.matches(&message) {
            // Filtered-out records do not count towards the cap
            continue;
        }

        let mut raw = RawRecord::default();
        raw.set_message(message);
        if let Some(priority) = cursor.field(FIELD_PRIORITY) {
            raw.set_priority(&priority);
        }
        if let Some(usec) = cursor.realtime_usec() {
            raw.set_realtime_usec(usec);
        }
        if let Some(token) = cursor.cursor_token() {
            raw.set_cursor(token);
        }
        if let Some(unit) = cursor.field(FIELD_UNIT) {
            raw.set_unit(unit);
        }
        if let Some(entry) = raw.into_entry(include_service) {
            entries.push(entry);
        }
    }

    if plan.direction == ScanDirection::Forward {
        // Forward scans accumulate oldest-first; the API order is newest-first
        entries.reverse();
    }
    Ok(entries)
}

fn step(cursor: &mut dyn JournalCursor, direction: ScanDirection) -> GatewayResult<bool> {
    match direction {
        ScanDirection::Forward => cursor.step_next(),
        ScanDirection::Backward | ScanDirection::Tail => cursor.step_previous(),
    }
}
