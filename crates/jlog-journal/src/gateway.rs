//! Gateway facade - orchestrates the two reader paths
//!
//! Owns the boot-session cache, the cancellation slot and the dispatch
//! between the kernel ring buffer and the journal path. Scans are blocking
//! work and run under `spawn_blocking`, so `cancel_load` is served
//! immediately even while a `load` is in flight.

use std::sync::Arc;

use tokio::task;
use tracing::{debug, info, warn};

use jlog_core::{
    BootRecord, CancelSlot, GatewayError, GatewayResult, ListResponse, LogEntry, QueryFilter,
};

use crate::command::CommandRunner;
use crate::config::CommandConfig;
use crate::dmesg;
use crate::listing;
use crate::pattern::PatternMatcher;
use crate::planner::{self, ScanDirection, ScanPlan, SeekTo};
use crate::scanner;
use crate::store::JournalStore;

/// Pseudo service name selecting the kernel ring buffer path.
/// Appended last to the unit list returned by `List`.
pub const DMESG_SERVICE: &str = "dmesg";

/// Read-only log query gateway
pub struct LogGateway {
    store: Arc<dyn JournalStore>,
    runner: Arc<dyn CommandRunner>,
    commands: CommandConfig,
    /// Boot sessions, newest first; computed once, stale by design
    boots: Vec<BootRecord>,
    cancel: CancelSlot,
}

impl LogGateway {
    /// Create the gateway and populate the boot-session cache.
    ///
    /// A failed boot listing degrades to an empty cache; the gateway still
    /// starts.
    pub fn new(
        store: Arc<dyn JournalStore>,
        runner: Arc<dyn CommandRunner>,
        commands: CommandConfig,
    ) -> Self {
        let boots = listing::gather_boots(runner.as_ref(), &commands.journalctl);
        info!(boots = boots.len(), "journal gateway ready");
        Self {
            store,
            runner,
            commands,
            boots,
            cancel: CancelSlot::new(),
        }
    }

    /// Cached boot sessions, newest first
    pub fn boots(&self) -> &[BootRecord] {
        &self.boots
    }

    /// `List`: boot sessions plus installed unit names.
    ///
    /// A failed unit listing is logged and yields an empty `services` list;
    /// the call itself never fails.
    pub fn list(&self) -> ListResponse {
        debug!("RPC List");
        let services = match listing::gather_services(self.runner.as_ref(), &self.commands.systemctl)
        {
            Ok(mut services) => {
                services.push(DMESG_SERVICE.to_string());
                services
            }
            Err(e) => {
                warn!(error = %e, "unit listing failed, returning empty service list");
                Vec::new()
            }
        };
        ListResponse {
            boots: self.boots.clone(),
            services,
        }
    }

    /// `Load`: one bounded, ordered page of log entries.
    ///
    /// Issues a fresh cancellation token (making this call the target of
    /// subsequent `CancelLoad`s), dispatches on the requested source and
    /// trims redundant cursors from the finished page.
    pub async fn load(&self, filter: QueryFilter) -> GatewayResult<Vec<LogEntry>> {
        debug!(?filter, "RPC Load");
        let cancel = self.cancel.issue();
        let matcher = PatternMatcher::for_filter(&filter)?;

        let entries = if filter.service() == Some(DMESG_SERVICE) {
            let boot_time_ms = dmesg::boot_time_ms()?;
            let runner = Arc::clone(&self.runner);
            let program = self.commands.dmesg.clone();
            task::spawn_blocking(move || {
                dmesg::read_ring_buffer(runner.as_ref(), &program, &matcher, boot_time_ms)
            })
            .await
            .map_err(|e| GatewayError::ScanSetup(format!("scan task failed: {e}")))??
        } else {
            let plan = planner::plan(&filter);
            let store = Arc::clone(&self.store);
            task::spawn_blocking(move || scan_with_fill(store.as_ref(), plan, &matcher, &cancel))
                .await
                .map_err(|e| GatewayError::ScanSetup(format!("scan task failed: {e}")))??
        };

        Ok(trim_cursors(entries))
    }

    /// `CancelLoad`: signal the most recently started `load`; idempotent,
    /// harmless when nothing is running
    pub fn cancel_load(&self) {
        debug!("RPC CancelLoad");
        self.cancel.cancel_current();
    }
}

/// Run the planned scan; a forward scan that ran into the journal head is
/// topped up with one backward continuation from the same cursor, so the
/// caller still gets a full page where the journal has one.
fn scan_with_fill(
    store: &dyn JournalStore,
    plan: ScanPlan,
    matcher: &PatternMatcher,
    cancel: &jlog_core::CancelToken,
) -> GatewayResult<Vec<LogEntry>> {
    let mut entries = scanner::scan(store, &plan, matcher, cancel)?;

    if plan.direction == ScanDirection::Forward && entries.len() < plan.max_entries {
        if let SeekTo::Cursor { id, .. } = &plan.seek {
            let fill_plan = ScanPlan {
                matches: plan.matches.clone(),
                direction: ScanDirection::Backward,
                seek: SeekTo::Cursor {
                    id: id.clone(),
                    skip_pointed: true,
                },
                max_entries: plan.max_entries - entries.len(),
                stop_on_cancel: plan.stop_on_cancel,
            };
            match scanner::scan(store, &fill_plan, matcher, cancel) {
                // Fill rows are older than the cursor; appending keeps the
                // page newest-first
                Ok(fill) => entries.extend(fill),
                Err(e) => warn!(error = %e, "forward-fill continuation failed, keeping partial page"),
            }
        }
    }
    Ok(entries)
}

/// Drop `cursor` from all but the first and last entry of pages longer than
/// two entries; shorter pages keep every cursor.
fn trim_cursors(mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
    if entries.len() > 2 {
        let last = entries.len() - 1;
        for entry in &mut entries[1..last] {
            entry.cursor = None;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::command::MockCommandRunner;
    use crate::store::MockJournalStore;
    use jlog_core::{CursorDirection, CursorRef};

    fn gateway_with(store: MockJournalStore, runner: MockCommandRunner) -> LogGateway {
        LogGateway::new(
            Arc::new(store),
            Arc::new(runner),
            CommandConfig::default(),
        )
    }

    fn runner_with_empty_listings() -> MockCommandRunner {
        let runner = MockCommandRunner::new();
        runner.expect("journalctl --list-boots", &[]);
        runner
    }

    fn seeded_store(n: u64) -> MockJournalStore {
        let store = MockJournalStore::new();
        for i in 0..n {
            store.push_message(&format!("message {i}"), 3, (i + 1) * 1_000_000);
        }
        store
    }

    fn messages(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_without_position_is_newest_first() {
        let gw = gateway_with(seeded_store(3), runner_with_empty_listings());
        let entries = gw.load(QueryFilter::default()).await.unwrap();
        assert_eq!(messages(&entries), vec!["message 2", "message 1", "message 0"]);
    }

    #[tokio::test]
    async fn test_cursor_trimming_on_long_pages() {
        let gw = gateway_with(seeded_store(5), runner_with_empty_listings());
        let entries = gw.load(QueryFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries[0].cursor.is_some());
        assert!(entries[4].cursor.is_some());
        assert!(entries[1..4].iter().all(|e| e.cursor.is_none()));
    }

    #[tokio::test]
    async fn test_short_pages_keep_every_cursor() {
        let gw = gateway_with(seeded_store(2), runner_with_empty_listings());
        let entries = gw.load(QueryFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.cursor.is_some()));

        let gw = gateway_with(seeded_store(1), runner_with_empty_listings());
        let entries = gw.load(QueryFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].cursor.is_some());
    }

    #[tokio::test]
    async fn test_limit_is_clamped_to_the_hard_cap() {
        let gw = gateway_with(seeded_store(120), runner_with_empty_listings());
        let entries = gw
            .load(QueryFilter {
                limit: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 100);
    }

    #[tokio::test]
    async fn test_invalid_regex_is_a_request_error() {
        let gw = gateway_with(seeded_store(1), runner_with_empty_listings());
        let err = gw
            .load(QueryFilter {
                pattern: Some("(unclosed".into()),
                regex: Some(true),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Pattern { .. }));
    }

    #[tokio::test]
    async fn test_dmesg_sentinel_dispatches_to_ring_buffer() {
        let runner = runner_with_empty_listings();
        runner.expect(
            "dmesg --color=never",
            &["[1.0] kernel one", "[2.0] kernel two"],
        );
        let gw = gateway_with(MockJournalStore::new(), runner);
        let entries = gw
            .load(QueryFilter {
                service: Some(DMESG_SERVICE.into()),
                ..Default::default()
            })
            .await
            .unwrap();
        // Ring-buffer pages keep natural chronological order
        assert_eq!(messages(&entries), vec!["kernel one", "kernel two"]);
    }

    #[tokio::test]
    async fn test_forward_fill_tops_up_a_short_forward_page() {
        let gw = gateway_with(seeded_store(10), runner_with_empty_listings());
        let entries = gw
            .load(QueryFilter {
                cursor: Some(CursorRef {
                    id: MockJournalStore::cursor_at(8),
                    direction: CursorDirection::Forward,
                }),
                limit: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            messages(&entries),
            vec!["message 9", "message 7", "message 6", "message 5", "message 4"]
        );
    }

    #[tokio::test]
    async fn test_cancel_load_interrupts_a_running_scan() {
        let store = seeded_store(100);
        store.set_step_delay(Duration::from_millis(20));
        let gw = Arc::new(gateway_with(store, runner_with_empty_listings()));

        let loader = {
            let gw = Arc::clone(&gw);
            tokio::spawn(async move { gw.load(QueryFilter::default()).await })
        };
        tokio::time::sleep(Duration::from_millis(150)).await;
        gw.cancel_load();

        let entries = loader.await.unwrap().unwrap();
        assert!(entries.len() < 100, "expected a cut-short page, got {}", entries.len());
    }

    #[tokio::test]
    async fn test_list_returns_boots_and_services_with_sentinel_last() {
        let runner = MockCommandRunner::new();
        runner.expect(
            "journalctl --list-boots",
            &[" 0 aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa Tue 2021-04-06 07:45:00 UTC"],
        );
        runner.expect(
            "systemctl list-unit-files *.service",
            &["nginx.service enabled", "sshd.service enabled"],
        );
        let gw = gateway_with(MockJournalStore::new(), runner);
        let listing = gw.list();
        assert_eq!(listing.boots.len(), 1);
        assert_eq!(
            listing.services,
            vec!["nginx.service", "sshd.service", DMESG_SERVICE]
        );
    }

    #[tokio::test]
    async fn test_list_degrades_to_empty_on_command_failure() {
        let runner = MockCommandRunner::new();
        runner.fail("journalctl --list-boots", "no journal");
        runner.fail("systemctl list-unit-files *.service", "dbus down");
        let gw = gateway_with(MockJournalStore::new(), runner);
        let listing = gw.list();
        assert!(listing.boots.is_empty());
        assert!(listing.services.is_empty());
    }

    #[test]
    fn test_trim_cursors_boundaries() {
        let page: Vec<LogEntry> = (0..5)
            .map(|i| LogEntry {
                message: format!("m{i}"),
                cursor: Some(format!("c{i}")),
                ..Default::default()
            })
            .collect();
        let trimmed = trim_cursors(page);
        let kept: Vec<bool> = trimmed.iter().map(|e| e.cursor.is_some()).collect();
        assert_eq!(kept, vec![true, false, false, false, true]);
    }
}
