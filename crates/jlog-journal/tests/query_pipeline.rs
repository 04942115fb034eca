//! Pipeline tests against the public gateway API
//!
//! Drives filter -> plan -> scan -> page through [`LogGateway`] with the
//! in-memory store, covering the field-match routing and pagination walks
//! the per-module tests leave to this level.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use jlog_core::{CursorDirection, CursorRef, LogEntry, QueryFilter};
use jlog_journal::store::{FIELD_BOOT_ID, FIELD_MESSAGE, FIELD_PRIORITY, FIELD_REALTIME, FIELD_UNIT};
use jlog_journal::{CommandConfig, LogGateway, MockCommandRunner, MockJournalStore};

fn gateway_with(store: MockJournalStore) -> LogGateway {
    let runner = MockCommandRunner::new();
    runner.expect("journalctl --list-boots", &[]);
    LogGateway::new(Arc::new(store), Arc::new(runner), CommandConfig::default())
}

fn messages(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.message.as_str()).collect()
}

/// Two boots, two units, interleaved severities
fn mixed_store() -> MockJournalStore {
    let store = MockJournalStore::new();
    let rows: &[(&str, &str, &str, &str, u64)] = &[
        ("old boot err", "3", "wb-rules.service", "boot-a", 1_000_000),
        ("old boot note", "6", "nginx.service", "boot-a", 2_000_000),
        ("new boot err", "3", "wb-rules.service", "boot-b", 3_000_000),
        ("new boot warn", "4", "nginx.service", "boot-b", 4_000_000),
        ("new boot note", "6", "wb-rules.service", "boot-b", 5_000_000),
    ];
    for &(message, priority, unit, boot, usec) in rows {
        store.push_record(&[
            (FIELD_MESSAGE, message),
            (FIELD_PRIORITY, priority),
            (FIELD_UNIT, unit),
            (FIELD_BOOT_ID, boot),
            (FIELD_REALTIME, &usec.to_string()),
        ]);
    }
    store
}

#[tokio::test]
async fn test_boot_filter_restricts_the_scan() {
    let gw = gateway_with(mixed_store());
    let entries = gw
        .load(QueryFilter {
            boot: Some("boot-a".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(messages(&entries), vec!["old boot note", "old boot err"]);
}

#[tokio::test]
async fn test_service_shorthand_gets_the_unit_suffix() {
    let gw = gateway_with(mixed_store());
    let entries = gw
        .load(QueryFilter {
            service: Some("wb-rules".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        messages(&entries),
        vec!["new boot note", "new boot err", "old boot err"]
    );
    // The request pinned one unit, so entries don't repeat it
    assert!(entries.iter().all(|e| e.service.is_none()));
}

#[tokio::test]
async fn test_unpinned_scan_names_the_stripped_unit() {
    let gw = gateway_with(mixed_store());
    let entries = gw.load(QueryFilter::default()).await.unwrap();
    assert_eq!(entries[0].service.as_deref(), Some("wb-rules"));
    assert_eq!(entries[1].service.as_deref(), Some("nginx"));
}

#[tokio::test]
async fn test_level_filter_keeps_any_listed_severity() {
    let gw = gateway_with(mixed_store());
    let entries = gw
        .load(QueryFilter {
            levels: vec![3, 4],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        messages(&entries),
        vec!["new boot warn", "new boot err", "old boot err"]
    );
}

#[tokio::test]
async fn test_time_bound_excludes_newer_records() {
    let gw = gateway_with(mixed_store());
    let entries = gw
        .load(QueryFilter {
            time: Some(3), // seconds; rows at 4s and 5s fall away
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        messages(&entries),
        vec!["new boot err", "old boot note", "old boot err"]
    );
}

#[tokio::test]
async fn test_backward_pagination_walks_to_exhaustion() {
    let store = MockJournalStore::new();
    for i in 0..7u64 {
        store.push_message(&format!("message {i}"), 3, (i + 1) * 1_000_000);
    }
    let gw = gateway_with(store);

    let mut seen = Vec::new();
    let mut cursor: Option<CursorRef> = None;
    loop {
        let page = gw
            .load(QueryFilter {
                cursor: cursor.clone(),
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        let oldest = page.last().unwrap().cursor.clone().unwrap();
        seen.extend(page.iter().map(|e| e.message.clone()));
        cursor = Some(CursorRef {
            id: oldest,
            direction: CursorDirection::Backward,
        });
    }
    assert_eq!(
        seen,
        vec![
            "message 6", "message 5", "message 4", "message 3", "message 2", "message 1",
            "message 0"
        ]
    );
}

#[tokio::test]
async fn test_forward_page_is_still_newest_first() {
    let store = MockJournalStore::new();
    for i in 0..6u64 {
        store.push_message(&format!("message {i}"), 3, (i + 1) * 1_000_000);
    }
    let gw = gateway_with(store);
    let entries = gw
        .load(QueryFilter {
            cursor: Some(CursorRef {
                id: MockJournalStore::cursor_at(1),
                direction: CursorDirection::Forward,
            }),
            limit: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        messages(&entries),
        vec!["message 4", "message 3", "message 2"]
    );
}

#[tokio::test]
async fn test_pattern_applies_after_field_matches() {
    let gw = gateway_with(mixed_store());
    let entries = gw
        .load(QueryFilter {
            boot: Some("boot-b".into()),
            pattern: Some("err".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(messages(&entries), vec!["new boot err"]);
}
