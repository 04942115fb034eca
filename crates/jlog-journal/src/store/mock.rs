//! In-memory journal store for testing
//!
//! Holds records oldest-first and honors match clauses, seeks and both step
//! directions like the real store. Failure injection covers the three spots
//! the scanner cares about: open, seek (unknown cursor) and the Nth step.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use jlog_core::{GatewayError, GatewayResult};

use super::{JournalCursor, JournalStore, FIELD_CURSOR, FIELD_MESSAGE, FIELD_PRIORITY, FIELD_REALTIME};
use crate::planner::{ScanPlan, SeekTo};

/// Configurable in-memory journal
#[derive(Default)]
pub struct MockJournalStore {
    /// Records oldest-first, each a plain field map
    records: RwLock<Vec<HashMap<String, String>>>,
    fail_open: AtomicBool,
    /// 1-based index of the step attempt that should fail
    fail_at_step: RwLock<Option<usize>>,
    /// Artificial latency per step, for cancellation tests
    step_delay: RwLock<Option<Duration>>,
}

impl MockJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; a `__CURSOR` of the form `mock-cursor-<n>` is
    /// assigned when the caller did not provide one
    pub fn push_record(&self, fields: &[(&str, &str)]) {
        let mut records = self.records.write();
        let mut record: HashMap<String, String> = fields
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        record
            .entry(FIELD_CURSOR.to_string())
            .or_insert_with(|| format!("mock-cursor-{}", records.len()));
        records.push(record);
    }

    /// Append a plain message record with priority and timestamp
    pub fn push_message(&self, message: &str, priority: u8, usec: u64) {
        self.push_record(&[
            (FIELD_MESSAGE, message),
            (FIELD_PRIORITY, &priority.to_string()),
            (FIELD_REALTIME, &usec.to_string()),
        ]);
    }

    /// Make the next `open` call fail
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Make the `n`-th step of subsequently opened cursors fail (1-based)
    pub fn set_fail_at_step(&self, n: usize) {
        *self.fail_at_step.write() = Some(n);
    }

    /// Sleep this long on every step of subsequently opened cursors
    pub fn set_step_delay(&self, delay: Duration) {
        *self.step_delay.write() = Some(delay);
    }

    /// Cursor token auto-assigned to the `n`-th pushed record
    pub fn cursor_at(n: usize) -> String {
        format!("mock-cursor-{n}")
    }
}

impl JournalStore for MockJournalStore {
    fn open(&self, plan: &ScanPlan) -> GatewayResult<Box<dyn JournalCursor>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(GatewayError::ScanSetup("mock store: open refused".into()));
        }

        // Same-field clauses are OR-ed, different fields AND-ed
        let mut clause_groups: HashMap<&str, Vec<&str>> = HashMap::new();
        for clause in &plan.matches {
            clause_groups
                .entry(clause.field)
                .or_default()
                .push(clause.value.as_str());
        }
        let records: Vec<HashMap<String, String>> = self
            .records
            .read()
            .iter()
            .filter(|record| {
                clause_groups.iter().all(|(field, values)| {
                    record
                        .get(*field)
                        .is_some_and(|v| values.contains(&v.as_str()))
                })
            })
            .cloned()
            .collect();

        // Head positions: `upcoming_next` is the index step_next would
        // yield, `upcoming_prev` the index step_previous would yield
        let (upcoming_next, upcoming_prev) = match &plan.seek {
            SeekTo::Tail => (records.len(), records.len() as isize - 1),
            SeekTo::Time { usec } => {
                let at_or_before = records
                    .iter()
                    .rposition(|r| record_usec(r) <= *usec)
                    .map(|i| i as isize)
                    .unwrap_or(-1);
                ((at_or_before + 1) as usize, at_or_before)
            }
            SeekTo::Cursor { id, skip_pointed } => {
                let pos = records
                    .iter()
                    .position(|r| r.get(FIELD_CURSOR).map(String::as_str) == Some(id))
                    .ok_or_else(|| {
                        GatewayError::ScanSetup(format!("mock store: unknown cursor '{id}'"))
                    })?;
                if *skip_pointed {
                    (pos + 1, pos as isize - 1)
                } else {
                    (pos, pos as isize)
                }
            }
        };

        Ok(Box::new(MockCursor {
            records,
            upcoming_next,
            upcoming_prev,
            current: None,
            steps_taken: 0,
            fail_at_step: *self.fail_at_step.read(),
            step_delay: *self.step_delay.read(),
        }))
    }
}

fn record_usec(record: &HashMap<String, String>) -> u64 {
    record
        .get(FIELD_REALTIME)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

struct MockCursor {
    records: Vec<HashMap<String, String>>,
    upcoming_next: usize,
    upcoming_prev: isize,
    current: Option<usize>,
    steps_taken: usize,
    fail_at_step: Option<usize>,
    step_delay: Option<Duration>,
}

impl MockCursor {
    fn begin_step(&mut self) -> GatewayResult<()> {
        if let Some(delay) = self.step_delay {
            std::thread::sleep(delay);
        }
        self.steps_taken += 1;
        if self.fail_at_step == Some(self.steps_taken) {
            return Err(GatewayError::Step("mock store: injected step failure".into()));
        }
        Ok(())
    }

    fn land_on(&mut self, index: usize) {
        self.current = Some(index);
        self.upcoming_next = index + 1;
        self.upcoming_prev = index as isize - 1;
    }
}

impl JournalCursor for MockCursor {
    fn step_next(&mut self) -> GatewayResult<bool> {
        self.begin_step()?;
        if self.upcoming_next >= self.records.len() {
            return Ok(false);
        }
        let index = self.upcoming_next;
        self.land_on(index);
        Ok(true)
    }

    fn step_previous(&mut self) -> GatewayResult<bool> {
        self.begin_step()?;
        if self.upcoming_prev < 0 {
            return Ok(false);
        }
        let index = self.upcoming_prev as usize;
        self.land_on(index);
        Ok(true)
    }

    fn field(&self, name: &str) -> Option<String> {
        self.records.get(self.current?)?.get(name).cloned()
    }

    fn cursor_token(&self) -> Option<String> {
        self.field(FIELD_CURSOR)
    }

    fn realtime_usec(&self) -> Option<u64> {
        self.field(FIELD_REALTIME).and_then(|v| v.parse().ok())
    }
}
