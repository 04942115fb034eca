//! Query planner - turns a request filter into scan parameters
//!
//! The plan is pure data: equality match clauses, a physical direction, a
//! seek target and a row cap. The scanner executes it against whatever
//! [`crate::store::JournalStore`] it is handed.

use jlog_core::{CursorDirection, QueryFilter};

use crate::store::{FIELD_BOOT_ID, FIELD_PRIORITY, FIELD_UNIT};

/// One equality clause on a journal field.
///
/// Clauses on the same field are OR-ed by the store, clauses on different
/// fields are AND-ed (sd-journal match semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Journal field name, e.g. `PRIORITY`
    pub field: &'static str,
    /// Required value
    pub value: String,
}

impl FieldMatch {
    fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Physical scan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Step towards newer records; the result is reversed before delivery
    Forward,
    /// Step towards older records from a resume position
    Backward,
    /// Step towards older records from the newest record
    Tail,
}

/// Where the scan begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekTo {
    /// Position on a cursor token. `skip_pointed` discards the pointed
    /// record itself, which a request cursor has already delivered.
    Cursor { id: String, skip_pointed: bool },
    /// Position on a wall-clock instant, microseconds since epoch
    Time { usec: u64 },
    /// Position after the newest record
    Tail,
}

/// Complete scan parameters for one journal pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Equality clauses applied before iteration starts
    pub matches: Vec<FieldMatch>,
    /// Physical step direction
    pub direction: ScanDirection,
    /// Start position
    pub seek: SeekTo,
    /// Stop after this many matched records
    pub max_entries: usize,
    /// Whether the stepping loop polls the cancellation token
    pub stop_on_cancel: bool,
}

impl ScanPlan {
    /// Whether the plan pins a single unit; entries then omit `service`
    pub fn has_unit_match(&self) -> bool {
        self.matches.iter().any(|m| m.field == FIELD_UNIT)
    }
}

/// Unit name for a `_SYSTEMD_UNIT` match: the common suffix-less shorthand
/// gets `.service` appended, explicit unit names pass through untouched.
fn unit_match_name(service: &str) -> String {
    if service.contains('.') {
        service.to_string()
    } else {
        format!("{service}.service")
    }
}

/// Build the scan plan for a request filter.
///
/// Severities outside 0..=7 and duplicates are skipped silently. A `time`
/// bound wins over any cursor; with neither, the plan seeks the tail and
/// steps backward.
pub fn plan(filter: &QueryFilter) -> ScanPlan {
    let mut matches = Vec::new();
    let mut seen_levels = [false; 8];
    for &level in &filter.levels {
        if let Some(seen) = seen_levels.get_mut(level as usize) {
            if !*seen {
                *seen = true;
                matches.push(FieldMatch::new(FIELD_PRIORITY, level.to_string()));
            }
        }
    }
    if let Some(service) = filter.service() {
        matches.push(FieldMatch::new(FIELD_UNIT, unit_match_name(service)));
    }
    if let Some(boot) = filter.boot() {
        matches.push(FieldMatch::new(FIELD_BOOT_ID, boot));
    }

    let max_entries = filter.max_entries();

    if let Some(time) = filter.time {
        return ScanPlan {
            matches,
            direction: ScanDirection::Tail,
            seek: SeekTo::Time {
                usec: (time.max(0) as u64).saturating_mul(1_000_000),
            },
            max_entries,
            stop_on_cancel: true,
        };
    }

    if let Some(cursor) = &filter.cursor {
        let direction = match cursor.direction {
            CursorDirection::Forward => ScanDirection::Forward,
            CursorDirection::Backward => ScanDirection::Backward,
        };
        return ScanPlan {
            matches,
            direction,
            seek: SeekTo::Cursor {
                id: cursor.id.clone(),
                skip_pointed: true,
            },
            max_entries,
            stop_on_cancel: true,
        };
    }

    ScanPlan {
        matches,
        direction: ScanDirection::Tail,
        seek: SeekTo::Tail,
        max_entries,
        stop_on_cancel: true,
    }
}

#[cfg(test)]
mod tests {
    use jlog_core::{CursorRef, CursorDirection};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bare_filter_plans_a_tail_scan() {
        let p = plan(&QueryFilter::default());
        assert_eq!(p.direction, ScanDirection::Tail);
        assert_eq!(p.seek, SeekTo::Tail);
        assert_eq!(p.max_entries, 100);
        assert!(p.matches.is_empty());
        assert!(p.stop_on_cancel);
    }

    #[test]
    fn test_levels_become_priority_clauses_skipping_junk() {
        let filter = QueryFilter {
            levels: vec![3, 4, 3, 12, 300],
            ..Default::default()
        };
        let p = plan(&filter);
        assert_eq!(
            p.matches,
            vec![
                FieldMatch::new(FIELD_PRIORITY, "3"),
                FieldMatch::new(FIELD_PRIORITY, "4"),
            ]
        );
    }

    #[test]
    fn test_service_and_boot_clauses() {
        let filter = QueryFilter {
            service: Some("nginx".into()),
            boot: Some("b1".into()),
            ..Default::default()
        };
        let p = plan(&filter);
        assert_eq!(
            p.matches,
            vec![
                FieldMatch::new(FIELD_UNIT, "nginx.service"),
                FieldMatch::new(FIELD_BOOT_ID, "b1"),
            ]
        );
        assert!(p.has_unit_match());
    }

    #[test]
    fn test_explicit_unit_name_is_not_mangled() {
        let filter = QueryFilter {
            service: Some("dbus.socket".into()),
            ..Default::default()
        };
        assert_eq!(plan(&filter).matches[0].value, "dbus.socket");
    }

    #[test]
    fn test_cursor_sets_direction_and_skips_pointed_record() {
        let filter = QueryFilter {
            cursor: Some(CursorRef {
                id: "c42".into(),
                direction: CursorDirection::Forward,
            }),
            ..Default::default()
        };
        let p = plan(&filter);
        assert_eq!(p.direction, ScanDirection::Forward);
        assert_eq!(
            p.seek,
            SeekTo::Cursor {
                id: "c42".into(),
                skip_pointed: true
            }
        );
    }

    #[test]
    fn test_backward_cursor() {
        let filter = QueryFilter {
            cursor: Some(CursorRef {
                id: "c42".into(),
                direction: CursorDirection::Backward,
            }),
            ..Default::default()
        };
        assert_eq!(plan(&filter).direction, ScanDirection::Backward);
    }

    #[test]
    fn test_time_bound_overrides_cursor() {
        let filter = QueryFilter {
            time: Some(1_617_694_501),
            cursor: Some(CursorRef {
                id: "c42".into(),
                direction: CursorDirection::Forward,
            }),
            ..Default::default()
        };
        let p = plan(&filter);
        assert_eq!(p.direction, ScanDirection::Tail);
        assert_eq!(
            p.seek,
            SeekTo::Time {
                usec: 1_617_694_501_000_000
            }
        );
    }

    #[test]
    fn test_extreme_time_bound_saturates_instead_of_overflowing() {
        let filter = QueryFilter {
            time: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(plan(&filter).seek, SeekTo::Time { usec: u64::MAX });

        let filter = QueryFilter {
            time: Some(-5),
            ..Default::default()
        };
        assert_eq!(plan(&filter).seek, SeekTo::Time { usec: 0 });
    }

    #[test]
    fn test_limit_is_clamped_into_the_plan() {
        let filter = QueryFilter {
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(plan(&filter).max_entries, 100);
        let filter = QueryFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(plan(&filter).max_entries, 0);
    }
}
