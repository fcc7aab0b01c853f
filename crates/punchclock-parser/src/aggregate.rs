//! Per-source aggregation and the cross-source merge.
//!
//! Grouping runs over ordered maps so the output is deterministic under
//! input reordering and duplicate punches (badge re-swipes collapse into
//! the same min/max).

use std::collections::BTreeMap;

use crate::model::{AttendanceEvent, CanonicalRecord, MergedRecord, RecordKey};

fn min_opt<T: Ord + Copy>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn max_opt<T: Ord + Copy>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}

/// Collapses one source's event sequence into one record per employee-day:
/// earliest clock-in, latest clock-out, first non-empty department.
pub fn aggregate_events(events: &[AttendanceEvent]) -> Vec<CanonicalRecord> {
    let mut grouped: BTreeMap<RecordKey, CanonicalRecord> = BTreeMap::new();

    for event in events {
        grouped
            .entry(event.key())
            .and_modify(|record| {
                record.clock_in = min_opt(record.clock_in, event.clock_in);
                record.clock_out = max_opt(record.clock_out, event.clock_out);
                if record.department.is_empty() && !event.department.is_empty() {
                    record.department = event.department.clone();
                }
            })
            .or_insert_with(|| CanonicalRecord {
                employee_name: event.employee_name.clone(),
                employee_id: event.employee_id.clone(),
                department: event.department.clone(),
                date: event.date,
                clock_in: event.clock_in,
                clock_out: event.clock_out,
                source: event.source,
            });
    }

    grouped.into_values().collect()
}

/// Unions canonical records from any number of sources into one merged
/// record per employee-day. A key present in only one source passes through
/// unchanged; overlapping keys take min/max and accumulate source tags.
pub fn merge_records<I>(records: I) -> Vec<MergedRecord>
where
    I: IntoIterator<Item = CanonicalRecord>,
{
    let mut merged: BTreeMap<RecordKey, MergedRecord> = BTreeMap::new();

    for record in records {
        let key = record.key();
        merged
            .entry(key)
            .and_modify(|existing| {
                existing.clock_in = min_opt(existing.clock_in, record.clock_in);
                existing.clock_out = max_opt(existing.clock_out, record.clock_out);
                existing.sources.insert(record.source);
                if existing.department.is_empty() && !record.department.is_empty() {
                    existing.department = record.department.clone();
                }
            })
            .or_insert_with(|| MergedRecord {
                employee_name: record.employee_name.clone(),
                employee_id: record.employee_id.clone(),
                department: record.department.clone(),
                date: record.date,
                clock_in: record.clock_in,
                clock_out: record.clock_out,
                sources: std::iter::once(record.source).collect(),
            });
    }

    merged.into_values().collect()
}
