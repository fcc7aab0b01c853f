//! Per-day metric computation and cell writes.
//!
//! The metric rules live in small pure functions; `MetricsProjector` maps
//! merged records through the discovered layout and writes the block cells
//! in place. Records without a grid position are skipped and counted, never
//! fatal.

use chrono::{Datelike, NaiveTime, Weekday};
use tracing::warn;

use punchclock_parser::MergedRecord;

use crate::layout::{resolve_target_row, GridLayout};
use crate::policy::EmployeeCategory;
use crate::workbook::{Cell, Sheet};

const PLACEHOLDER: &str = "-";

/// Output rows relative to the resolved target (clock-in) row.
const ROW_CLOCK_OUT: usize = 1;
const ROW_WORK_HOURS: usize = 2;
const ROW_OVERTIME: usize = 3;
const ROW_HOLIDAY: usize = 4;
const ROW_NIGHT: usize = 5;

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

fn hours_between(from: NaiveTime, to: NaiveTime) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

fn round1(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}

/// `(out − in)` in hours, 1-decimal rounded; requires both punches.
pub fn work_hours(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> Option<f64> {
    let (clock_in, clock_out) = (clock_in?, clock_out?);
    Some(round1(hours_between(clock_in, clock_out)))
}

/// Overtime: the early window (clock-in strictly inside 05:00–08:00 counts
/// the time before 08:00) and the late window (clock-out strictly inside
/// 17:00–23:00 counts the time after 17:00) are evaluated independently and
/// summed. Neither window applying yields `None` (a placeholder, not zero).
pub fn overtime(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> Option<f64> {
    let mut total = 0.0;
    let mut applied = false;

    if let Some(clock_in) = clock_in {
        if clock_in > hm(5, 0) && clock_in < hm(8, 0) {
            total += hours_between(clock_in, hm(8, 0));
            applied = true;
        }
    }
    if let Some(clock_out) = clock_out {
        if clock_out > hm(17, 0) && clock_out < hm(23, 0) {
            total += hours_between(hm(17, 0), clock_out);
            applied = true;
        }
    }

    applied.then(|| round1(total))
}

/// Weekend work mirrors the day's work hours; weekdays get the placeholder.
pub fn holiday_work(weekday: Weekday, work_hours: Option<f64>) -> Option<f64> {
    match weekday {
        Weekday::Sat | Weekday::Sun => work_hours,
        _ => None,
    }
}

/// Night work for a shift understood to span midnight: clock-out strictly
/// after 23:00 and clock-in strictly before 05:00 in the same shift. The
/// value is the time before 05:00 plus the time after 23:00.
pub fn night_work(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> Option<f64> {
    let (clock_in, clock_out) = (clock_in?, clock_out?);
    if !(clock_out > hm(23, 0) && clock_in < hm(5, 0)) {
        return None;
    }
    let before_five = hours_between(clock_in, hm(5, 0)).max(0.0);
    let after_eleven = hours_between(hm(23, 0), clock_out).max(0.0);
    Some(round1(before_five + after_eleven))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectionReport {
    pub written: usize,
    pub skipped: usize,
}

pub struct MetricsProjector<'a> {
    layout: &'a GridLayout,
}

impl<'a> MetricsProjector<'a> {
    pub fn new(layout: &'a GridLayout) -> Self {
        Self { layout }
    }

    /// Writes every record's cell block into the report sheet. Layout misses
    /// are counted in the returned report; they never abort the run.
    pub fn project(&self, sheet: &mut Sheet, records: &[MergedRecord]) -> ProjectionReport {
        let mut report = ProjectionReport::default();

        for record in records {
            if self.project_record(sheet, record) {
                report.written += 1;
            } else {
                warn!(
                    employee = %record.employee_name,
                    date = %record.date,
                    "no grid position for record, skipped"
                );
                report.skipped += 1;
            }
        }

        report
    }

    fn project_record(&self, sheet: &mut Sheet, record: &MergedRecord) -> bool {
        let Some(employee) = self.layout.employee(&record.employee_name) else {
            return false;
        };
        let Some(slot) = employee.days.get(&record.date.day()) else {
            return false;
        };
        let offset = employee.category.second_header_offset();
        let Some(target) =
            resolve_target_row(sheet, slot.header_row, &record.employee_name, offset)
        else {
            return false;
        };

        let col = slot.col;
        if let Some(clock_in) = record.clock_in {
            sheet.set(target, col, Cell::text(clock_in.format("%H:%M").to_string()));
        }
        if let Some(clock_out) = record.clock_out {
            sheet.set(
                target + ROW_CLOCK_OUT,
                col,
                Cell::text(clock_out.format("%H:%M").to_string()),
            );
        }

        let hours = work_hours(record.clock_in, record.clock_out);
        if let Some(hours) = hours {
            sheet.set(target + ROW_WORK_HOURS, col, Cell::Number(hours));
        }

        sheet.set(
            target + ROW_OVERTIME,
            col,
            number_or_placeholder(overtime(record.clock_in, record.clock_out)),
        );
        sheet.set(
            target + ROW_HOLIDAY,
            col,
            number_or_placeholder(holiday_work(slot.weekday, hours)),
        );
        if employee.category == EmployeeCategory::Director {
            sheet.set(
                target + ROW_NIGHT,
                col,
                number_or_placeholder(night_work(record.clock_in, record.clock_out)),
            );
        }

        true
    }
}

fn number_or_placeholder(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::Number(v),
        None => Cell::text(PLACEHOLDER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use punchclock_parser::Source;

    use crate::layout::ReportGridLocator;
    use crate::policy::CategoryPolicy;
    use crate::workbook::Sheet;

    #[test]
    fn overtime_sums_both_windows() {
        assert_eq!(overtime(Some(hm(7, 30)), Some(hm(18, 0))), Some(1.5));
    }

    #[test]
    fn overtime_triggers_on_late_window_alone() {
        // The source system's precedence bug under-triggered this case.
        assert_eq!(overtime(Some(hm(9, 0)), Some(hm(17, 30))), Some(0.5));
        assert_eq!(overtime(None, Some(hm(18, 15))), Some(1.3));
    }

    #[test]
    fn overtime_outside_both_windows_is_placeholder() {
        assert_eq!(overtime(Some(hm(9, 0)), Some(hm(16, 50))), None);
        // Boundaries are strict.
        assert_eq!(overtime(Some(hm(5, 0)), Some(hm(17, 0))), None);
        assert_eq!(overtime(Some(hm(8, 0)), Some(hm(23, 0))), None);
    }

    #[test]
    fn work_hours_requires_both_punches() {
        assert_eq!(work_hours(Some(hm(8, 10)), Some(hm(19, 45))), Some(11.6));
        assert_eq!(work_hours(Some(hm(8, 10)), None), None);
        assert_eq!(work_hours(None, Some(hm(19, 45))), None);
    }

    #[test]
    fn holiday_work_only_on_weekends() {
        assert_eq!(holiday_work(Weekday::Sat, Some(8.0)), Some(8.0));
        assert_eq!(holiday_work(Weekday::Sun, Some(8.0)), Some(8.0));
        assert_eq!(holiday_work(Weekday::Tue, Some(8.0)), None);
        assert_eq!(holiday_work(Weekday::Sat, None), None);
    }

    #[test]
    fn night_work_for_midnight_spanning_shift() {
        // before 05:00 = 2.0h, after 23:00 = 0.666..h, rounded once at the end.
        assert_eq!(night_work(Some(hm(3, 0)), Some(hm(23, 40))), Some(2.7));
    }

    #[test]
    fn night_work_boundaries_are_strict() {
        assert_eq!(night_work(Some(hm(5, 0)), Some(hm(23, 40))), None);
        assert_eq!(night_work(Some(hm(3, 0)), Some(hm(23, 0))), None);
        assert_eq!(night_work(Some(hm(8, 0)), Some(hm(18, 0))), None);
    }

    fn merged_for(
        name: &str,
        day: u32,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
    ) -> MergedRecord {
        MergedRecord {
            employee_name: name.to_string(),
            employee_id: "1001".to_string(),
            department: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            clock_in,
            clock_out,
            sources: BTreeSet::from([Source::Factory]),
        }
    }

    fn merged(day: u32, clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> MergedRecord {
        merged_for("Alice Park", day, clock_in, clock_out)
    }

    /// One Standard block: header at row 1 with day 1 (a Saturday) at col 3,
    /// named data row at row 2.
    fn report_sheet() -> Sheet {
        let mut sheet = Sheet::new("26.8");
        sheet.set(0, 0, Cell::text("Name"));
        sheet.set(1, 0, Cell::text("Alice Park"));
        sheet.set(1, 3, Cell::text("1"));
        sheet.set(2, 0, Cell::text("Alice Park"));
        sheet
    }

    #[test]
    fn projects_full_cell_block() {
        let policy = CategoryPolicy::default();
        let mut sheet = report_sheet();
        let layout = ReportGridLocator::new(&policy, 2026, 8).locate(&mut sheet);

        let projector = MetricsProjector::new(&layout);
        let record = merged(1, Some(hm(8, 10)), Some(hm(19, 45)));
        let report = projector.project(&mut sheet, &[record]);

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(sheet.text(2, 3), "08:10");
        assert_eq!(sheet.text(3, 3), "19:45");
        assert_eq!(sheet.value(4, 3).as_number(), Some(11.6));
        // Late window 17:00 -> 19:45.
        assert_eq!(sheet.value(5, 3).as_number(), Some(2.8));
        // 2026-08-01 is a Saturday.
        assert_eq!(sheet.value(6, 3).as_number(), Some(11.6));
        // Standard category gets no night-work row.
        assert!(sheet.value(7, 3).is_empty());
    }

    /// One Director block: header at row 1 with day 3 (a Monday) at col 3 and
    /// day 4 at col 4, named data row at row 2.
    fn director_report_sheet() -> Sheet {
        let mut sheet = Sheet::new("26.8");
        sheet.set(0, 0, Cell::text("Name"));
        sheet.set(1, 0, Cell::text("Grace Han"));
        sheet.set(1, 3, Cell::text("3"));
        sheet.set(1, 4, Cell::text("4"));
        sheet.set(2, 0, Cell::text("Grace Han"));
        sheet
    }

    #[test]
    fn director_block_gets_the_night_work_row() {
        let policy = CategoryPolicy::new(["Grace Han"]);
        let mut sheet = director_report_sheet();
        let layout = ReportGridLocator::new(&policy, 2026, 8).locate(&mut sheet);

        let projector = MetricsProjector::new(&layout);
        let records = vec![
            merged_for("Grace Han", 3, Some(hm(3, 0)), Some(hm(23, 40))),
            merged_for("Grace Han", 4, Some(hm(9, 0)), Some(hm(17, 30))),
        ];
        let report = projector.project(&mut sheet, &records);
        assert_eq!(report.written, 2);

        // Midnight-spanning shift: rows above the night row stay a
        // Standard-shaped block, the night row carries the number.
        assert_eq!(sheet.text(2, 3), "03:00");
        assert_eq!(sheet.text(3, 3), "23:40");
        assert_eq!(sheet.value(4, 3).as_number(), Some(20.7));
        assert_eq!(sheet.text(5, 3), "-"); // outside both overtime windows
        assert_eq!(sheet.text(6, 3), "-"); // Monday
        assert_eq!(sheet.value(7, 3).as_number(), Some(2.7));

        // Ordinary day shift: night row written, as the placeholder.
        assert_eq!(sheet.value(5, 4).as_number(), Some(0.5));
        assert_eq!(sheet.text(7, 4), "-");
    }

    #[test]
    fn record_without_grid_position_is_counted_not_fatal() {
        let policy = CategoryPolicy::default();
        let mut sheet = report_sheet();
        let layout = ReportGridLocator::new(&policy, 2026, 8).locate(&mut sheet);

        let projector = MetricsProjector::new(&layout);
        let records = vec![
            merged(1, Some(hm(9, 0)), Some(hm(16, 0))),
            merged(2, Some(hm(9, 0)), Some(hm(16, 0))), // day 2 not in the template
        ];
        let report = projector.project(&mut sheet, &records);
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn absent_punch_leaves_clock_cell_untouched() {
        let policy = CategoryPolicy::default();
        let mut sheet = report_sheet();
        let layout = ReportGridLocator::new(&policy, 2026, 8).locate(&mut sheet);

        let projector = MetricsProjector::new(&layout);
        let record = merged(1, None, Some(hm(19, 45)));
        projector.project(&mut sheet, &[record]);

        assert!(sheet.value(2, 3).is_empty());
        assert_eq!(sheet.text(3, 3), "19:45");
        // No work hours without both punches.
        assert!(sheet.value(4, 3).is_empty());
        // Overtime still applies from the late window alone.
        assert_eq!(sheet.value(5, 3).as_number(), Some(2.8));
        assert_eq!(sheet.text(6, 3), "-");
    }
}
