//! Report-grid layout discovery.
//!
//! The report template repeats a per-employee block: a header row whose
//! cells carry calendar day numbers, with the metric rows below it. Nothing
//! about the block positions is assumed fixed; the locator scans the sheet,
//! classifies header occurrences, and binds every (employee, day) to a
//! concrete (row, column) before any projection happens.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::policy::{CategoryPolicy, EmployeeCategory};
use crate::workbook::{Cell, Sheet};

/// Column carrying employee names on header rows.
const NAME_COL: usize = 0;
/// The template's own column caption; never an employee.
const NAME_HEADER_LABEL: &str = "Name";
/// Day numbers live in this column onward.
const DAY_SCAN_START_COL: usize = 3;
/// How far below a header occurrence the matching data row may sit.
const TARGET_SEARCH_ROWS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct DaySlot {
    pub header_row: usize,
    pub col: usize,
    pub weekday: Weekday,
}

#[derive(Debug, Clone)]
pub struct EmployeeLayout {
    pub first_header_row: usize,
    pub category: EmployeeCategory,
    pub days: HashMap<u32, DaySlot>,
}

/// Discovered mapping from employees and calendar days to grid positions.
/// Built once per report generation, read-only afterwards.
#[derive(Debug, Default)]
pub struct GridLayout {
    employees: HashMap<String, EmployeeLayout>,
}

impl GridLayout {
    pub fn employee(&self, name: &str) -> Option<&EmployeeLayout> {
        self.employees.get(name)
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
}

pub struct ReportGridLocator<'a> {
    policy: &'a CategoryPolicy,
    year: i32,
    month: u32,
}

impl<'a> ReportGridLocator<'a> {
    pub fn new(policy: &'a CategoryPolicy, year: i32, month: u32) -> Self {
        Self { policy, year, month }
    }

    /// Scans the report sheet top to bottom, recording every employee's day
    /// positions and rewriting day-number cells as `"day(weekday)"` labels.
    ///
    /// An employee's days may be split across the block's two header
    /// occurrences; a day number repeated in both resolves to the later one
    /// (last write wins).
    pub fn locate(&self, sheet: &mut Sheet) -> GridLayout {
        let mut layout = GridLayout::default();

        for row in 0..sheet.row_count() {
            let name = sheet.text(row, NAME_COL).trim().to_string();
            if name.is_empty() || name == NAME_HEADER_LABEL {
                continue;
            }

            let category = self.policy.category_of(&name);
            // A data row repeating the name must not clobber the block anchor,
            // so only the first occurrence creates the entry.
            layout
                .employees
                .entry(name.clone())
                .or_insert_with(|| EmployeeLayout {
                    first_header_row: row,
                    category,
                    days: HashMap::new(),
                });

            let second = row + category.second_header_offset();
            for header_row in [row, second] {
                self.scan_header_days(sheet, header_row, &name, &mut layout);
            }
        }

        debug!(
            employees = layout.employee_count(),
            year = self.year,
            month = self.month,
            "report layout discovered"
        );
        layout
    }

    fn scan_header_days(
        &self,
        sheet: &mut Sheet,
        header_row: usize,
        employee: &str,
        layout: &mut GridLayout,
    ) {
        for col in DAY_SCAN_START_COL..sheet.col_count(header_row) {
            let Some(day) = parse_day_number(sheet.text(header_row, col)) else {
                continue;
            };
            // Day 31 in a 30-day month's template column stays untouched.
            let Some(date) = NaiveDate::from_ymd_opt(self.year, self.month, day) else {
                continue;
            };
            let weekday = date.weekday();
            sheet.set(header_row, col, Cell::text(format!("{day}({weekday})")));

            if let Some(entry) = layout.employees.get_mut(employee) {
                entry.days.insert(
                    day,
                    DaySlot {
                        header_row,
                        col,
                        weekday,
                    },
                );
            }
        }
    }
}

fn parse_day_number(text: &str) -> Option<u32> {
    let day: u32 = text.trim().parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// Finds the data row belonging to `header_row` for `employee`: the first of
/// the next `TARGET_SEARCH_ROWS` rows whose name cell matches. An empty name
/// cell is resolved by stepping back `offset` rows and reading the first
/// occurrence's name instead, which links the second header occurrence back
/// to the right identity. `None` is a non-fatal miss; callers skip the
/// employee-day and count it.
pub fn resolve_target_row(
    sheet: &Sheet,
    header_row: usize,
    employee: &str,
    offset: usize,
) -> Option<usize> {
    for row in header_row + 1..=header_row + TARGET_SEARCH_ROWS {
        let raw = sheet.text(row, NAME_COL).trim();
        let matched = if raw.is_empty() {
            row.checked_sub(offset)
                .map(|back| sheet.text(back, NAME_COL).trim() == employee)
                .unwrap_or(false)
        } else {
            raw == employee
        };
        if matched {
            return Some(row);
        }
    }
    None
}
