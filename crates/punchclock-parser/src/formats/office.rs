use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::grid::RawGrid;
use crate::model::{AttendanceEvent, Source};

use super::{parse_time_lenient, SourceParser};

/// Office attendance sheet: no header row, just an implicit fixed-stride
/// block layout. Employee blocks start at row 4 (0-based) and repeat every
/// 3 rows; the block's first row carries identity cells and the row below it
/// carries one multi-line time cell per calendar day.
pub struct OfficeParser;

const FIRST_BLOCK_ROW: usize = 4;
const BLOCK_STRIDE: usize = 3;
const NAME_COL: usize = 10;
const ID_COL: usize = 2;
const DEPARTMENT_COL: usize = 20;
/// Day 1 lives in this column; day `d` in `DAY_BASE_COL + d`.
const DAY_BASE_COL: usize = 3;
const MAX_DAY: u32 = 31;

impl OfficeParser {
    const NAME: &'static str = "OFFICE";
}

impl SourceParser for OfficeParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn source(&self) -> Source {
        Source::Office
    }

    fn parse(
        &self,
        grid: &RawGrid,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendanceEvent>, ParserError> {
        let mut events = Vec::new();

        let mut block_row = FIRST_BLOCK_ROW;
        while block_row < grid.row_count() {
            let name = grid.cell(block_row, NAME_COL).trim().to_string();
            if name.is_empty() {
                // Blank spacer between real employee blocks.
                block_row += BLOCK_STRIDE;
                continue;
            }
            let id = grid.cell(block_row, ID_COL).trim().to_string();
            let department = grid.cell(block_row, DEPARTMENT_COL).trim().to_string();

            for day in 1..=MAX_DAY {
                let cell = grid.cell(block_row + 1, DAY_BASE_COL + day as usize);
                if cell.trim().is_empty() {
                    continue;
                }

                // A populated cell at an impossible day means the file and the
                // requested month disagree; surfaced rather than clamped.
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(
                    ParserError::InvalidDate {
                        parser: Self::NAME,
                        year,
                        month,
                        day,
                    },
                )?;

                // First line is the day's first punch, last line its last.
                // A single-line cell is one observed punch, not an error.
                let mut lines = cell.lines();
                let first = lines.next().unwrap_or("");
                let last = lines.last().unwrap_or(first);

                let clock_in = parse_time_lenient(Self::NAME, first);
                let clock_out = parse_time_lenient(Self::NAME, last);
                if clock_in.is_none() && clock_out.is_none() {
                    continue;
                }

                events.push(AttendanceEvent {
                    employee_name: name.clone(),
                    employee_id: id.clone(),
                    department: department.clone(),
                    date,
                    clock_in,
                    clock_out,
                    source: Source::Office,
                });
            }

            block_row += BLOCK_STRIDE;
        }

        if events.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }
        Ok(events)
    }
}
