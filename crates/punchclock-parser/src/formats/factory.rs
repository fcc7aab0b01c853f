use crate::errors::ParserError;
use crate::grid::RawGrid;
use crate::model::{AttendanceEvent, Source};

use super::{normalize_label, parse_date_lenient, parse_time_lenient, SourceParser};

/// Badge-reader export from the factory gate. The header row position varies
/// with export settings, so the first phase scans candidate rows for the
/// date/time column pair and only then binds the remaining offsets.
pub struct FactoryParser;

/// How many leading rows may precede the real header.
const HEADER_SCAN_ROWS: usize = 5;

const COL_DATE: &str = "accessdate";
const COL_TIME: &str = "accesstime";
const COL_ACTION: &str = "action";
const COL_NAME: &str = "name";
const COL_ID: &str = "empno";
const COL_DEPARTMENT: &str = "department";

/// Action codes that represent a real punch. Everything else (door
/// heartbeats, alarm tests) is discarded.
const PUNCH_ACTIONS: &[&str] = &["check-in", "access", "check-out"];

struct BoundColumns {
    date: usize,
    time: usize,
    action: usize,
    name: usize,
    id: usize,
    department: Option<usize>,
}

impl FactoryParser {
    const NAME: &'static str = "FACTORY";

    fn find_header_row(grid: &RawGrid) -> Option<usize> {
        for row_idx in 0..HEADER_SCAN_ROWS.min(grid.row_count()) {
            let row = grid.row(row_idx)?;
            let labels: Vec<String> = row.iter().map(|c| normalize_label(c)).collect();
            if labels.iter().any(|l| l == COL_DATE) && labels.iter().any(|l| l == COL_TIME) {
                return Some(row_idx);
            }
        }
        None
    }

    fn bind_columns(grid: &RawGrid, header_row: usize) -> Result<BoundColumns, ParserError> {
        let row = grid.row(header_row).unwrap_or(&[]);
        let find = |label: &str| {
            row.iter()
                .position(|cell| normalize_label(cell) == label)
        };
        let require = |label: &'static str| {
            find(label).ok_or(ParserError::MissingColumn {
                parser: Self::NAME,
                column: label,
                header_row,
            })
        };

        Ok(BoundColumns {
            date: require(COL_DATE)?,
            time: require(COL_TIME)?,
            action: require(COL_ACTION)?,
            name: require(COL_NAME)?,
            id: require(COL_ID)?,
            department: find(COL_DEPARTMENT),
        })
    }
}

impl SourceParser for FactoryParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn source(&self) -> Source {
        Source::Factory
    }

    fn parse(
        &self,
        grid: &RawGrid,
        _year: i32,
        _month: u32,
    ) -> Result<Vec<AttendanceEvent>, ParserError> {
        let header_row = Self::find_header_row(grid).ok_or(ParserError::HeaderNotFound {
            parser: Self::NAME,
            rows_scanned: HEADER_SCAN_ROWS,
        })?;
        let columns = Self::bind_columns(grid, header_row)?;

        let mut events = Vec::new();
        for row_idx in header_row + 1..grid.row_count() {
            let action = normalize_label(grid.cell(row_idx, columns.action));
            if !PUNCH_ACTIONS.contains(&action.as_str()) {
                continue;
            }

            let Some(date) = parse_date_lenient(Self::NAME, grid.cell(row_idx, columns.date))
            else {
                continue;
            };
            let Some(time) = parse_time_lenient(Self::NAME, grid.cell(row_idx, columns.time))
            else {
                continue;
            };

            let name = grid.cell(row_idx, columns.name).trim();
            let id = grid.cell(row_idx, columns.id).trim();
            if name.is_empty() {
                continue;
            }
            let department = columns
                .department
                .map(|col| grid.cell(row_idx, col).trim().to_string())
                .unwrap_or_default();

            // A gate row carries a single observed time; the first-in/last-out
            // split is the aggregator's min/max, so the time fills both sides.
            events.push(AttendanceEvent {
                employee_name: name.to_string(),
                employee_id: id.to_string(),
                department,
                date,
                clock_in: Some(time),
                clock_out: Some(time),
                source: Source::Factory,
            });
        }

        if events.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }
        Ok(events)
    }
}
