//! Sequences the whole run: parse each supplied source, aggregate, merge,
//! rewrite the dump sheets, duplicate the report template, discover its
//! layout and project the merged records into it.
//!
//! Error isolation contract: a parse failure on one source never aborts the
//! other; per-record projection misses never abort the run. Only a run that
//! yields no merged record at all is fatal.

use chrono::NaiveDate;
use tracing::{info, warn};

use punchclock_parser::{
    aggregate_events, merge_records, CanonicalRecord, FactoryParser, MergedRecord, OfficeParser,
    RawGrid, SourceParser,
};

use crate::error::{PipelineError, Result};
use crate::layout::ReportGridLocator;
use crate::policy::CategoryPolicy;
use crate::project::{work_hours, MetricsProjector};
use crate::workbook::{Cell, Sheet, Workbook};

pub const TEMPLATE_SHEET: &str = "tmp";
pub const FACTORY_SHEET: &str = "FactoryData";
pub const OFFICE_SHEET: &str = "OfficeData";
pub const SUMMARY_SHEET: &str = "SummaryTable";

/// Sheets that must stay at the tail of the workbook after a run.
const TRAILING_SHEETS: usize = 3;
const SUMMARY_POSITION: usize = 2;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub factory_records: usize,
    pub office_records: usize,
    pub source_errors: Vec<String>,
    pub merged_records: usize,
    pub projected: usize,
    pub skipped: usize,
    pub report_sheet: String,
}

pub fn report_sheet_name(year: i32, month: u32) -> String {
    format!("{:02}.{}", year.rem_euclid(100), month)
}

pub fn run_pipeline(
    workbook: &mut Workbook,
    factory: Option<&RawGrid>,
    office: Option<&RawGrid>,
    policy: &CategoryPolicy,
    year: i32,
    month: u32,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    let factory_records =
        parse_source(&FactoryParser, factory, year, month, &mut summary.source_errors);
    if let Some(records) = &factory_records {
        summary.factory_records = records.len();
        write_records_sheet(workbook.create_sheet(FACTORY_SHEET), records);
    }

    let office_records =
        parse_source(&OfficeParser, office, year, month, &mut summary.source_errors);
    if let Some(records) = &office_records {
        summary.office_records = records.len();
        write_records_sheet(workbook.create_sheet(OFFICE_SHEET), records);
    }

    let merged = merge_records(
        factory_records
            .into_iter()
            .flatten()
            .chain(office_records.into_iter().flatten()),
    );
    if merged.is_empty() {
        return Err(PipelineError::NoData);
    }
    summary.merged_records = merged.len();

    write_summary_sheet(workbook.create_sheet(SUMMARY_SHEET), &merged);

    let report_name = report_sheet_name(year, month);
    workbook.remove_sheet(&report_name);
    workbook.copy_sheet(TEMPLATE_SHEET, &report_name)?;

    {
        let sheet = workbook.sheet_mut(&report_name)?;
        let layout = ReportGridLocator::new(policy, year, month).locate(sheet);
        let report = MetricsProjector::new(&layout).project(sheet, &merged);
        summary.projected = report.written;
        summary.skipped = report.skipped;

        // Written only after discovery: the title must never be read back as
        // an employee header.
        sheet.set(0, 0, Cell::text(format!("Attendance Register - {year}.{month}")));
    }

    // Ordering contract: summary table at position 2 from the start, then
    // the fresh report sheet placed right before the last three sheets.
    workbook.move_to(SUMMARY_SHEET, SUMMARY_POSITION)?;
    workbook.move_before_last(&report_name, TRAILING_SHEETS)?;

    summary.report_sheet = report_name;
    info!(
        merged = summary.merged_records,
        projected = summary.projected,
        skipped = summary.skipped,
        sheet = %summary.report_sheet,
        "pipeline run complete"
    );
    Ok(summary)
}

/// Parses and aggregates one source if it was supplied. A failure is
/// recorded and the run continues with the other source.
fn parse_source(
    parser: &dyn SourceParser,
    grid: Option<&RawGrid>,
    year: i32,
    month: u32,
    errors: &mut Vec<String>,
) -> Option<Vec<CanonicalRecord>> {
    let grid = grid?;
    match parser.parse(grid, year, month) {
        Ok(events) => Some(aggregate_events(&events)),
        Err(err) => {
            warn!(source = parser.name(), error = %err, "source parse failed");
            errors.push(err.to_string());
            None
        }
    }
}

fn date_cell(date: NaiveDate) -> Cell {
    Cell::text(date.format("%Y-%m-%d").to_string())
}

fn time_cell(time: Option<chrono::NaiveTime>) -> Cell {
    match time {
        Some(t) => Cell::text(t.format("%H:%M:%S").to_string()),
        None => Cell::Empty,
    }
}

fn write_records_sheet(sheet: &mut Sheet, records: &[CanonicalRecord]) {
    sheet.push_row(
        ["Name", "Emp No", "Department", "Date", "Clock In", "Clock Out", "Source"]
            .map(Cell::text)
            .to_vec(),
    );
    for record in records {
        sheet.push_row(vec![
            Cell::text(&record.employee_name),
            Cell::text(&record.employee_id),
            Cell::text(&record.department),
            date_cell(record.date),
            time_cell(record.clock_in),
            time_cell(record.clock_out),
            Cell::text(record.source.as_str()),
        ]);
    }
}

fn write_summary_sheet(sheet: &mut Sheet, records: &[MergedRecord]) {
    sheet.push_row(
        [
            "Name",
            "Emp No",
            "Department",
            "Date",
            "Clock In",
            "Clock Out",
            "Work Hours",
            "Sources",
        ]
        .map(Cell::text)
        .to_vec(),
    );
    for record in records {
        let hours = work_hours(record.clock_in, record.clock_out);
        sheet.push_row(vec![
            Cell::text(&record.employee_name),
            Cell::text(&record.employee_id),
            Cell::text(&record.department),
            date_cell(record.date),
            time_cell(record.clock_in),
            time_cell(record.clock_out),
            hours.map(Cell::Number).unwrap_or(Cell::Empty),
            Cell::text(record.source_tags()),
        ]);
    }
}
