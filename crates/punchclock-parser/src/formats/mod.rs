mod factory;
mod office;

pub use factory::FactoryParser;
pub use office::OfficeParser;

use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

use crate::errors::ParserError;
use crate::grid::RawGrid;
use crate::model::{AttendanceEvent, Source};

/// Seam between the pipeline and the two raw layouts. Each parser discovers
/// its own anchor positions at runtime and emits a flat event sequence.
pub trait SourceParser {
    fn name(&self) -> &'static str;
    fn source(&self) -> Source;
    fn parse(
        &self,
        grid: &RawGrid,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendanceEvent>, ParserError>;
}

/// Strips all whitespace (ASCII and full-width) and lowercases, so padded
/// header labels like `Emp  No` or `Na　me` bind to the same column.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Lenient time parse: a malformed cell is treated as an absent punch for
/// that one cell, never a fatal error.
pub(crate) fn parse_time_lenient(parser: &'static str, value: &str) -> Option<NaiveTime> {
    static FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Some(time);
        }
    }
    warn!(parser, cell = trimmed, "unparseable time cell treated as absent");
    None
}

pub(crate) fn parse_date_lenient(parser: &'static str, value: &str) -> Option<NaiveDate> {
    static FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    warn!(parser, cell = trimmed, "unparseable date cell, row dropped");
    None
}
