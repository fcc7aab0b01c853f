use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which raw export a punch was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    Factory,
    Office,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Factory => "Factory",
            Source::Office => "Office",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key shared by canonical and merged records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub employee_name: String,
    pub employee_id: String,
    pub date: NaiveDate,
}

/// One observed punch. Parsers guarantee at least one time is present.
#[derive(Debug, Clone)]
pub struct AttendanceEvent {
    pub employee_name: String,
    pub employee_id: String,
    pub department: String,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub source: Source,
}

impl AttendanceEvent {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            employee_name: self.employee_name.clone(),
            employee_id: self.employee_id.clone(),
            date: self.date,
        }
    }
}

/// One employee's aggregated day from a single source: earliest clock-in,
/// latest clock-out among that day's events.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub employee_name: String,
    pub employee_id: String,
    pub department: String,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub source: Source,
}

impl CanonicalRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            employee_name: self.employee_name.clone(),
            employee_id: self.employee_id.clone(),
            date: self.date,
        }
    }
}

/// The cross-source truth for one employee-day.
#[derive(Debug, Clone)]
pub struct MergedRecord {
    pub employee_name: String,
    pub employee_id: String,
    pub department: String,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub sources: BTreeSet<Source>,
}

impl MergedRecord {
    /// Sorted, comma-joined source tags, e.g. `"Factory,Office"`.
    pub fn source_tags(&self) -> String {
        let tags: Vec<&str> = self.sources.iter().map(Source::as_str).collect();
        tags.join(",")
    }
}
