pub mod aggregate;
pub mod errors;
pub mod formats;
pub mod grid;
pub mod model;

pub use aggregate::{aggregate_events, merge_records};
pub use errors::ParserError;
pub use formats::{FactoryParser, OfficeParser, SourceParser};
pub use grid::RawGrid;
pub use model::{AttendanceEvent, CanonicalRecord, MergedRecord, RecordKey, Source};
