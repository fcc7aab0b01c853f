pub mod error;
pub mod layout;
pub mod pipeline;
pub mod policy;
pub mod project;
pub mod workbook;

pub use error::{PipelineError, Result};
pub use layout::{GridLayout, ReportGridLocator};
pub use pipeline::{run_pipeline, RunSummary};
pub use policy::{CategoryPolicy, EmployeeCategory};
pub use workbook::{Cell, Sheet, Workbook};
