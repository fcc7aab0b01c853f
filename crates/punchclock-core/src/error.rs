use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Policy file error: {0}")]
    Policy(#[from] toml::de::Error),

    #[error("Source parse error: {0}")]
    Parse(#[from] punchclock_parser::ParserError),

    #[error("Workbook has no sheet named '{0}'")]
    SheetNotFound(String),

    #[error("no data to report: neither source yielded a usable record")]
    NoData,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
