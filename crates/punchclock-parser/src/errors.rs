use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser}: no header row with the required date/time columns in the first {rows_scanned} rows")]
    HeaderNotFound {
        parser: &'static str,
        rows_scanned: usize,
    },

    #[error("{parser}: required column '{column}' missing from header row {header_row}")]
    MissingColumn {
        parser: &'static str,
        column: &'static str,
        header_row: usize,
    },

    #[error("{parser}: day {day} does not exist in {year}-{month:02}")]
    InvalidDate {
        parser: &'static str,
        year: i32,
        month: u32,
        day: u32,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser}: file contained no attendance rows")]
    EmptyData { parser: &'static str },
}
