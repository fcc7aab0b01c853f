use crate::errors::ParserError;

/// A raw tabular export held as row-major cell text. Both source layouts are
/// decoded against this; position discovery happens in the format modules,
/// never here.
#[derive(Debug, Clone, Default)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Reads CSV text with a flexible reader. Quoted cells keep embedded
    /// newlines, which is how the office export encodes multi-punch days.
    pub fn from_csv_str(parser: &'static str, content: &str) -> Result<Self, ParserError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| ParserError::Csv {
                parser,
                source: err,
            })?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell text at (row, col); empty string when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}
