//! The multi-sheet grid container one pipeline run owns exclusively.
//!
//! Persisted as JSON; sheets are row-major cell grids addressed by
//! zero-based (row, col). All report-side components write through
//! `Sheet::set` — nothing mutates the sheet list while cells are in flight.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(s) => s.as_str(),
            _ => "",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }

    pub fn value(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Text content at (row, col); empty string for non-text cells.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.value(row, col).as_str()
    }

    /// Writes a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize_with(col + 1, Cell::default);
        }
        r[col] = cell;
    }

    /// Appends a row of cells, as the tabular dump sheets are built.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PipelineError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| PipelineError::SheetNotFound(name.to_string()))
    }

    pub fn remove_sheet(&mut self, name: &str) {
        self.sheets.retain(|s| s.name != name);
    }

    /// Appends an empty sheet, replacing any existing sheet of that name.
    /// This is the "fully overwrite, not append" contract for the dump sheets.
    pub fn create_sheet(&mut self, name: &str) -> &mut Sheet {
        self.remove_sheet(name);
        self.sheets.push(Sheet::new(name));
        self.sheets.last_mut().unwrap()
    }

    /// Duplicates `src` (the blank report template) under `new_name`,
    /// appended at the end like a freshly copied sheet.
    pub fn copy_sheet(&mut self, src: &str, new_name: &str) -> Result<()> {
        let mut copy = self.sheet(src)?.clone();
        copy.name = new_name.to_string();
        self.remove_sheet(new_name);
        self.sheets.push(copy);
        Ok(())
    }

    /// Moves a sheet to an absolute position, clamped to the sheet count.
    pub fn move_to(&mut self, name: &str, index: usize) -> Result<()> {
        let from = self
            .sheets
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| PipelineError::SheetNotFound(name.to_string()))?;
        let sheet = self.sheets.remove(from);
        let index = index.min(self.sheets.len());
        self.sheets.insert(index, sheet);
        Ok(())
    }

    /// Moves a sheet so that exactly `n` sheets follow it (fewer when the
    /// workbook is smaller than that).
    pub fn move_before_last(&mut self, name: &str, n: usize) -> Result<()> {
        let from = self
            .sheets
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| PipelineError::SheetNotFound(name.to_string()))?;
        let sheet = self.sheets.remove(from);
        let index = self.sheets.len().saturating_sub(n);
        self.sheets.insert(index, sheet);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_grows_the_grid() {
        let mut sheet = Sheet::new("s");
        sheet.set(2, 3, Cell::text("x"));
        assert_eq!(sheet.text(2, 3), "x");
        assert!(sheet.value(0, 0).is_empty());
        assert!(sheet.value(9, 9).is_empty());
    }

    #[test]
    fn create_sheet_replaces_same_named_sheet() {
        let mut wb = Workbook::new();
        wb.create_sheet("FactoryData").set(0, 0, Cell::text("old"));
        wb.create_sheet("FactoryData");
        assert!(wb.sheet("FactoryData").unwrap().value(0, 0).is_empty());
        assert_eq!(wb.sheet_names().len(), 1);
    }

    #[test]
    fn copy_sheet_duplicates_template() {
        let mut wb = Workbook::new();
        wb.create_sheet("tmp").set(0, 0, Cell::text("Name"));
        wb.copy_sheet("tmp", "26.8").unwrap();
        assert!(wb.contains("tmp"));
        assert_eq!(wb.sheet("26.8").unwrap().text(0, 0), "Name");
    }

    #[test]
    fn move_operations_enforce_ordering_contract() {
        let mut wb = Workbook::new();
        for name in ["tmp", "FactoryData", "OfficeData", "SummaryTable", "26.8"] {
            wb.create_sheet(name);
        }
        wb.move_before_last("26.8", 3).unwrap();
        wb.move_to("SummaryTable", 2).unwrap();
        let names = wb.sheet_names();
        // Exactly 3 sheets follow the report sheet.
        let pos = names.iter().position(|n| *n == "26.8").unwrap();
        assert_eq!(names.len() - 1 - pos, 3);
        assert_eq!(names[2], "SummaryTable");
    }

    #[test]
    fn json_round_trip_preserves_cells() {
        let mut wb = Workbook::new();
        let sheet = wb.create_sheet("s");
        sheet.set(0, 0, Cell::text("08:10"));
        sheet.set(0, 1, Cell::Number(8.5));
        let json = serde_json::to_string(&wb).unwrap();
        let restored: Workbook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.sheet("s").unwrap().text(0, 0), "08:10");
        assert_eq!(restored.sheet("s").unwrap().value(0, 1).as_number(), Some(8.5));
    }
}
