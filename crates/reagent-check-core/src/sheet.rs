//! Sheet and workbook containers
//!
//! Readers (XLSX, CSV) fill these; the threshold loader and the report
//! writers consume them. Storage is sparse and row-major.

use std::collections::BTreeMap;

use crate::cell::CellValue;

/// A single named sheet of cell values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell value (0-based row and column)
    ///
    /// Setting [`CellValue::Empty`] clears the cell.
    pub fn set<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) {
        let value = value.into();
        if matches!(value, CellValue::Empty) {
            if let Some(cells) = self.rows.get_mut(&row) {
                cells.remove(&col);
                if cells.is_empty() {
                    self.rows.remove(&row);
                }
            }
            return;
        }
        self.rows.entry(row).or_default().insert(col, value);
    }

    /// Get a cell value, if the cell is populated
    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|cells| cells.get(&col))
    }

    /// Append a row after the last populated one
    pub fn push_row<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row = self.row_count();
        for (col, value) in values.into_iter().enumerate() {
            self.set(row, col as u16, value);
        }
    }

    /// Number of rows up to and including the last populated one
    pub fn row_count(&self) -> u32 {
        self.rows.keys().next_back().map_or(0, |r| r + 1)
    }

    /// Number of columns up to and including the rightmost populated one
    pub fn column_count(&self) -> u16 {
        self.rows
            .values()
            .filter_map(|cells| cells.keys().next_back())
            .max()
            .map_or(0, |c| c + 1)
    }

    /// Check if no cell is populated
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row as a dense vector, padded with empty cells to `column_count()`
    pub fn row(&self, row: u32) -> Vec<CellValue> {
        let width = self.column_count() as usize;
        let mut values = vec![CellValue::Empty; width];
        if let Some(cells) = self.rows.get(&row) {
            for (col, value) in cells {
                values[*col as usize] = value.clone();
            }
        }
        values
    }

    /// Iterate over all rows (including blank ones) as dense vectors
    pub fn rows(&self) -> impl Iterator<Item = (u32, Vec<CellValue>)> + '_ {
        (0..self.row_count()).map(move |r| (r, self.row(r)))
    }

    /// Index of the first row that holds a non-blank cell
    pub fn header_row(&self) -> Option<u32> {
        self.rows
            .iter()
            .find(|(_, cells)| cells.values().any(|v| !v.is_empty()))
            .map(|(r, _)| *r)
    }

    /// The header row's cells, if the sheet has any content
    pub fn header(&self) -> Option<Vec<CellValue>> {
        self.header_row().map(|r| self.row(r))
    }
}

/// An ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, returning its index
    pub fn add_sheet(&mut self, sheet: Sheet) -> usize {
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a sheet by name: exact match first, then case-insensitive
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .or_else(|| {
                let lowered = name.to_lowercase();
                self.sheets.iter().find(|s| s.name().to_lowercase() == lowered)
            })
    }

    /// Iterate over sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_rows_are_padded() {
        let mut sheet = Sheet::new("AU1-1");
        sheet.set(0, 0, "Reagent Name");
        sheet.set(0, 1, "Minimum Volume");
        sheet.set(2, 1, 40.0);

        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.row(1), vec![CellValue::Empty, CellValue::Empty]);
        assert_eq!(sheet.row(2), vec![CellValue::Empty, CellValue::Number(40.0)]);
    }

    #[test]
    fn test_setting_empty_clears_cell() {
        let mut sheet = Sheet::new("s");
        sheet.set(3, 3, "x");
        sheet.set(3, 3, CellValue::Empty);
        assert!(sheet.is_empty());
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn test_header_row_skips_blank_leading_rows() {
        let mut sheet = Sheet::new("s");
        sheet.set(0, 0, "  ");
        sheet.set(2, 0, "Test");
        assert_eq!(sheet.header_row(), Some(2));
    }

    #[test]
    fn test_push_row_appends() {
        let mut sheet = Sheet::new("s");
        sheet.push_row(["a", "b"]);
        sheet.push_row(vec![CellValue::from(1.0), CellValue::from(2.0)]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.get(1, 1), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_sheet_by_name_falls_back_to_case_insensitive() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::new("AU1-1"));
        wb.add_sheet(Sheet::new("e801"));

        assert_eq!(wb.sheet_by_name("E801").map(|s| s.name()), Some("e801"));
        assert_eq!(wb.sheet_by_name("au1-1").map(|s| s.name()), Some("AU1-1"));
        assert!(wb.sheet_by_name("missing").is_none());
        assert_eq!(wb.sheet_names(), vec!["AU1-1", "e801"]);
    }
}
