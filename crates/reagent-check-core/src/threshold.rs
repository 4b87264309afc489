//! Minimum-volume thresholds
//!
//! A threshold workbook holds one sheet per analyzer (or analyzer module).
//! Each sheet has a header row naming a reagent column and a minimum volume
//! column; every row below it defines one threshold.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::name::ReagentKey;
use crate::sheet::{Sheet, Workbook};

/// The minimum level for one reagent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    /// Reagent name as written in the spreadsheet
    pub name: String,
    /// Join key derived from `name`
    pub key: ReagentKey,
    /// Reload when the current level is strictly below this
    pub minimum: f64,
}

impl Threshold {
    /// Create a threshold
    pub fn new<S: Into<String>>(name: S, minimum: f64) -> Self {
        let name = name.into().trim().to_string();
        let key = ReagentKey::new(&name);
        Self { name, key, minimum }
    }
}

/// Thresholds for a single analyzer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    analyzer: String,
    entries: Vec<Threshold>,
    index: HashMap<ReagentKey, usize>,
}

impl ThresholdTable {
    /// Create an empty table for an analyzer
    pub fn new<S: Into<String>>(analyzer: S) -> Self {
        Self {
            analyzer: analyzer.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Analyzer (sheet) name
    pub fn analyzer(&self) -> &str {
        &self.analyzer
    }

    /// Insert a threshold; a repeated reagent replaces the earlier row
    pub fn insert(&mut self, threshold: Threshold) {
        match self.index.get(&threshold.key) {
            Some(&i) => self.entries[i] = threshold,
            None => {
                self.index.insert(threshold.key.clone(), self.entries.len());
                self.entries.push(threshold);
            }
        }
    }

    /// Look up a threshold by key
    pub fn get(&self, key: &ReagentKey) -> Option<&Threshold> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Number of thresholds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no thresholds
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in spreadsheet order
    pub fn iter(&self) -> std::slice::Iter<'_, Threshold> {
        self.entries.iter()
    }

    /// Build a table from one sheet
    ///
    /// Returns `None` when the sheet lacks the required columns.
    pub fn from_sheet(sheet: &Sheet, columns: &ThresholdColumns) -> Option<Self> {
        let (Some(header_row), Some(header)) = (sheet.header_row(), sheet.header()) else {
            warn!("Sheet '{}' is empty. Skipping.", sheet.name());
            return None;
        };

        let Some((name_col, min_col)) = columns.locate(&header) else {
            warn!(
                "Sheet '{}' is missing a reagent name or minimum volume column. Skipping.",
                sheet.name()
            );
            return None;
        };

        let mut table = ThresholdTable::new(sheet.name());
        let mut dropped = 0usize;

        for (_, row) in sheet.rows().skip(header_row as usize + 1) {
            let name = &row[name_col];
            let minimum = &row[min_col];
            if name.is_empty() && minimum.is_empty() {
                continue;
            }
            match (cell_name(name), minimum.as_number()) {
                (Some(name), Some(minimum)) => {
                    table.insert(Threshold::new(name, minimum.trunc()));
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(
                "Sheet '{}': {} row(s) without a reagent name or numeric minimum were ignored.",
                sheet.name(),
                dropped
            );
        }

        Some(table)
    }
}

/// Text of a name cell, or `None` when blank
fn cell_name(value: &CellValue) -> Option<String> {
    if let CellValue::Error(_) = value {
        return None;
    }
    let text = value.to_text();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl<'a> IntoIterator for &'a ThresholdTable {
    type Item = &'a Threshold;
    type IntoIter = std::slice::Iter<'a, Threshold>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Thresholds for every analyzer in a workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdBook {
    tables: Vec<ThresholdTable>,
}

impl ThresholdBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an analyzer table
    pub fn push(&mut self, table: ThresholdTable) {
        self.tables.push(table);
    }

    /// Build a book from a workbook, one table per usable sheet
    ///
    /// Fails with [`Error::NoThresholds`] when no sheet yields a table.
    pub fn from_workbook(workbook: &Workbook, columns: &ThresholdColumns) -> Result<Self> {
        let mut book = ThresholdBook::new();
        for sheet in workbook.sheets() {
            if let Some(table) = ThresholdTable::from_sheet(sheet, columns) {
                info!(
                    "Loaded {} minimum volume(s) for '{}'",
                    table.len(),
                    table.analyzer()
                );
                book.push(table);
            }
        }

        if book.tables.is_empty() {
            return Err(Error::NoThresholds);
        }
        Ok(book)
    }

    /// Find an analyzer table: exact name first, then case-insensitive
    pub fn table(&self, analyzer: &str) -> Option<&ThresholdTable> {
        self.tables
            .iter()
            .find(|t| t.analyzer() == analyzer)
            .or_else(|| {
                let lowered = analyzer.to_lowercase();
                self.tables
                    .iter()
                    .find(|t| t.analyzer().to_lowercase() == lowered)
            })
    }

    /// The first analyzer table
    pub fn default_table(&self) -> Option<&ThresholdTable> {
        self.tables.first()
    }

    /// Pick the named table, or the first one when no name is given
    pub fn resolve(&self, analyzer: Option<&str>) -> Result<&ThresholdTable> {
        match analyzer {
            Some(name) => self
                .table(name)
                .ok_or_else(|| Error::SheetNotFound(name.to_string())),
            None => self.default_table().ok_or(Error::NoThresholds),
        }
    }

    /// Iterate over tables in workbook order
    pub fn tables(&self) -> impl Iterator<Item = &ThresholdTable> {
        self.tables.iter()
    }

    /// Analyzer names in workbook order
    pub fn analyzers(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.analyzer()).collect()
    }

    /// Number of analyzer tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the book has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Which header cells name the reagent and minimum columns
///
/// Without explicit names, headers are normalized (trimmed, lower-cased,
/// spaces turned into `_`) and matched by keyword: the name column is the
/// first header containing `reagent`, otherwise the first containing `test`;
/// the minimum column is the first header containing both `min` and `vol`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdColumns {
    /// Exact header of the reagent name column (case-insensitive)
    pub name: Option<String>,
    /// Exact header of the minimum volume column (case-insensitive)
    pub minimum: Option<String>,
}

impl ThresholdColumns {
    /// Use explicit column headers
    pub fn named<N: Into<String>, M: Into<String>>(name: N, minimum: M) -> Self {
        Self {
            name: Some(name.into()),
            minimum: Some(minimum.into()),
        }
    }

    /// Find `(name_column, minimum_column)` in a header row
    pub fn locate(&self, header: &[CellValue]) -> Option<(usize, usize)> {
        let headers: Vec<String> = header.iter().map(|h| normalize_header(&h.to_text())).collect();

        let name_col = match &self.name {
            Some(explicit) => position_exact(&headers, explicit)?,
            None => headers
                .iter()
                .position(|h| h.contains("reagent"))
                .or_else(|| headers.iter().position(|h| h.contains("test")))?,
        };

        let min_col = match &self.minimum {
            Some(explicit) => position_exact(&headers, explicit)?,
            None => headers
                .iter()
                .enumerate()
                .position(|(i, h)| i != name_col && h.contains("min") && h.contains("vol"))?,
        };

        (name_col != min_col).then_some((name_col, min_col))
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn position_exact(headers: &[String], wanted: &str) -> Option<usize> {
    let wanted = normalize_header(wanted);
    headers.iter().position(|h| *h == wanted)
}
