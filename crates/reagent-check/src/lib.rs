//! # reagent-check
//!
//! Compares the reagent levels an analyzer reports against staff-defined
//! minimums and flags what needs reloading.
//!
//! The pipeline:
//!
//! 1. recognize the text of a scanned status report through an external OCR
//!    engine ([`TesseractEngine`], optionally wrapped in a [`CachedEngine`]);
//! 2. parse it with the analyzer's [`Layout`] into [`Readings`];
//! 3. load a [`ThresholdBook`] from an XLSX or CSV file;
//! 4. [`compare`] the readings against one analyzer's [`ThresholdTable`],
//!    flagging `current < minimum`.
//!
//! ## Example
//!
//! ```rust
//! use reagent_check::prelude::*;
//!
//! let mut table = ThresholdTable::new("AU1-1");
//! table.insert(Threshold::new("ALB", 50.0));
//!
//! let checker = Checker::new(TextEngine);
//! let report = b"ALB     Reagent 1     45 Tests\n";
//! let comparison = checker.check(report, &Layout::Generic, &table).unwrap();
//!
//! assert_eq!(comparison.to_reload().count(), 1);
//! ```

mod checker;
mod error;
pub mod prelude;
pub mod report;

use std::path::Path;

pub use checker::Checker;
pub use error::{Error, Result};

// Re-export core types
pub use reagent_check_core::{
    compare, CellValue, Comparison, Expiry, FormatRegistry, Reading, ReagentKey, Readings,
    Sheet, Status, Summary, TableFormat, Threshold, ThresholdBook, ThresholdColumns,
    ThresholdTable, Verdict, Workbook, BECKMAN_AU5800, GENERIC, ROCHE_E801,
};

// Re-export I/O and OCR types
pub use reagent_check_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use reagent_check_ocr::{
    CacheStats, CachedEngine, DocumentKind, Layout, OcrEngine, OcrError, TesseractConfig,
    TesseractEngine, TextEngine,
};
pub use reagent_check_xlsx::{XlsxError, XlsxReader, XlsxWriter};

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Open a spreadsheet by extension: `.xlsx`/`.xlsm` or `.csv`
///
/// A CSV file becomes a single sheet named after the file stem.
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(XlsxReader::read_file(path)?),
        Some("csv") => {
            let sheet = CsvReader::read_file(path, &CsvReadOptions::default())?;
            let mut workbook = Workbook::new();
            workbook.add_sheet(sheet);
            Ok(workbook)
        }
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load per-analyzer minimum volumes from a spreadsheet
pub fn open_thresholds<P: AsRef<Path>>(
    path: P,
    columns: &ThresholdColumns,
) -> Result<ThresholdBook> {
    let workbook = open_workbook(path)?;
    Ok(ThresholdBook::from_workbook(&workbook, columns)?)
}

/// Save a workbook by extension
///
/// `.xlsx` keeps every sheet; `.csv` writes the first sheet only.
pub fn save_workbook<P: AsRef<Path>>(workbook: &Workbook, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("xlsx") => Ok(XlsxWriter::write_file(workbook, path)?),
        Some("csv") => {
            let sheet = workbook
                .sheet(0)
                .ok_or_else(|| reagent_check_core::Error::other("No sheets to save"))?;
            Ok(CsvWriter::write_file(sheet, path, &CsvWriteOptions::default())?)
        }
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}
