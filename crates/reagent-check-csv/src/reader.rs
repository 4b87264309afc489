//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use reagent_check_core::cell::{MAX_COLS, MAX_ROWS};
use reagent_check_core::{CellValue, Sheet};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a sheet named after the file stem
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Sheet1".to_string());
        let file = File::open(path)?;
        Self::read(file, &name, options)
    }

    /// Read CSV from a reader into a sheet
    ///
    /// Every record, the header included, becomes a row; rows may have
    /// different lengths.
    pub fn read<R: Read>(reader: R, name: &str, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Sheet::new(name);

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = u32::try_from(row_idx)
                .ok()
                .filter(|r| *r < MAX_ROWS)
                .ok_or_else(|| CsvError::TooLarge(format!("more than {} rows", MAX_ROWS)))?;
            if record.len() > MAX_COLS as usize {
                return Err(CsvError::TooLarge(format!(
                    "row {} has {} fields",
                    row_idx + 1,
                    record.len()
                )));
            }

            for (col, field) in record.iter().enumerate() {
                let value = if options.auto_detect_types {
                    Self::detect_type(field)
                } else {
                    CellValue::string(field)
                };
                sheet.set(row, col as u16, value);
            }
        }

        Ok(sheet)
    }

    /// Detect whether a field is a number or text
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::string(trimmed),
        }
    }
}
