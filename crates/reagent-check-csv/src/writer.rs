//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use reagent_check_core::Sheet;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a sheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        sheet: &Sheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(sheet, file, options)
    }

    /// Write a sheet to a writer
    ///
    /// Every row is padded to the sheet's width. Whole numbers are written
    /// without a fractional part.
    pub fn write<W: Write>(sheet: &Sheet, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        for (_, row) in sheet.rows() {
            let record: Vec<String> = row.iter().map(|value| value.to_text()).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_check_core::CellValue;

    #[test]
    fn test_write_pads_and_quotes() {
        let mut sheet = Sheet::new("To Load");
        sheet.push_row(["Reagent Name", "Current Volume", "Lot"]);
        sheet.push_row(vec![
            CellValue::from("CA 19-9, serum"),
            CellValue::from(12.0),
        ]);

        let mut out = Vec::new();
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..Default::default()
        };
        CsvWriter::write(&sheet, &mut out, &options).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Reagent Name,Current Volume,Lot\n\"CA 19-9, serum\",12,\n"
        );
    }
}
