//! # reagent-check-csv
//!
//! CSV reader and writer for reagent-check. A threshold CSV holds a single
//! analyzer's minimums; the sheet it produces is named after the file.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
