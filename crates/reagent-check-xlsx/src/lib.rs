//! # reagent-check-xlsx
//!
//! Reads threshold workbooks from XLSX (Office Open XML) and writes report
//! workbooks back out. Only cell values matter here: styles, comments and
//! validation rules in the input are ignored.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
