//! Error type for the end-to-end pipeline

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from any stage: reading thresholds, recognizing, parsing, comparing
#[derive(Debug, Error)]
pub enum Error {
    /// Domain error (no readings, no thresholds, unknown format, ...)
    #[error(transparent)]
    Core(#[from] reagent_check_core::Error),

    /// XLSX error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] reagent_check_xlsx::XlsxError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] reagent_check_csv::CsvError),

    /// OCR error
    #[error("OCR error: {0}")]
    Ocr(#[from] reagent_check_ocr::OcrError),

    /// File extension not handled
    #[error("Unsupported file format: {0} (expected .xlsx, .xlsm or .csv)")]
    UnsupportedFormat(String),
}
