//! OCR error types

use std::process::ExitStatus;

use thiserror::Error;

/// Result type for OCR operations
pub type OcrResult<T> = std::result::Result<T, OcrError>;

/// Errors that can occur while recognizing a document
#[derive(Debug, Error)]
pub enum OcrError {
    /// An external program is not installed or not on PATH
    #[error("'{0}' not found. Install it or point to it with the matching --tesseract/--pdftoppm option.")]
    NotFound(String),

    /// An external program exited unsuccessfully
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The document is neither a PDF, a supported image nor text
    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    /// Rasterizing a PDF produced no page images
    #[error("PDF rasterization produced no pages")]
    NoPages,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
