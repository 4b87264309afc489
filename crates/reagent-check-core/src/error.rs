//! Error types for reagent-check-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reagent-check-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Threshold sheet not found by name
    #[error("Analyzer sheet not found: {0}")]
    SheetNotFound(String),

    /// No usable threshold table was found
    #[error("No minimum volumes found (expected a reagent/test column and a minimum volume column)")]
    NoThresholds,

    /// Nothing could be parsed from the status document
    #[error("No reagent data could be parsed from the document")]
    NoReadings,

    /// Unknown table format name
    #[error("Unknown table format: {0}")]
    UnknownFormat(String),

    /// A table format failed validation
    #[error("Invalid table format '{name}': {reason}")]
    InvalidFormat { name: String, reason: String },

    /// A custom table format tried to reuse a predefined name
    #[error("'{0}' is a predefined format name")]
    ReservedFormatName(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    pub(crate) fn invalid_format<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Error::InvalidFormat {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
