//! Prelude module - common imports for reagent-check users
//!
//! ```rust
//! use reagent_check::prelude::*;
//! ```

pub use crate::{
    // Comparison
    compare,
    // Pipeline
    open_thresholds,
    open_workbook,
    save_workbook,
    CachedEngine,
    // Cell types
    CellValue,
    Checker,
    Comparison,
    // Errors
    Error,
    Layout,
    OcrEngine,
    Reading,
    Readings,
    Result,
    Sheet,
    Status,
    TesseractConfig,
    TesseractEngine,
    TextEngine,
    // Thresholds
    Threshold,
    ThresholdBook,
    ThresholdColumns,
    ThresholdTable,
    Verdict,
    Workbook,
    // Formats
    FormatRegistry,
    TableFormat,
};
