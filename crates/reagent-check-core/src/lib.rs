//! # reagent-check-core
//!
//! Core data structures for reagent-check.
//!
//! This crate provides the fundamental types used throughout reagent-check:
//! - [`CellValue`], [`Sheet`], [`Workbook`] - A minimal spreadsheet model filled by the readers
//! - [`Reading`] and [`Readings`] - Reagent levels parsed from an analyzer status document
//! - [`ThresholdBook`] and [`ThresholdTable`] - Per-analyzer minimum volumes
//! - [`TableFormat`] and [`FormatRegistry`] - Column layouts of analyzer reports
//! - [`compare`] - Joins readings and thresholds into a pass/fail [`Comparison`]
//!
//! ## Example
//!
//! ```rust
//! use reagent_check_core::{compare, Reading, Readings, Status, Threshold, ThresholdTable};
//!
//! let mut readings = Readings::new();
//! readings.insert_first(Reading::new("TSH", 35.0));
//!
//! let mut table = ThresholdTable::new("e801-1");
//! table.insert(Threshold::new("tsh", 50.0));
//!
//! let comparison = compare(&readings, &table).unwrap();
//! assert_eq!(comparison.verdicts()[0].status, Status::Reload);
//! ```

pub mod cell;
pub mod compare;
pub mod error;
pub mod format;
pub mod name;
pub mod reading;
pub mod sheet;
pub mod threshold;

// Re-exports for convenience
pub use cell::{CellAddress, CellValue};
pub use compare::{compare, Comparison, Status, Summary, Verdict};
pub use error::{Error, Result};
pub use format::{FormatRegistry, TableFormat, BECKMAN_AU5800, GENERIC, ROCHE_E801};
pub use name::ReagentKey;
pub use reading::{Expiry, Reading, Readings};
pub use sheet::{Sheet, Workbook};
pub use threshold::{Threshold, ThresholdBook, ThresholdColumns, ThresholdTable};
