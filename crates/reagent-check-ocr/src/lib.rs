//! # reagent-check-ocr
//!
//! Turns an analyzer status document into [`Readings`](reagent_check_core::Readings).
//!
//! - [`OcrEngine`] - text recognition, with [`TesseractEngine`] driving the
//!   external `tesseract` and `pdftoppm` binaries
//! - [`CachedEngine`] - memoizes recognized text by document content
//! - [`Layout`] - parses recognized text for a given analyzer report format
//!
//! ## Example
//!
//! ```rust
//! use reagent_check_ocr::{Layout, OcrEngine, TextEngine};
//!
//! let text = TextEngine.recognize(b"ALB    Reagent 1    45 Tests\n").unwrap();
//! let readings = Layout::Generic.parse(&text);
//! assert_eq!(readings.get(&"alb".into()).map(|r| r.quantity), Some(45.0));
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod layout;

pub use cache::{compute_hash, CacheStats, CachedEngine, DEFAULT_TTL};
pub use engine::{DocumentKind, ImageFormat, OcrEngine, TesseractConfig, TesseractEngine, TextEngine};
pub use error::{OcrError, OcrResult};
pub use layout::Layout;
