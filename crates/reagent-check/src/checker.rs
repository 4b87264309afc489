//! Recognize, parse and compare in one call

use reagent_check_core::{compare, Comparison, Readings, ThresholdTable};
use reagent_check_ocr::{Layout, OcrEngine};
use tracing::{debug, info};

use crate::error::Result;

/// Runs a status document through OCR, a layout and a threshold table
pub struct Checker<E> {
    engine: E,
}

impl<E: OcrEngine> Checker<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Recognized text of the document
    pub fn recognize(&self, document: &[u8]) -> Result<String> {
        let text = self.engine.recognize(document)?;
        debug!("Recognized {} characters", text.len());
        Ok(text)
    }

    /// Readings found in the document
    ///
    /// A document the layout cannot make sense of is an error here, unlike
    /// [`Layout::parse`].
    pub fn extract(&self, document: &[u8], layout: &Layout) -> Result<Readings> {
        let text = self.recognize(document)?;
        let readings = layout.parse(&text);
        if readings.is_empty() {
            return Err(reagent_check_core::Error::NoReadings.into());
        }
        Ok(readings)
    }

    /// Compare the document's readings against one analyzer's minimums
    pub fn check(
        &self,
        document: &[u8],
        layout: &Layout,
        table: &ThresholdTable,
    ) -> Result<Comparison> {
        let readings = self.extract(document, layout)?;
        let comparison = compare(&readings, table)?;
        let summary = comparison.summary();
        info!(
            "{}: {} checked, {} to reload, {} without a minimum",
            table.analyzer(),
            summary.checked,
            summary.reload,
            summary.unmatched
        );
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use reagent_check_core::{Status, Threshold};
    use reagent_check_ocr::{OcrError, OcrResult};

    struct FixedEngine(&'static str);

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _document: &[u8]) -> OcrResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenEngine;

    impl OcrEngine for BrokenEngine {
        fn recognize(&self, _document: &[u8]) -> OcrResult<String> {
            Err(OcrError::NotFound("tesseract".into()))
        }
    }

    fn table() -> ThresholdTable {
        let mut table = ThresholdTable::new("AU1-1");
        table.insert(Threshold::new("ALB", 50.0));
        table.insert(Threshold::new("Glucose", 100.0));
        table
    }

    #[test]
    fn test_check_flags_low_reagents() {
        let checker = Checker::new(FixedEngine(
            "ALB     Reagent 1     45 Tests\nGLUCOSE     R1     300\nCRP     R1     12\n",
        ));
        let comparison = checker.check(b"scan", &Layout::Generic, &table()).unwrap();

        let statuses: Vec<(&str, Status)> = comparison
            .verdicts()
            .iter()
            .map(|v| (v.name.as_str(), v.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("ALB", Status::Reload),
                ("Glucose", Status::Sufficient),
                ("CRP", Status::NoThreshold),
            ]
        );
        assert_eq!(comparison.analyzer(), "AU1-1");
    }

    #[test]
    fn test_nothing_parsed_is_an_error() {
        let checker = Checker::new(FixedEngine("blurry page\n"));
        assert!(matches!(
            checker.extract(b"scan", &Layout::RocheE801),
            Err(Error::Core(reagent_check_core::Error::NoReadings))
        ));
    }

    #[test]
    fn test_engine_errors_propagate() {
        let checker = Checker::new(BrokenEngine);
        assert!(matches!(
            checker.recognize(b"scan"),
            Err(Error::Ocr(OcrError::NotFound(_)))
        ));
    }
}
