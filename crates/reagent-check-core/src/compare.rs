//! Join readings against thresholds

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::name::ReagentKey;
use crate::reading::{Expiry, Readings};
use crate::threshold::ThresholdTable;

/// Outcome for one reagent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Current level is at or above the minimum
    Sufficient,
    /// Current level is below the minimum
    Reload,
    /// The reagent is not listed for this analyzer
    NoThreshold,
}

/// The comparison result for one reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// Display name: the threshold spelling when matched, else the document's
    pub name: String,
    pub key: ReagentKey,
    pub current: f64,
    pub minimum: Option<f64>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Expiry>,
}

impl Verdict {
    /// How far below the minimum the reagent is, if it needs reloading
    pub fn shortfall(&self) -> Option<f64> {
        match (self.status, self.minimum) {
            (Status::Reload, Some(minimum)) => Some(minimum - self.current),
            _ => None,
        }
    }
}

/// Counts over a [`Comparison`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Readings that had a threshold
    pub checked: usize,
    pub reload: usize,
    pub sufficient: usize,
    /// Readings with no threshold
    pub unmatched: usize,
}

/// All verdicts for one document against one analyzer table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    analyzer: String,
    verdicts: Vec<Verdict>,
    summary: Summary,
}

impl Comparison {
    /// Analyzer whose thresholds were used
    pub fn analyzer(&self) -> &str {
        &self.analyzer
    }

    /// Every verdict, in document order
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Reagents that must be reloaded
    pub fn to_reload(&self) -> impl Iterator<Item = &Verdict> {
        self.with_status(Status::Reload)
    }

    /// Reagents with no threshold for this analyzer
    pub fn unmatched(&self) -> impl Iterator<Item = &Verdict> {
        self.with_status(Status::NoThreshold)
    }

    fn with_status(&self, status: Status) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(move |v| v.status == status)
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Check if nothing needs reloading
    pub fn all_sufficient(&self) -> bool {
        self.summary.reload == 0
    }
}

/// Compare every reading against the analyzer's thresholds
///
/// A reading is flagged for reload when `current < minimum`. Readings whose
/// reagent has no threshold are kept with [`Status::NoThreshold`].
pub fn compare(readings: &Readings, table: &ThresholdTable) -> Result<Comparison> {
    if readings.is_empty() {
        return Err(Error::NoReadings);
    }
    if table.is_empty() {
        return Err(Error::NoThresholds);
    }

    let mut summary = Summary::default();
    let verdicts: Vec<Verdict> = readings
        .iter()
        .map(|reading| {
            let threshold = table.get(&reading.key);
            let status = match threshold {
                Some(t) if reading.quantity < t.minimum => Status::Reload,
                Some(_) => Status::Sufficient,
                None => Status::NoThreshold,
            };
            match status {
                Status::Reload => summary.reload += 1,
                Status::Sufficient => summary.sufficient += 1,
                Status::NoThreshold => summary.unmatched += 1,
            }

            Verdict {
                name: threshold.map_or_else(|| reading.name.clone(), |t| t.name.clone()),
                key: reading.key.clone(),
                current: reading.quantity,
                minimum: threshold.map(|t| t.minimum),
                status,
                lot: reading.lot.clone(),
                expiry: reading.expiry,
            }
        })
        .collect();
    summary.checked = summary.reload + summary.sufficient;

    if summary.unmatched > 0 {
        let names: Vec<&str> = verdicts
            .iter()
            .filter(|v| v.status == Status::NoThreshold)
            .map(|v| v.name.as_str())
            .collect();
        info!(
            "Not in the minimums list for '{}': {}",
            table.analyzer(),
            names.join(", ")
        );
    }

    Ok(Comparison {
        analyzer: table.analyzer().to_string(),
        verdicts,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Reading;
    use crate::threshold::Threshold;
    use pretty_assertions::assert_eq;

    fn table() -> ThresholdTable {
        let mut table = ThresholdTable::new("e801-1");
        table.insert(Threshold::new("TSH", 50.0));
        table.insert(Threshold::new("FT4", 100.0));
        table.insert(Threshold::new("CA 125", 20.0));
        table
    }

    fn readings() -> Readings {
        let mut readings = Readings::new();
        readings.insert_first(Reading::new("tsh", 35.0).with_lot(Some("123456".into())));
        readings.insert_first(Reading::new("FT4", 100.0));
        readings.insert_first(Reading::new("ca 125", 19.5));
        readings.insert_first(Reading::new("PCT", 3.0));
        readings
    }

    #[test]
    fn test_statuses() {
        let comparison = compare(&readings(), &table()).unwrap();
        let statuses: Vec<(&str, Status)> = comparison
            .verdicts()
            .iter()
            .map(|v| (v.name.as_str(), v.status))
            .collect();

        assert_eq!(
            statuses,
            vec![
                ("TSH", Status::Reload),
                ("FT4", Status::Sufficient),
                ("CA 125", Status::Reload),
                ("PCT", Status::NoThreshold),
            ]
        );
    }

    #[test]
    fn test_equal_to_minimum_is_sufficient() {
        let comparison = compare(&readings(), &table()).unwrap();
        let ft4 = &comparison.verdicts()[1];
        assert_eq!(ft4.current, 100.0);
        assert_eq!(ft4.minimum, Some(100.0));
        assert_eq!(ft4.shortfall(), None);
    }

    #[test]
    fn test_summary_and_filters() {
        let comparison = compare(&readings(), &table()).unwrap();
        assert_eq!(
            comparison.summary(),
            Summary {
                checked: 3,
                reload: 2,
                sufficient: 1,
                unmatched: 1,
            }
        );
        assert!(!comparison.all_sufficient());
        assert_eq!(comparison.analyzer(), "e801-1");

        let reload: Vec<_> = comparison.to_reload().map(|v| v.name.as_str()).collect();
        assert_eq!(reload, vec!["TSH", "CA 125"]);
        assert_eq!(comparison.to_reload().next().unwrap().shortfall(), Some(15.0));
        assert_eq!(comparison.to_reload().next().unwrap().lot.as_deref(), Some("123456"));

        let unmatched: Vec<_> = comparison.unmatched().map(|v| v.name.as_str()).collect();
        assert_eq!(unmatched, vec!["PCT"]);
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        assert!(matches!(
            compare(&Readings::new(), &table()),
            Err(Error::NoReadings)
        ));
        assert!(matches!(
            compare(&readings(), &ThresholdTable::new("empty")),
            Err(Error::NoThresholds)
        ));
    }

    #[test]
    fn test_serializes_for_machines() {
        let mut readings = Readings::new();
        readings.insert_first(Reading::new("TSH", 35.0));
        let comparison = compare(&readings, &table()).unwrap();

        assert_eq!(
            serde_json::to_value(&comparison).unwrap(),
            serde_json::json!({
                "analyzer": "e801-1",
                "verdicts": [{
                    "name": "TSH",
                    "key": "tsh",
                    "current": 35.0,
                    "minimum": 50.0,
                    "status": "reload"
                }],
                "summary": {"checked": 1, "reload": 1, "sufficient": 0, "unmatched": 0}
            })
        );
    }
}
