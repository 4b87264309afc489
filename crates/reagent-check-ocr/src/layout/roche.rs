//! Roche cobas e801 reagent list
//!
//! Columns: Test, Reason, Available Tests, Type, Pos., Remaining, Lot ID,
//! Expiry Date. A test appears once per reagent pack; the last row printed
//! for a test is the one kept.

use reagent_check_core::{Reading, Readings};
use tracing::warn;

use super::columns::{
    cell, first_integer, is_table_end, lines, parse_month_expiry, split_columns, Header,
};

const HEADER_TOKENS: [&str; 3] = ["Test", "Reason", "Available Tests"];

pub(crate) fn parse(text: &str) -> Readings {
    let lines = lines(text);
    let mut readings = Readings::new();

    let Some(header) = Header::find(&lines, &HEADER_TOKENS) else {
        warn!("Could not locate the Roche e801 header.");
        return readings;
    };

    let (Some(available_idx), Some(remaining_idx)) =
        (header.position("available"), header.position("remaining"))
    else {
        warn!("Roche e801: 'Available Tests' or 'Remaining' column not found.");
        return readings;
    };
    let lot_idx = header.position("lot");
    let expiry_idx = header.position("exp");

    for line in &lines[header.line + 1..] {
        if is_table_end(line) {
            break;
        }
        let columns = split_columns(line);
        if columns.len() <= available_idx.max(remaining_idx) {
            continue;
        }

        let available = first_integer(columns[available_idx]).map(|n| n as f64);
        let remaining = first_integer(columns[remaining_idx]).map(|n| n as f64);
        let Some(quantity) = remaining.or(available) else {
            continue;
        };

        let reading = Reading::new(columns[0], quantity)
            .with_available(available)
            .with_lot(cell(&columns, lot_idx).map(str::to_string))
            .with_expiry(cell(&columns, expiry_idx).and_then(parse_month_expiry));
        readings.insert_last(reading);
    }

    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
cobas e 801 Reagent Overview
Test      Reason      Available Tests      Type      Pos.      Remaining      Lot ID      Expiry Date
TSH      Low      150      R      12      35      123456      2025/08 (120)
FT4      -      400      R      13      200      223344      2025/10 (180)
CEA      Empty      0      R
TSH      -      150      R      14      140      123457      2025/09 (150)
Total   3
PCT      -      90      R      15      90
";

    #[test]
    fn test_parses_rows_until_total() {
        let readings = parse(REPORT);
        let rows: Vec<(&str, f64, Option<f64>)> = readings
            .iter()
            .map(|r| (r.name.as_str(), r.quantity, r.available))
            .collect();

        // CEA is too short; the second TSH row replaces the first in place
        assert_eq!(
            rows,
            vec![("TSH", 140.0, Some(150.0)), ("FT4", 200.0, Some(400.0))]
        );
    }

    #[test]
    fn test_lot_and_expiry() {
        let readings = parse(REPORT);
        let ft4 = readings.get(&"ft4".into()).unwrap();
        assert_eq!(ft4.lot.as_deref(), Some("223344"));
        let expiry = ft4.expiry.unwrap();
        assert_eq!(expiry.date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(expiry.days_left, Some(180));
    }

    #[test]
    fn test_remaining_falls_back_to_available() {
        let text = "Test  Reason  Available Tests  Type  Pos.  Remaining\nALB  -  45  R  3  --\n";
        let readings = parse(text);
        assert_eq!(readings.get(&"alb".into()).map(|r| r.quantity), Some(45.0));
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        assert!(parse("TSH   35\nFT4   200\n").is_empty());
        assert!(parse("Test  Reason  Available Tests\nTSH  -  10\n").is_empty());
    }
}
