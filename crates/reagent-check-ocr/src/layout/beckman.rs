//! Beckman Coulter AU5800 reagent management screen
//!
//! Columns: Pos., Test Name, R1/R2 Shots, Onboard Remaining, RB Stability
//! Remaining, Cal Stability Remaining, Expiration, Lot No., BTL No, Seq.,
//! Comment. A test loaded in several bottles is listed once per bottle and
//! the bottle with the fewest shots left is the one that counts.

use reagent_check_core::{Reading, Readings};
use tracing::warn;

use super::columns::{
    cell, first_integer, is_table_end, lines, parse_date_expiry, split_columns, Header,
};

const HEADER_TOKENS: [&str; 3] = ["Pos.", "Test Name", "R1/R2 Shots"];

pub(crate) fn parse(text: &str) -> Readings {
    let lines = lines(text);
    let mut readings = Readings::new();

    let Some(header) = Header::find(&lines, &HEADER_TOKENS) else {
        warn!("Could not locate the Beckman AU5800 header.");
        return readings;
    };

    let (Some(name_idx), Some(shots_idx)) = (header.position("test name"), header.position("shots"))
    else {
        warn!("Beckman AU5800: 'Test Name' or 'R1/R2 Shots' column not found.");
        return readings;
    };
    let onboard_idx = header.position("onboard remaining");
    let expiry_idx = header.position("expiration");
    let lot_idx = header.position("lot");

    for line in &lines[header.line + 1..] {
        if is_table_end(line) {
            break;
        }
        let columns = split_columns(line);
        if columns.len() <= name_idx.max(shots_idx) {
            continue;
        }
        let Some(shots) = first_integer(columns[shots_idx]) else {
            continue;
        };

        let reading = Reading::new(columns[name_idx], shots as f64)
            .with_onboard_remaining(cell(&columns, onboard_idx).map(str::to_string))
            .with_lot(cell(&columns, lot_idx).map(str::to_string))
            .with_expiry(cell(&columns, expiry_idx).and_then(parse_date_expiry));
        readings.insert_min(reading);
    }

    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const SCREEN: &str = "\
Reagent Management   AU5800 #1
Pos.    Test Name    R1/R2 Shots    Onboard Remaining    RB Stability Remaining    Cal Stability Remaining    Expiration    Lot No.
1    ALB    320    25 d    10 d    5 d    03/31/2026    A1001
2    CRP    80    12 d    3 d    2 d    2026-01-15    C2002
3    ALB    45    30 d    20 d    7 d    04/30/2026    A1002
4    GLU    ----    30 d
5    AST
Summary: 4 positions
6    ALT    10
";

    #[test]
    fn test_keeps_lowest_bottle() {
        let readings = parse(SCREEN);
        let rows: Vec<(&str, f64)> = readings.iter().map(|r| (r.name.as_str(), r.quantity)).collect();
        assert_eq!(rows, vec![("ALB", 45.0), ("CRP", 80.0)]);

        let alb = readings.get(&"alb".into()).unwrap();
        assert_eq!(alb.lot.as_deref(), Some("A1002"));
        assert_eq!(alb.onboard_remaining.as_deref(), Some("30 d"));
    }

    #[test]
    fn test_expiration_formats() {
        let readings = parse(SCREEN);
        assert_eq!(
            readings.get(&"crp".into()).and_then(|r| r.expiry).map(|e| e.date),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(
            readings.get(&"alb".into()).and_then(|r| r.expiry).map(|e| e.date),
            NaiveDate::from_ymd_opt(2026, 4, 30)
        );
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        assert!(parse("ALB  320\n").is_empty());
    }
}
