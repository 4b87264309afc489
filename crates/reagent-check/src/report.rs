//! Reports built from a [`Comparison`]
//!
//! Spreadsheet reports are plain [`Workbook`]s; save them with
//! [`save_workbook`](crate::save_workbook) as `.xlsx` or `.csv`.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use reagent_check_core::cell::format_number;
use reagent_check_core::{
    CellValue, Comparison, Expiry, Readings, Sheet, Status, Verdict, Workbook,
};

/// Name of the to-load sheet
pub const TO_LOAD_SHEET: &str = "To Load";
pub const ALL_REAGENTS_SHEET: &str = "All Reagents";
pub const BELOW_MINIMUM_SHEET: &str = "Below Minimum";
pub const SUMMARY_SHEET: &str = "Summary";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn expiry_cell(expiry: Option<&Expiry>) -> CellValue {
    expiry
        .map(|e| e.date.format(DATE_FORMAT).to_string())
        .into()
}

fn to_load_rows<'a>(reload: impl Iterator<Item = &'a Verdict>, sheet: &mut Sheet) {
    sheet.push_row([
        "Reagent Name",
        "Current Volume",
        "Minimum Volume",
        "Lot",
        "Expiry",
    ]);
    for verdict in reload {
        sheet.push_row([
            CellValue::string(verdict.name.as_str()),
            CellValue::Number(verdict.current),
            verdict.minimum.into(),
            verdict.lot.clone().into(),
            expiry_cell(verdict.expiry.as_ref()),
        ]);
    }
}

/// The reagents that need reloading, one row each
///
/// Always has the header row, even when nothing is below its minimum.
pub fn to_load_sheet(comparison: &Comparison) -> Sheet {
    let mut sheet = Sheet::new(TO_LOAD_SHEET);
    to_load_rows(comparison.to_reload(), &mut sheet);
    sheet
}

/// Every reading, the reload list and a summary
///
/// `Days Left` is the on-board stability the analyzer printed, or else the
/// days from `generated` to the expiry date. The `Below Minimum` sheet is
/// only added when something needs reloading.
pub fn full_workbook(
    readings: &Readings,
    comparison: &Comparison,
    generated: NaiveDateTime,
) -> Workbook {
    let mut workbook = Workbook::new();

    let mut all = Sheet::new(ALL_REAGENTS_SHEET);
    all.push_row([
        "Reagent Name",
        "Quantity",
        "Available",
        "Lot",
        "Onboard Remaining",
        "Expiry Date",
        "Days Left",
    ]);
    for reading in readings {
        let days_left = reading.expiry.map(|e| {
            e.days_left
                .map(f64::from)
                .unwrap_or_else(|| (e.date - generated.date()).num_days() as f64)
        });
        all.push_row([
            CellValue::string(reading.name.as_str()),
            CellValue::Number(reading.quantity),
            reading.available.into(),
            reading.lot.clone().into(),
            reading.onboard_remaining.clone().into(),
            expiry_cell(reading.expiry.as_ref()),
            days_left.into(),
        ]);
    }
    workbook.add_sheet(all);

    let summary = comparison.summary();
    if summary.reload > 0 {
        let mut below = Sheet::new(BELOW_MINIMUM_SHEET);
        to_load_rows(comparison.to_reload(), &mut below);
        workbook.add_sheet(below);
    }

    let mut sheet = Sheet::new(SUMMARY_SHEET);
    sheet.push_row(["Metric", "Value"]);
    sheet.push_row([
        CellValue::string("Total Reagents Found"),
        CellValue::Number(readings.len() as f64),
    ]);
    sheet.push_row([
        CellValue::string("Reagents Below Minimum"),
        CellValue::Number(summary.reload as f64),
    ]);
    sheet.push_row([
        CellValue::string("Report Date"),
        CellValue::String(generated.format(TIMESTAMP_FORMAT).to_string()),
    ]);
    workbook.add_sheet(sheet);

    workbook
}

fn status_text(status: Status) -> &'static str {
    match status {
        Status::Reload => "RELOAD",
        Status::Sufficient => "OK",
        Status::NoThreshold => "NO MIN",
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

/// Plain-text table of every verdict, for a terminal
pub fn render_table(comparison: &Comparison) -> String {
    let headers = ["Reagent", "Current", "Minimum", "Status"];
    let rows: Vec<[String; 4]> = comparison
        .verdicts()
        .iter()
        .map(|v| {
            [
                v.name.clone(),
                format_number(v.current),
                v.minimum.map(format_number).unwrap_or_else(|| "-".into()),
                status_text(v.status).to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &headers, &widths);
    push_line(&mut out, &rule, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    let summary = comparison.summary();
    let _ = writeln!(
        out,
        "\n{}: {} checked, {} to reload, {} without a minimum",
        comparison.analyzer(),
        summary.checked,
        summary.reload,
        summary.unmatched
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use reagent_check_core::{compare, Reading, Threshold, ThresholdTable};

    fn fixture() -> (Readings, Comparison) {
        let mut readings = Readings::new();
        readings.insert_first(
            Reading::new("TSH", 35.0)
                .with_available(Some(150.0))
                .with_lot(Some("123456".into()))
                .with_expiry(Some(Expiry {
                    date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                    days_left: Some(120),
                })),
        );
        readings.insert_first(
            Reading::new("FT4", 200.0)
                .with_expiry(Some(Expiry::on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()))),
        );
        readings.insert_first(Reading::new("CRP", 12.5));

        let mut table = ThresholdTable::new("e801-1");
        table.insert(Threshold::new("tsh", 50.0));
        table.insert(Threshold::new("FT4", 100.0));

        let comparison = compare(&readings, &table).unwrap();
        (readings, comparison)
    }

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 21)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_to_load_sheet() {
        let (_, comparison) = fixture();
        let sheet = to_load_sheet(&comparison);

        assert_eq!(sheet.name(), "To Load");
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(
            sheet.row(1),
            vec![
                CellValue::string("tsh"),
                CellValue::Number(35.0),
                CellValue::Number(50.0),
                CellValue::string("123456"),
                CellValue::string("2025-08-01"),
            ]
        );
    }

    #[test]
    fn test_full_workbook() {
        let (readings, comparison) = fixture();
        let workbook = full_workbook(&readings, &comparison, generated());

        assert_eq!(
            workbook.sheet_names(),
            vec!["All Reagents", "Below Minimum", "Summary"]
        );

        let all = workbook.sheet_by_name("All Reagents").unwrap();
        assert_eq!(all.row_count(), 4);
        assert_eq!(all.get(1, 6), Some(&CellValue::Number(120.0)));
        assert_eq!(all.get(2, 6), Some(&CellValue::Number(10.0)));
        assert_eq!(all.get(3, 6), None);

        let summary = workbook.sheet_by_name("Summary").unwrap();
        assert_eq!(summary.get(1, 1), Some(&CellValue::Number(3.0)));
        assert_eq!(summary.get(2, 1), Some(&CellValue::Number(1.0)));
        assert_eq!(summary.get(3, 1), Some(&CellValue::string("2025-06-21 09:30")));
    }

    #[test]
    fn test_no_below_minimum_sheet_when_all_sufficient() {
        let mut readings = Readings::new();
        readings.insert_first(Reading::new("FT4", 200.0));
        let mut table = ThresholdTable::new("e801-1");
        table.insert(Threshold::new("FT4", 100.0));
        let comparison = compare(&readings, &table).unwrap();

        let workbook = full_workbook(&readings, &comparison, generated());
        assert_eq!(workbook.sheet_names(), vec!["All Reagents", "Summary"]);
    }

    #[test]
    fn test_render_table() {
        let (_, comparison) = fixture();
        let expected = "\
Reagent  Current  Minimum  Status
-------  -------  -------  ------
tsh      35       50       RELOAD
FT4      200      100      OK
CRP      12.5     -        NO MIN

e801-1: 2 checked, 1 to reload, 1 without a minimum
";
        assert_eq!(render_table(&comparison), expected);
    }
}
