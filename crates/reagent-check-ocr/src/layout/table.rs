//! Reports described by a custom [`TableFormat`]

use reagent_check_core::{Reading, Readings, TableFormat};
use tracing::warn;

use super::columns::{cell, first_number, is_table_end, lines, parse_expiry, split_columns, Header};

pub(crate) fn parse(format: &TableFormat, text: &str) -> Readings {
    let lines = lines(text);
    let mut readings = Readings::new();

    let tokens: Vec<&str> = format.columns.iter().take(3).map(String::as_str).collect();
    let Some(header) = Header::find(&lines, &tokens) else {
        warn!(
            "Could not locate a header containing {}.",
            tokens.join(", ")
        );
        return readings;
    };

    let (Some(name_idx), Some(quantity_idx)) = (
        header.position_of(&format.test_name_column),
        header.position_of(&format.quantity_column),
    ) else {
        warn!(
            "Columns '{}' and '{}' not both found in the report header.",
            format.test_name_column, format.quantity_column
        );
        return readings;
    };
    let lot_idx = format.lot_column.as_deref().and_then(|c| header.position_of(c));
    let expiry_idx = format
        .expiry_column
        .as_deref()
        .and_then(|c| header.position_of(c));

    let mut unreadable = 0usize;
    for line in &lines[header.line + 1..] {
        if is_table_end(line) {
            break;
        }
        let columns = split_columns(line);
        if columns.len() <= name_idx.max(quantity_idx) {
            continue;
        }
        let Some(quantity) = first_number(columns[quantity_idx]) else {
            unreadable += 1;
            continue;
        };

        let reading = Reading::new(columns[name_idx], quantity)
            .with_lot(cell(&columns, lot_idx).map(str::to_string))
            .with_expiry(cell(&columns, expiry_idx).and_then(parse_expiry));
        readings.insert_min(reading);
    }

    if unreadable > 0 {
        warn!(
            "{} row(s) had no number in '{}' and were ignored.",
            unreadable, format.quantity_column
        );
    }

    readings
}
