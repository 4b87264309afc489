//! Column splitting and cell parsing shared by the table layouts

use chrono::{Datelike, NaiveDate};
use lazy_regex::regex;
use reagent_check_core::Expiry;

/// Non-blank lines with every `\r` removed and surrounding whitespace trimmed
pub(crate) fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.replace('\r', "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split a line into columns on runs of two or more whitespace characters
pub(crate) fn split_columns(line: &str) -> Vec<&str> {
    regex!(r"\s{2,}")
        .split(line.trim())
        .map(str::trim)
        .collect()
}

/// A report table's header line and its column titles
pub(crate) struct Header {
    /// Index into the line list
    pub line: usize,
    pub columns: Vec<String>,
}

impl Header {
    /// Find the first line whose columns contain every token
    ///
    /// A token matches a column when it is a case-insensitive substring of it.
    pub fn find<S: AsRef<str>>(lines: &[S], tokens: &[&str]) -> Option<Header> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        lines.iter().enumerate().find_map(|(i, line)| {
            let columns: Vec<String> = split_columns(line.as_ref())
                .into_iter()
                .map(str::to_string)
                .collect();
            let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
            tokens
                .iter()
                .all(|token| lowered.iter().any(|c| c.contains(token.as_str())))
                .then_some(Header { line: i, columns })
        })
    }

    /// First column whose title contains `needle` (case-insensitive)
    pub fn position(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_lowercase();
        self.columns
            .iter()
            .position(|c| c.to_lowercase().contains(&needle))
    }

    /// Column titled exactly `title`, else the first containing it
    pub fn position_of(&self, title: &str) -> Option<usize> {
        let wanted = title.trim().to_lowercase();
        self.columns
            .iter()
            .position(|c| c.to_lowercase() == wanted)
            .or_else(|| self.position(&wanted))
    }
}

/// Check if a line closes the table (`total` or `summary`)
pub(crate) fn is_table_end(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("total") || lowered.contains("summary")
}

/// First run of digits in a cell
pub(crate) fn first_integer(cell: &str) -> Option<u64> {
    regex!(r"\d+").find(cell)?.as_str().parse().ok()
}

/// First decimal number in a cell
///
/// `1,200` and `1,234.5` group thousands; any other comma is a decimal mark.
pub(crate) fn first_number(cell: &str) -> Option<f64> {
    let number = regex!(r"-?(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:[.,]\d+)?)")
        .find(cell)?
        .as_str();
    if regex!(r"^-?\d{1,3}(?:,\d{3})+(?:\.\d+)?$").is_match(number) {
        number.replace(',', "").parse().ok()
    } else {
        number.replace(',', ".").parse().ok()
    }
}

/// Roche-style `YYYY/MM (days)`: first of the month plus days on board
pub(crate) fn parse_month_expiry(cell: &str) -> Option<Expiry> {
    let captures = regex!(r"^(\d{4})/(\d{2})\s*\((\d+)\)").captures(cell.trim())?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Expiry {
        date,
        days_left: captures[3].parse().ok(),
    })
}

/// Full dates as `%m/%d/%Y` or `%Y-%m-%d`
pub(crate) fn parse_date_expiry(cell: &str) -> Option<Expiry> {
    let cell = cell.trim();
    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
        .filter(|date| date.year() > 1900)
        .map(Expiry::on)
}

/// Any expiry notation the layouts know about
pub(crate) fn parse_expiry(cell: &str) -> Option<Expiry> {
    parse_month_expiry(cell).or_else(|| parse_date_expiry(cell))
}

/// Cell `index` of a row, if the row is long enough and the cell is not blank
pub(crate) fn cell<'a>(columns: &[&'a str], index: Option<usize>) -> Option<&'a str> {
    index
        .and_then(|i| columns.get(i).copied())
        .filter(|c| !c.is_empty())
}
