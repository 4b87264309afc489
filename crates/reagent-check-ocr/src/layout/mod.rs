//! Analyzer report layouts
//!
//! OCR text of a status report is only loosely tabular: columns are separated
//! by runs of spaces and the header can sit anywhere on the page. Each layout
//! knows which header to look for and how to turn the rows below it into
//! [`Readings`]. Parsing never fails; a layout that recognizes nothing logs a
//! warning and returns an empty collection.

mod beckman;
mod columns;
mod generic;
mod roche;
mod table;

use std::fmt;

use reagent_check_core::{
    Error, FormatRegistry, Readings, Result, TableFormat, BECKMAN_AU5800, GENERIC, ROCHE_E801,
};
use tracing::{info, warn};

/// How to read one analyzer's report
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// Roche cobas e801 reagent list
    RocheE801,
    /// Beckman Coulter AU5800 reagent management screen
    BeckmanAu5800,
    /// A user-defined column layout
    Table {
        name: String,
        format: TableFormat,
    },
    /// One `name   ...   number` reading per line
    Generic,
}

impl Layout {
    /// Resolve a format name (case-insensitive)
    ///
    /// `generic` and the predefined analyzer names map to their dedicated
    /// layouts; any other registered name maps to a table layout. Unknown
    /// names are an [`Error::UnknownFormat`].
    pub fn for_format(name: &str, registry: &FormatRegistry) -> Result<Layout> {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case(GENERIC) {
            return Ok(Layout::Generic);
        }
        if trimmed.eq_ignore_ascii_case(ROCHE_E801) {
            return Ok(Layout::RocheE801);
        }
        if trimmed.eq_ignore_ascii_case(BECKMAN_AU5800) {
            return Ok(Layout::BeckmanAu5800);
        }

        match (registry.canonical_name(trimmed), registry.get(trimmed)) {
            (Some(canonical), Some(format)) => Ok(Layout::Table {
                name: canonical.to_string(),
                format: format.clone(),
            }),
            _ => Err(Error::UnknownFormat(name.to_string())),
        }
    }

    /// Display name of the layout
    pub fn name(&self) -> &str {
        match self {
            Layout::RocheE801 => ROCHE_E801,
            Layout::BeckmanAu5800 => BECKMAN_AU5800,
            Layout::Table { name, .. } => name.as_str(),
            Layout::Generic => GENERIC,
        }
    }

    /// Parse recognized text into readings
    pub fn parse(&self, text: &str) -> Readings {
        let readings = match self {
            Layout::RocheE801 => roche::parse(text),
            Layout::BeckmanAu5800 => beckman::parse(text),
            Layout::Table { format, .. } => table::parse(format, text),
            Layout::Generic => generic::parse(text),
        };

        if readings.is_empty() {
            warn!("Could not parse any reagent data with the '{}' layout.", self.name());
        } else {
            info!("Parsed {} reagent(s) with the '{}' layout", readings.len(), self.name());
        }
        readings
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_format() {
        let mut registry = FormatRegistry::new();
        registry
            .insert_custom(
                "Sysmex XN",
                TableFormat::new(["Reagent", "Status", "Remaining"], "Remaining", "Reagent"),
            )
            .unwrap();

        assert_eq!(Layout::for_format("GENERIC", &registry).unwrap(), Layout::Generic);
        assert_eq!(Layout::for_format("roche e801", &registry).unwrap(), Layout::RocheE801);
        assert_eq!(
            Layout::for_format(" Beckman AU5800 ", &registry).unwrap(),
            Layout::BeckmanAu5800
        );

        let custom = Layout::for_format("sysmex xn", &registry).unwrap();
        assert_eq!(custom.name(), "Sysmex XN");
        assert!(matches!(custom, Layout::Table { .. }));

        assert!(matches!(
            Layout::for_format("Abbott Alinity", &registry),
            Err(Error::UnknownFormat(name)) if name == "Abbott Alinity"
        ));
    }

    #[test]
    fn test_unparseable_text_is_empty_not_an_error() {
        for layout in [Layout::Generic, Layout::RocheE801, Layout::BeckmanAu5800] {
            assert!(layout.parse("").is_empty());
            assert!(layout.parse("%%%\n\n").is_empty());
        }
    }
}
