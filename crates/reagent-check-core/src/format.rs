//! Analyzer report table formats
//!
//! A [`TableFormat`] names the columns an analyzer prints in its reagent
//! status report and says which of them carry the reagent name, the level,
//! the lot and the expiry. Two formats ship with the crate; more can be
//! loaded from a JSON object mapping format names to formats.

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the predefined Roche cobas e801 format
pub const ROCHE_E801: &str = "Roche e801";

/// Name of the predefined Beckman Coulter AU5800 format
pub const BECKMAN_AU5800: &str = "Beckman AU5800";

/// Name of the free-form line matcher; never a table format
pub const GENERIC: &str = "generic";

/// Column layout of one analyzer report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFormat {
    /// Header cells in the order the report prints them
    pub columns: Vec<String>,
    /// Column holding the level compared against the minimum
    pub quantity_column: String,
    /// Column holding the reagent name
    pub test_name_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_column: Option<String>,
    /// Set on the formats that ship with the crate
    #[serde(rename = "is_predefined", default)]
    pub predefined: bool,
}

impl TableFormat {
    /// Create a custom format from its columns and the two required roles
    pub fn new<I, S>(columns: I, quantity_column: &str, test_name_column: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            quantity_column: quantity_column.to_string(),
            test_name_column: test_name_column.to_string(),
            lot_column: None,
            expiry_column: None,
            predefined: false,
        }
    }

    /// Set the lot column
    pub fn with_lot_column(mut self, column: &str) -> Self {
        self.lot_column = Some(column.to_string());
        self
    }

    /// Set the expiry column
    pub fn with_expiry_column(mut self, column: &str) -> Self {
        self.expiry_column = Some(column.to_string());
        self
    }

    /// The Roche cobas e801 reagent list
    pub fn roche_e801() -> Self {
        let mut format = Self::new(
            [
                "Test",
                "Reason",
                "Available Tests",
                "Type",
                "Pos.",
                "Remaining",
                "Lot ID",
                "Expiry Date",
            ],
            "Remaining",
            "Test",
        )
        .with_lot_column("Lot ID")
        .with_expiry_column("Expiry Date");
        format.predefined = true;
        format
    }

    /// The Beckman Coulter AU5800 reagent management screen
    pub fn beckman_au5800() -> Self {
        let mut format = Self::new(
            [
                "Pos.",
                "Test Name",
                "R1/R2 Shots",
                "Onboard Remaining",
                "RB Stability Remaining",
                "Cal Stability Remaining",
                "Expiration",
                "Lot No.",
                "BTL No",
                "Seq.",
                "Comment",
            ],
            "R1/R2 Shots",
            "Test Name",
        )
        .with_lot_column("Lot No.")
        .with_expiry_column("Expiration");
        format.predefined = true;
        format
    }

    /// Check the format is usable, naming it `name` in the error
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::invalid_format(name, "'columns' must not be empty"));
        }
        if let Some(i) = self.columns.iter().position(|c| c.trim().is_empty()) {
            return Err(Error::invalid_format(
                name,
                format!("column {} has an empty header", i + 1),
            ));
        }

        for (role, column) in [
            ("quantity_column", &self.quantity_column),
            ("test_name_column", &self.test_name_column),
        ] {
            if column.trim().is_empty() {
                return Err(Error::invalid_format(
                    name,
                    format!("'{}' must be a non-empty string", role),
                ));
            }
            if !self.has_column(column) {
                return Err(Error::invalid_format(
                    name,
                    format!("'{}' names '{}', which is not in 'columns'", role, column),
                ));
            }
        }

        for (role, column) in [
            ("lot_column", &self.lot_column),
            ("expiry_column", &self.expiry_column),
        ] {
            if matches!(column, Some(c) if c.trim().is_empty()) {
                return Err(Error::invalid_format(
                    name,
                    format!("'{}', if provided, must be a non-empty string", role),
                ));
            }
        }

        Ok(())
    }

    /// Check if `column` is one of the format's columns (case-insensitive)
    pub fn has_column(&self, column: &str) -> bool {
        let wanted = column.trim().to_lowercase();
        self.columns
            .iter()
            .any(|c| c.trim().to_lowercase() == wanted)
    }
}

/// Predefined formats plus user-supplied custom ones
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    predefined: Vec<(&'static str, TableFormat)>,
    custom: BTreeMap<String, TableFormat>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a registry holding only the predefined formats
    pub fn new() -> Self {
        Self {
            predefined: vec![
                (ROCHE_E801, TableFormat::roche_e801()),
                (BECKMAN_AU5800, TableFormat::beckman_au5800()),
            ],
            custom: BTreeMap::new(),
        }
    }

    /// Check if `name` is reserved by a predefined format or the generic matcher
    pub fn is_reserved(&self, name: &str) -> bool {
        let name = name.trim();
        name.eq_ignore_ascii_case(GENERIC)
            || self
                .predefined
                .iter()
                .any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Add or replace a custom format
    pub fn insert_custom<S: Into<String>>(&mut self, name: S, format: TableFormat) -> Result<()> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid_format(name, "format name must not be empty"));
        }
        if self.is_reserved(&name) {
            return Err(Error::ReservedFormatName(name));
        }
        format.validate(&name)?;

        let format = TableFormat {
            predefined: false,
            ..format
        };
        // Replace a differently-cased entry for the same name
        if let Some(existing) = self.custom_key(&name) {
            self.custom.remove(&existing);
        }
        self.custom.insert(name, format);
        Ok(())
    }

    /// Remove a custom format, returning it
    pub fn remove_custom(&mut self, name: &str) -> Option<TableFormat> {
        let key = self.custom_key(name)?;
        self.custom.remove(&key)
    }

    fn custom_key(&self, name: &str) -> Option<String> {
        let name = name.trim();
        self.custom
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Look up a format by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&TableFormat> {
        let name = name.trim();
        self.predefined
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| f)
            .or_else(|| {
                self.custom
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                    .map(|(_, f)| f)
            })
    }

    /// The canonical spelling of a registered name
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.predefined
            .iter()
            .map(|(n, _)| *n)
            .find(|n| n.eq_ignore_ascii_case(name))
            .or_else(|| {
                self.custom
                    .keys()
                    .map(String::as_str)
                    .find(|n| n.eq_ignore_ascii_case(name))
            })
    }

    /// All format names: predefined first, then custom in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.predefined
            .iter()
            .map(|(n, _)| *n)
            .chain(self.custom.keys().map(String::as_str))
            .collect()
    }

    /// Number of custom formats
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }

    /// Load custom formats from a JSON object of name -> format
    ///
    /// Every entry is validated before any is added, so a bad file leaves the
    /// registry unchanged. Names are case-insensitive, so two entries that
    /// differ only in case are rejected. Returns the number of formats loaded.
    pub fn load_custom_json<R: Read>(&mut self, reader: R) -> Result<usize> {
        let entries: BTreeMap<String, TableFormat> = serde_json::from_reader(reader)?;

        let mut seen = HashSet::new();
        for (name, format) in &entries {
            if self.is_reserved(name) {
                return Err(Error::ReservedFormatName(name.trim().to_string()));
            }
            let key = name.trim().to_lowercase();
            if key.is_empty() {
                return Err(Error::invalid_format(name.as_str(), "format name must not be empty"));
            }
            if !seen.insert(key) {
                return Err(Error::invalid_format(
                    name.trim(),
                    "another entry has the same name ignoring case",
                ));
            }
            format.validate(name)?;
        }

        let count = entries.len();
        for (name, format) in entries {
            self.insert_custom(name, format)?;
        }
        Ok(count)
    }

    /// Write the custom formats as a pretty-printed JSON object
    pub fn export_custom_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.custom)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CUSTOM: &str = r#"{
        "Sysmex XN": {
            "columns": ["Reagent", "Status", "Remaining", "Lot"],
            "quantity_column": "Remaining",
            "test_name_column": "Reagent",
            "lot_column": "Lot"
        }
    }"#;

    #[test]
    fn test_predefined_formats_validate() {
        TableFormat::roche_e801().validate(ROCHE_E801).unwrap();
        TableFormat::beckman_au5800().validate(BECKMAN_AU5800).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_formats() {
        let empty = TableFormat::new(Vec::<String>::new(), "Qty", "Name");
        assert!(matches!(empty.validate("x"), Err(Error::InvalidFormat { .. })));

        let missing = TableFormat::new(["Name", "Status"], "Qty", "Name");
        let err = missing.validate("x").unwrap_err();
        assert!(err.to_string().contains("'Qty'"));

        let blank_lot = TableFormat::new(["Name", "Qty"], "Qty", "Name").with_lot_column(" ");
        assert!(blank_lot.validate("x").is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FormatRegistry::new();
        assert_eq!(
            registry.get("roche E801").map(|f| f.quantity_column.as_str()),
            Some("Remaining")
        );
        assert_eq!(registry.canonical_name("beckman au5800"), Some(BECKMAN_AU5800));
        assert!(registry.get("generic").is_none());
    }

    #[test]
    fn test_load_custom_json() {
        let mut registry = FormatRegistry::new();
        assert_eq!(registry.load_custom_json(CUSTOM.as_bytes()).unwrap(), 1);
        assert_eq!(registry.names(), vec![ROCHE_E801, BECKMAN_AU5800, "Sysmex XN"]);

        let format = registry.get("sysmex xn").unwrap();
        assert!(!format.predefined);
        assert_eq!(format.lot_column.as_deref(), Some("Lot"));
        assert_eq!(format.expiry_column, None);
    }

    #[test]
    fn test_load_rejects_reserved_names_atomically() {
        let mut registry = FormatRegistry::new();
        let json = r#"{
            "Other": {"columns": ["A", "B"], "quantity_column": "B", "test_name_column": "A"},
            "ROCHE E801": {"columns": ["A", "B"], "quantity_column": "B", "test_name_column": "A"}
        }"#;
        assert!(matches!(
            registry.load_custom_json(json.as_bytes()),
            Err(Error::ReservedFormatName(_))
        ));
        assert_eq!(registry.custom_count(), 0);

        let generic = r#"{"Generic": {"columns": ["A"], "quantity_column": "A", "test_name_column": "A"}}"#;
        assert!(registry.load_custom_json(generic.as_bytes()).is_err());
    }

    #[test]
    fn test_load_rejects_names_differing_only_in_case() {
        let mut registry = FormatRegistry::new();
        let json = r#"{
            "Lab": {"columns": ["A", "B"], "quantity_column": "B", "test_name_column": "A"},
            "LAB ": {"columns": ["X", "Y"], "quantity_column": "Y", "test_name_column": "X"}
        }"#;
        assert!(matches!(
            registry.load_custom_json(json.as_bytes()),
            Err(Error::InvalidFormat { .. })
        ));
        assert_eq!(registry.custom_count(), 0);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut registry = FormatRegistry::new();
        assert!(matches!(
            registry.load_custom_json("[1, 2]".as_bytes()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_insert_replaces_and_remove() {
        let mut registry = FormatRegistry::new();
        registry
            .insert_custom("lab", TableFormat::new(["A", "B"], "B", "A"))
            .unwrap();
        registry
            .insert_custom("LAB", TableFormat::new(["X", "Y"], "Y", "X"))
            .unwrap();
        assert_eq!(registry.custom_count(), 1);
        assert_eq!(registry.get("lab").unwrap().columns, vec!["X", "Y"]);

        assert!(registry.remove_custom("Lab").is_some());
        assert!(registry.remove_custom("Lab").is_none());
        assert!(registry.remove_custom(ROCHE_E801).is_none());
    }

    #[test]
    fn test_export_only_custom_formats() {
        let mut registry = FormatRegistry::new();
        registry.load_custom_json(CUSTOM.as_bytes()).unwrap();

        let mut out = Vec::new();
        registry.export_custom_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "Sysmex XN": {
                    "columns": ["Reagent", "Status", "Remaining", "Lot"],
                    "quantity_column": "Remaining",
                    "test_name_column": "Reagent",
                    "lot_column": "Lot",
                    "is_predefined": false
                }
            })
        );
    }
}
