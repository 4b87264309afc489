//! Reagent readings parsed from an analyzer status document

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::name::ReagentKey;

/// Expiry information printed next to a reagent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expiry {
    /// Expiry date (first of the month when only year/month is printed)
    pub date: NaiveDate,
    /// Days of on-board stability left, when the analyzer prints it
    pub days_left: Option<u32>,
}

impl Expiry {
    /// Create an expiry without a day count
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            days_left: None,
        }
    }
}

/// One reagent line of the status document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Reagent name as printed
    pub name: String,
    /// Join key derived from `name`
    pub key: ReagentKey,
    /// The level compared against the minimum (tests, shots or volume)
    pub quantity: f64,
    /// Total available tests, when the layout reports it separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
    /// Lot identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    /// Raw on-board stability text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboard_remaining: Option<String>,
    /// Parsed expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Expiry>,
}

impl Reading {
    /// Create a reading with just a name and quantity
    pub fn new<S: Into<String>>(name: S, quantity: f64) -> Self {
        let name = name.into().trim().to_string();
        let key = ReagentKey::new(&name);
        Self {
            name,
            key,
            quantity,
            available: None,
            lot: None,
            onboard_remaining: None,
            expiry: None,
        }
    }

    /// Set the available-tests count
    pub fn with_available(mut self, available: Option<f64>) -> Self {
        self.available = available;
        self
    }

    /// Set the lot identifier
    pub fn with_lot(mut self, lot: Option<String>) -> Self {
        self.lot = lot.filter(|l| !l.trim().is_empty());
        self
    }

    /// Set the on-board stability text
    pub fn with_onboard_remaining(mut self, onboard: Option<String>) -> Self {
        self.onboard_remaining = onboard.filter(|o| !o.trim().is_empty());
        self
    }

    /// Set the expiry
    pub fn with_expiry(mut self, expiry: Option<Expiry>) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Readings in document order, unique by [`ReagentKey`]
///
/// The insertion method decides what happens when a reagent shows up twice;
/// each analyzer layout picks the rule that matches how its report lists
/// bottles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings {
    items: Vec<Reading>,
    index: HashMap<ReagentKey, usize>,
}

impl Readings {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the reagent is already present; the first occurrence wins
    ///
    /// Returns `true` if the reading was stored.
    pub fn insert_first(&mut self, reading: Reading) -> bool {
        if reading.key.is_empty() || self.index.contains_key(&reading.key) {
            return false;
        }
        self.push(reading);
        true
    }

    /// Insert, replacing an existing entry in place; the last occurrence wins
    pub fn insert_last(&mut self, reading: Reading) -> bool {
        if reading.key.is_empty() {
            return false;
        }
        match self.index.get(&reading.key) {
            Some(&i) => self.items[i] = reading,
            None => self.push(reading),
        }
        true
    }

    /// Insert, keeping whichever entry has the lower quantity
    ///
    /// Returns `true` if the reading was stored.
    pub fn insert_min(&mut self, reading: Reading) -> bool {
        if reading.key.is_empty() {
            return false;
        }
        match self.index.get(&reading.key) {
            Some(&i) if reading.quantity < self.items[i].quantity => {
                self.items[i] = reading;
                true
            }
            Some(_) => false,
            None => {
                self.push(reading);
                true
            }
        }
    }

    fn push(&mut self, reading: Reading) {
        self.index.insert(reading.key.clone(), self.items.len());
        self.items.push(reading);
    }

    /// Look up a reading by key
    pub fn get(&self, key: &ReagentKey) -> Option<&Reading> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// Number of distinct reagents
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing was parsed
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Readings {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Reading> for Readings {
    /// Collects with first-occurrence-wins semantics
    fn from_iter<T: IntoIterator<Item = Reading>>(iter: T) -> Self {
        let mut readings = Readings::new();
        for reading in iter {
            readings.insert_first(reading);
        }
        readings
    }
}

impl Serialize for Readings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}
