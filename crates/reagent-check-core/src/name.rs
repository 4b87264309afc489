//! Reagent name keys

use std::fmt;

use serde::Serialize;

/// The join key between document readings and threshold rows
///
/// Two reagent names refer to the same reagent iff their keys are equal:
/// surrounding whitespace is ignored and case is folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReagentKey(String);

impl ReagentKey {
    /// Build the key for a reagent name
    pub fn new(name: &str) -> Self {
        ReagentKey(name.trim().to_lowercase())
    }

    /// Get the normalized key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the name was blank
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReagentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReagentKey {
    fn from(name: &str) -> Self {
        ReagentKey::new(name)
    }
}
