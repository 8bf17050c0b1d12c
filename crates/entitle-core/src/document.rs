//! In-memory entitlements document.

use plist::{Dictionary, Value};

use crate::overrides::{OverrideField, OverrideSet};

/// Root dictionary of an entitlements plist.
///
/// Keys keep their file order. Only the keys named by [`OverrideField`] are
/// ever written; everything else passes through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitlementsDocument {
    entries: Dictionary,
}

impl EntitlementsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dictionary(entries: Dictionary) -> Self {
        Self { entries }
    }

    pub fn as_dictionary(&self) -> &Dictionary {
        &self.entries
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value at `key` if it is an array made only of strings.
    pub fn string_array(&self, key: &str) -> Option<Vec<&str>> {
        self.entries
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_string)
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the value of one recognized entitlement.
    pub fn set_field(&mut self, field: OverrideField, values: &[String]) {
        let array = values.iter().cloned().map(Value::String).collect();
        self.entries
            .insert(field.document_key().to_string(), Value::Array(array));
    }

    /// Apply every present override and return the fields that were written.
    pub fn apply_overrides(&mut self, overrides: &OverrideSet) -> Vec<OverrideField> {
        overrides
            .iter()
            .map(|(field, values)| {
                self.set_field(field, values);
                field
            })
            .collect()
    }

    /// One-line rendering used in status messages.
    pub fn render(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| format!("{:?}", self.entries))
    }
}
