//! Entitlement overrides supplied by the caller.
//!
//! Overrides arrive loosely typed ([`RawOverrides`], one `serde_json::Value`
//! per parameter) from files or frontends and are narrowed into an
//! [`OverrideSet`] of string sequences before anything touches the disk.

mod file;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{MergeError, Result};

pub use file::load_overrides_file;

/// One of the four entitlements this tool knows how to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    AppleSignin,
    AppGroupIdentifiers,
    AppPayments,
    AppAssociatedDomains,
}

impl OverrideField {
    pub const ALL: [OverrideField; 4] = [
        OverrideField::AppleSignin,
        OverrideField::AppGroupIdentifiers,
        OverrideField::AppPayments,
        OverrideField::AppAssociatedDomains,
    ];

    /// Parameter name used by callers.
    pub fn parameter(self) -> &'static str {
        match self {
            OverrideField::AppleSignin => "apple_signin",
            OverrideField::AppGroupIdentifiers => "app_group_identifiers",
            OverrideField::AppPayments => "app_payments",
            OverrideField::AppAssociatedDomains => "app_associated_domains",
        }
    }

    /// Key written into the entitlements dictionary.
    pub fn document_key(self) -> &'static str {
        match self {
            OverrideField::AppleSignin => "com.apple.developer.applesignin",
            OverrideField::AppGroupIdentifiers => "com.apple.security.application-groups",
            OverrideField::AppPayments => "com.apple.developer.in-app-payments",
            OverrideField::AppAssociatedDomains => "com.apple.developer.associated-domains",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OverrideField::AppleSignin => {
                "An array of access levels for Sign in with Apple, e.g. ['Default']"
            }
            OverrideField::AppGroupIdentifiers => {
                "An array of unique identifiers for the app groups, e.g. ['group.com.test.testapp']"
            }
            OverrideField::AppPayments => {
                "An array of merchant identifiers for in-app payments, e.g. ['merchant.com.test.testapp']"
            }
            OverrideField::AppAssociatedDomains => {
                "An array of associated domains, e.g. ['applinks:cv.test.cn']"
            }
        }
    }

    pub fn from_parameter(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.parameter() == name)
    }
}

impl std::fmt::Display for OverrideField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.parameter())
    }
}

/// Override values as the caller handed them in, before type checking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOverrides {
    values: BTreeMap<OverrideField, Value>,
}

impl RawOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a map keyed by parameter name. Unknown names are rejected.
    pub fn from_map(map: &serde_json::Map<String, Value>) -> Result<Self> {
        let mut raw = Self::new();
        for (name, value) in map {
            let field = OverrideField::from_parameter(name)
                .ok_or_else(|| MergeError::UnknownParameter(name.clone()))?;
            raw.set(field, value.clone());
        }
        Ok(raw)
    }

    /// Set a parameter, replacing any previous value for it.
    pub fn set(&mut self, field: OverrideField, value: Value) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: OverrideField) -> Option<&Value> {
        self.values.get(&field)
    }

    /// Layer `other` on top of `self`; fields present in `other` win.
    pub fn extend(&mut self, other: RawOverrides) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverrideField, &Value)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&OverrideSet> for RawOverrides {
    fn from(set: &OverrideSet) -> Self {
        let mut raw = RawOverrides::new();
        for (field, values) in set.iter() {
            raw.set(
                field,
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        raw
    }
}

/// Typed overrides: each field is either absent or a full replacement list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverrideSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_signin: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_group_identifiers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_payments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_associated_domains: Option<Vec<String>>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow raw values into string sequences.
    ///
    /// Fails with [`MergeError::InvalidOverrideType`] on the first value that
    /// is not an array of strings.
    pub fn from_raw(raw: &RawOverrides) -> Result<Self> {
        let mut set = Self::new();
        for (field, value) in raw.iter() {
            set.set(field, string_sequence(field, value)?);
        }
        Ok(set)
    }

    pub fn with_apple_signin<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(OverrideField::AppleSignin, values)
    }

    pub fn with_app_group_identifiers<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(OverrideField::AppGroupIdentifiers, values)
    }

    pub fn with_app_payments<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(OverrideField::AppPayments, values)
    }

    pub fn with_app_associated_domains<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(OverrideField::AppAssociatedDomains, values)
    }

    fn with<I, S>(mut self, field: OverrideField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn set(&mut self, field: OverrideField, values: Vec<String>) {
        *self.slot_mut(field) = Some(values);
    }

    pub fn get(&self, field: OverrideField) -> Option<&[String]> {
        self.slot(field).as_deref()
    }

    /// Present overrides in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (OverrideField, &[String])> {
        OverrideField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|values| (field, values)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, field: OverrideField) -> &Option<Vec<String>> {
        match field {
            OverrideField::AppleSignin => &self.apple_signin,
            OverrideField::AppGroupIdentifiers => &self.app_group_identifiers,
            OverrideField::AppPayments => &self.app_payments,
            OverrideField::AppAssociatedDomains => &self.app_associated_domains,
        }
    }

    fn slot_mut(&mut self, field: OverrideField) -> &mut Option<Vec<String>> {
        match field {
            OverrideField::AppleSignin => &mut self.apple_signin,
            OverrideField::AppGroupIdentifiers => &mut self.app_group_identifiers,
            OverrideField::AppPayments => &mut self.app_payments,
            OverrideField::AppAssociatedDomains => &mut self.app_associated_domains,
        }
    }
}

fn string_sequence(field: OverrideField, value: &Value) -> Result<Vec<String>> {
    let invalid = |found: String| MergeError::InvalidOverrideType {
        parameter: field.parameter(),
        found,
    };

    let Value::Array(items) = value else {
        return Err(invalid(json_kind(value).to_string()));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(format!("an array containing {}", json_kind(other)))),
        })
        .collect()
}

/// Short human name for the kind of a JSON value.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameter_names_round_trip_to_fields() {
        for field in OverrideField::ALL {
            assert_eq!(OverrideField::from_parameter(field.parameter()), Some(field));
        }
        assert_eq!(OverrideField::from_parameter("aps_environment"), None);
    }

    #[test]
    fn from_raw_accepts_string_arrays() {
        let mut raw = RawOverrides::new();
        raw.set(OverrideField::AppPayments, json!(["merchant.com.test.testapp"]));
        raw.set(OverrideField::AppleSignin, json!([]));

        let set = OverrideSet::from_raw(&raw).unwrap();

        assert_eq!(
            set.get(OverrideField::AppPayments),
            Some(&["merchant.com.test.testapp".to_string()][..])
        );
        assert_eq!(set.get(OverrideField::AppleSignin), Some(&[][..]));
        assert_eq!(set.get(OverrideField::AppGroupIdentifiers), None);
    }

    #[test]
    fn from_raw_rejects_bare_string() {
        let mut raw = RawOverrides::new();
        raw.set(OverrideField::AppGroupIdentifiers, json!("group.com.test"));

        let err = OverrideSet::from_raw(&raw).unwrap_err();

        match err {
            MergeError::InvalidOverrideType { parameter, found } => {
                assert_eq!(parameter, "app_group_identifiers");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_raw_rejects_mixed_arrays() {
        let mut raw = RawOverrides::new();
        raw.set(OverrideField::AppAssociatedDomains, json!(["applinks:a.test", 7]));

        let err = OverrideSet::from_raw(&raw).unwrap_err();

        assert!(err.to_string().contains("an array containing number"));
    }

    #[test]
    fn from_map_rejects_unknown_parameter() {
        let map = json!({"apple_signin": ["Default"], "icloud": ["x"]});

        let err = RawOverrides::from_map(map.as_object().unwrap()).unwrap_err();

        assert!(matches!(err, MergeError::UnknownParameter(name) if name == "icloud"));
    }

    #[test]
    fn extend_prefers_later_values() {
        let mut base = RawOverrides::new();
        base.set(OverrideField::AppleSignin, json!(["Default"]));
        base.set(OverrideField::AppPayments, json!(["merchant.a"]));
        let top = RawOverrides::from(&OverrideSet::new().with_apple_signin(["Repressed"]));

        base.extend(top);

        assert_eq!(base.get(OverrideField::AppleSignin), Some(&json!(["Repressed"])));
        assert_eq!(base.get(OverrideField::AppPayments), Some(&json!(["merchant.a"])));
    }

    #[test]
    fn iter_follows_declaration_order() {
        let set = OverrideSet::new()
            .with_app_associated_domains(["applinks:cv.test.cn"])
            .with_apple_signin(["Default"]);

        let fields: Vec<_> = set.iter().map(|(field, _)| field).collect();

        assert_eq!(
            fields,
            vec![OverrideField::AppleSignin, OverrideField::AppAssociatedDomains]
        );
    }
}
