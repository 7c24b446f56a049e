//! KlusterletConfig CRD
//!
//! Instructs the fleet's import machinery which install mode to use for
//! managed clusters that opt into this config via annotation. The spec is an
//! open nested structure owned by the import machinery; this controller only
//! needs to write one well-known shape and compare it structurally, so the
//! value is modeled as a recursive sum instead of a fixed schema.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "config.open-cluster-management.io",
    version = "v1alpha1",
    kind = "KlusterletConfig",
    plural = "klusterletconfigs"
)]
#[serde(rename_all = "camelCase")]
pub struct KlusterletConfigSpec {
    /// Install mode tree, e.g. `{type: noOperator, noOperator: {postfix: ...}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_mode: Option<NestedValue>,
}

/// Recursive string-keyed value: null, string leaf, or nested map.
///
/// Equality is structural: leaves compare by string form, maps compare as
/// unordered key/value sets. Defined once here so every consumer agrees on
/// what "unchanged" means.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NestedValue {
    /// Explicit null leaf
    Null,

    /// String leaf
    String(String),

    /// Nested map of string keys to values
    Map(BTreeMap<String, NestedValue>),
}

impl PartialEq for NestedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w))
            }
            _ => false,
        }
    }
}

impl Eq for NestedValue {}

impl From<&str> for NestedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl NestedValue {
    /// Build a map value from key/value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NestedValue)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Fetch a nested entry by key; `None` for leaves and missing keys
    pub fn get(&self, key: &str) -> Option<&NestedValue> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// String form of a leaf; `None` for maps and null
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_equality_ignores_insertion_order() {
        let a = NestedValue::map([
            ("type", "noOperator".into()),
            ("noOperator", NestedValue::map([("postfix", "mce-import".into())])),
        ]);
        let b = NestedValue::map([
            ("noOperator", NestedValue::map([("postfix", "mce-import".into())])),
            ("type", "noOperator".into()),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn nested_equality_detects_leaf_difference() {
        let a = NestedValue::map([("type", "noOperator".into())]);
        let b = NestedValue::map([("type", "default".into())]);
        assert_ne!(a, b);
        assert_ne!(NestedValue::Null, NestedValue::String(String::new()));
    }

    #[test]
    fn nested_value_round_trips_as_plain_json() {
        let value = NestedValue::map([
            ("type", "noOperator".into()),
            ("noOperator", NestedValue::map([("postfix", "mce-import".into())])),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "noOperator");
        assert_eq!(json["noOperator"]["postfix"], "mce-import");

        let back: NestedValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
