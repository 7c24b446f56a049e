//! State-equality primitives.
//!
//! Idempotence hinges on these: every write path compares observed against
//! desired with the helpers here and elides the write on a match, so a
//! converged reconciliation bumps no revisions. Nested klusterlet spec
//! equality lives with `crds::NestedValue` itself.

use std::collections::BTreeMap;

use crds::CustomizedVariable;

/// Unordered equality of string maps; `None` and empty compare equal
pub fn equal_string_map(
    a: Option<&BTreeMap<String, String>>,
    b: Option<&BTreeMap<String, String>>,
) -> bool {
    static EMPTY: BTreeMap<String, String> = BTreeMap::new();
    a.unwrap_or(&EMPTY) == b.unwrap_or(&EMPTY)
}

/// Unordered equality of variable bags
pub fn equal_variables(a: &[CustomizedVariable], b: &[CustomizedVariable]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|v| b.iter().any(|w| w.name == v.name && w.value == v.value))
}
