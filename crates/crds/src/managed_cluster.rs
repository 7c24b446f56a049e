//! ManagedCluster CRD
//!
//! Represents a member cluster of the fleet. The discovery controller never
//! writes these; it only inspects annotations to decide whether a disable
//! transition is safe.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1",
    kind = "ManagedCluster",
    plural = "managedclusters"
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    /// Whether the hub accepts this cluster joining the fleet
    #[serde(default)]
    pub hub_accepts_client: bool,
}

impl ManagedCluster {
    /// Annotation value by key, if present
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }
}
