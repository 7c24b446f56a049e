//! ClusterServiceVersion CRD
//!
//! Operator service-version record. Only listed, never written: the
//! controller probes these to decide whether the governing platform operator
//! is installed (any record name prefixed `advanced-cluster-management`).

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "ClusterServiceVersion",
    plural = "clusterserviceversions",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersionSpec {
    /// Human-readable operator name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Operator version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
