//! AddOnDeploymentConfig CRD
//!
//! Deployment configuration for managed-cluster addons. The master config
//! (`hypershift-addon-deploy-config`) and the namespace-install config
//! (`addon-ns-config`) are both records of this kind; the latter carries only
//! an agent install namespace.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "addon.open-cluster-management.io",
    version = "v1alpha1",
    kind = "AddOnDeploymentConfig",
    plural = "addondeploymentconfigs",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct AddOnDeploymentConfigSpec {
    /// Namespace the addon agent is installed into on managed clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_install_namespace: Option<String>,

    /// Name/value variable bag consumed by the addon agent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customized_variables: Vec<CustomizedVariable>,
}

/// One name/value entry in an addon deployment config variable bag
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomizedVariable {
    /// Variable name
    pub name: String,

    /// Variable value; compared as an opaque string
    pub value: String,
}

impl CustomizedVariable {
    /// Create a variable entry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl AddOnDeploymentConfig {
    /// Look up a customized variable value by name
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.spec
            .customized_variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }
}
