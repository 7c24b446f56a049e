//! ClusterManagementAddOn CRD
//!
//! Fleet-scoped declaration of an addon: its install strategy (manual or
//! placement-driven) and the deployment configs attached to it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "addon.open-cluster-management.io",
    version = "v1",
    kind = "ClusterManagementAddOn",
    plural = "clustermanagementaddons"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManagementAddOnSpec {
    /// Display metadata for the addon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_on_meta: Option<AddOnMeta>,

    /// How agents of this addon are installed on managed clusters
    #[serde(default)]
    pub install_strategy: InstallStrategy,

    /// Config kinds the addon supports, with optional fleet-wide defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_configs: Vec<ConfigMeta>,
}

/// Addon display metadata
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddOnMeta {
    /// Human-readable addon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Short description of the addon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Install strategy for an addon's agents
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallStrategy {
    /// Strategy discriminator
    #[serde(rename = "type", default)]
    pub strategy_type: InstallStrategyType,

    /// Placement-driven rollout targets; meaningful only for `Placements`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<PlacementStrategy>,
}

/// Install strategy discriminator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum InstallStrategyType {
    /// Agents are installed per explicit ManagedClusterAddOn
    #[default]
    Manual,

    /// Agents are installed wherever the attached placements select
    Placements,
}

/// One placement target with the configs attached to it
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStrategy {
    /// Placement name
    pub name: String,

    /// Placement namespace
    pub namespace: String,

    /// Config references rolled out to the selected clusters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<AddOnConfig>,
}

/// Reference from an addon to a configuration record
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddOnConfig {
    /// API group of the referenced config
    pub group: String,

    /// Resource (plural) of the referenced config
    pub resource: String,

    /// Name of the referenced config record
    pub name: String,

    /// Namespace of the referenced config record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A config kind the addon supports, with an optional fleet-wide default
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMeta {
    /// API group of the supported config kind
    pub group: String,

    /// Resource (plural) of the supported config kind
    pub resource: String,

    /// Default config applied when none is set per cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_config: Option<ConfigReferent>,
}

/// Name/namespace pair pointing at a config record
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReferent {
    /// Config record name
    pub name: String,

    /// Config record namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
