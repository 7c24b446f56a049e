//! Environment-variable configuration.
//!
//! Every knob defaults to the production value; unset variables never block
//! startup. Boolean gates are opt-out: anything other than the literal
//! `"false"` leaves the gate open.

use std::env;

/// Runtime configuration for the discovery controller
#[derive(Debug, Clone)]
pub struct Config {
    /// Install namespace used while discovery import is enabled
    /// (`ADDON_NAMESPACE`)
    pub addon_namespace: String,

    /// Namespace holding the master config and the setup trigger
    /// (`ACM_NAMESPACE`)
    pub acm_namespace: String,

    /// Namespace of the global placement (`POLICY_NAMESPACE`)
    pub policy_namespace: String,

    /// Whether the discovery reconciler runs (`ENABLE_MCE_DISCOVERY`)
    pub discovery_enabled: bool,

    /// Whether the setup orchestrator runs (`ENABLE_ACM_HUB_SETUP`)
    pub hub_setup_enabled: bool,

    /// Whether the orchestrator applies backup labels (`BACKUP_ENABLED`)
    pub backup_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addon_namespace: "open-cluster-management-agent-addon-discovery".to_owned(),
            acm_namespace: "multicluster-engine".to_owned(),
            policy_namespace: "open-cluster-management-global-set".to_owned(),
            discovery_enabled: true,
            hub_setup_enabled: true,
            backup_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addon_namespace: env::var("ADDON_NAMESPACE").unwrap_or(defaults.addon_namespace),
            acm_namespace: env::var("ACM_NAMESPACE").unwrap_or(defaults.acm_namespace),
            policy_namespace: env::var("POLICY_NAMESPACE").unwrap_or(defaults.policy_namespace),
            discovery_enabled: gate_open(env::var("ENABLE_MCE_DISCOVERY").ok()),
            hub_setup_enabled: gate_open(env::var("ENABLE_ACM_HUB_SETUP").ok()),
            backup_enabled: gate_open(env::var("BACKUP_ENABLED").ok()),
        }
    }
}

/// A gate is closed only by the literal string `"false"`
fn gate_open(value: Option<String>) -> bool {
    value.as_deref() != Some("false")
}
