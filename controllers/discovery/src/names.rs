//! Well-known record names, annotation keys, and addon sets.
//!
//! These identifiers are part of the wire contract with the rest of the
//! fleet machinery; downstream agents and operators look records up by
//! exactly these names.

/// Master deployment config that carries the discovery-import switch
pub const MASTER_CONFIG_NAME: &str = "hypershift-addon-deploy-config";

/// Namespace-install config attached to the discovery addons
pub const NS_INSTALL_CONFIG_NAME: &str = "addon-ns-config";

/// Klusterlet config selecting the no-operator import mode
pub const KLUSTERLET_CONFIG_NAME: &str = "mce-import-klusterlet-config";

/// Trigger record watched by the setup orchestrator
pub const SETUP_TRIGGER_NAME: &str = "acm-hub-setup-trigger";

/// Operator-visible projection of the master config
pub const INFO_RECORD_NAME: &str = "hypershift-addon-deploy-config-info";

/// Backup label applied to managed records when backup mode is on
pub const BACKUP_LABEL_KEY: &str = "cluster.open-cluster-management.io/backup";

/// Backup label value; only the key is contract-critical
pub const BACKUP_LABEL_VALUE: &str = "true";

/// Annotation marking a managed cluster as using a klusterlet config
pub const KLUSTERLET_ANNOTATION_KEY: &str = "agent.open-cluster-management.io/klusterlet-config";

/// Placement every placement-strategy addon attaches the config in
pub const GLOBAL_PLACEMENT_NAME: &str = "global";

/// The single variable that dictates intent
pub const CONFIGURE_MCE_IMPORT_VARIABLE: &str = "configureMceImport";

/// Variable set while discovery import is enabled
pub const DISABLE_METRICS_VARIABLE: &str = "disableMetrics";

/// Variable set while discovery import is enabled
pub const DISABLE_HO_MANAGEMENT_VARIABLE: &str = "disableHOManagement";

/// Install namespace restored when discovery import is disabled
pub const DEFAULT_INSTALL_NAMESPACE: &str = "open-cluster-management-agent-addon";

/// Service-version name prefix identifying the governing platform
pub const PLATFORM_OPERATOR_PREFIX: &str = "advanced-cluster-management";

/// The addon this controller serves; never rewritten by the projection to
/// avoid feedback loops through its own watch
pub const SELF_ADDON_NAME: &str = "hypershift-addon";

/// Addons whose install strategy attaches configs per placement
pub const PLACEMENT_STRATEGY_ADDONS: [&str; 3] =
    ["work-manager", "managed-serviceaccount", "cluster-proxy"];

/// Addons forced to manual strategy with a supported-config default
pub const MANUAL_STRATEGY_ADDONS: [&str; 1] = ["application-manager"];

/// API group of addon deployment configs, as referenced from addons
pub const ADDON_CONFIG_GROUP: &str = "addon.open-cluster-management.io";

/// Resource (plural) of addon deployment configs, as referenced from addons
pub const ADDON_CONFIG_RESOURCE: &str = "addondeploymentconfigs";

/// Info record key reporting whether discovery import is in effect
pub const IMPORT_ENABLED_KEY: &str = "import-enabled";

/// Info record key carrying the master config's install namespace
pub const INSTALL_NAMESPACE_KEY: &str = "agentInstallNamespace";

/// Klusterlet install-mode discriminator written on enable
pub const INSTALL_MODE_TYPE: &str = "noOperator";

/// Postfix appended to klusterlets imported in no-operator mode
pub const INSTALL_MODE_POSTFIX: &str = "mce-import";
