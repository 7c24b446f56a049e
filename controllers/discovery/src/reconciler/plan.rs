//! Target-state projection.
//!
//! `project()` is a pure function from (intent, environment, master config)
//! to the full desired record set. No I/O happens here; the reconciler
//! applies the plan and tests assert on it directly.
//!
//! Projection rules:
//! - The self-addon is excluded from both addon sets. The reconciler must
//!   never rewrite the record whose changes trigger it.
//! - An ungoverned environment projects the empty plan: nothing desired,
//!   nothing amended, no info record.

use std::collections::BTreeMap;

use crds::{AddOnDeploymentConfig, AddOnDeploymentConfigSpec, CustomizedVariable,
    KlusterletConfigSpec, NestedValue};

use crate::config::Config;
use crate::names::{
    DEFAULT_INSTALL_NAMESPACE, DISABLE_HO_MANAGEMENT_VARIABLE, DISABLE_METRICS_VARIABLE,
    GLOBAL_PLACEMENT_NAME, IMPORT_ENABLED_KEY, INSTALL_MODE_POSTFIX, INSTALL_MODE_TYPE,
    INSTALL_NAMESPACE_KEY, MANUAL_STRATEGY_ADDONS, PLACEMENT_STRATEGY_ADDONS,
};

use super::intent::{Environment, Intent};

/// Desired record set for one reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Direction the attachments and amendments converge toward
    pub intent: Intent,

    /// Desired namespace-install config content, or absent
    pub ns_install_config: Option<AddOnDeploymentConfigSpec>,

    /// Amendments to the master config itself
    pub master_amendment: MasterAmendment,

    /// Per-addon attachment work, one variant per addon class
    pub attachments: Vec<AddonAttachment>,

    /// Desired klusterlet config content, or absent
    pub klusterlet_config: Option<KlusterletConfigSpec>,

    /// Desired info record data, or absent (ungoverned only)
    pub info: Option<BTreeMap<String, String>>,
}

/// Changes the master config must converge toward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterAmendment {
    /// Install namespace the master config must carry
    pub install_namespace: String,

    /// Variables that must be present with these values
    pub add_variables: Vec<CustomizedVariable>,

    /// Variable names that must be absent
    pub remove_variables: Vec<String>,
}

/// One addon's attachment work; the reconciler dispatches on the variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonAttachment {
    /// Attach (or detach) the config ref in the named placement
    Placement {
        /// Addon name
        addon: String,
        /// Placement name to locate
        placement_name: String,
        /// Placement namespace to locate
        placement_namespace: String,
    },
    /// Force manual strategy and attach (or detach) the supported-config
    /// default
    Manual {
        /// Addon name
        addon: String,
    },
}

/// Compute the desired record set for the given intent and environment.
///
/// Pure and deterministic; a no-op intent never reaches this function (the
/// reconciler short-circuits to the info record).
pub fn project(
    intent: Intent,
    environment: Environment,
    config: &AddOnDeploymentConfig,
    settings: &Config,
) -> Plan {
    if environment == Environment::Ungoverned {
        return Plan {
            intent,
            ns_install_config: None,
            master_amendment: MasterAmendment {
                install_namespace: DEFAULT_INSTALL_NAMESPACE.to_owned(),
                add_variables: Vec::new(),
                remove_variables: Vec::new(),
            },
            attachments: Vec::new(),
            klusterlet_config: None,
            info: None,
        };
    }

    let enable = intent == Intent::Enable;

    let master_amendment = if enable {
        MasterAmendment {
            install_namespace: settings.addon_namespace.clone(),
            add_variables: vec![
                CustomizedVariable::new(DISABLE_METRICS_VARIABLE, "true"),
                CustomizedVariable::new(DISABLE_HO_MANAGEMENT_VARIABLE, "true"),
            ],
            remove_variables: Vec::new(),
        }
    } else {
        MasterAmendment {
            install_namespace: DEFAULT_INSTALL_NAMESPACE.to_owned(),
            add_variables: Vec::new(),
            remove_variables: vec![
                DISABLE_METRICS_VARIABLE.to_owned(),
                DISABLE_HO_MANAGEMENT_VARIABLE.to_owned(),
            ],
        }
    };

    let attachments = PLACEMENT_STRATEGY_ADDONS
        .iter()
        .map(|addon| AddonAttachment::Placement {
            addon: (*addon).to_owned(),
            placement_name: GLOBAL_PLACEMENT_NAME.to_owned(),
            placement_namespace: settings.policy_namespace.clone(),
        })
        .chain(MANUAL_STRATEGY_ADDONS.iter().map(|addon| {
            AddonAttachment::Manual {
                addon: (*addon).to_owned(),
            }
        }))
        .collect();

    Plan {
        intent,
        ns_install_config: enable.then(|| ns_install_config_spec(settings)),
        master_amendment: master_amendment.clone(),
        attachments,
        klusterlet_config: enable.then(|| KlusterletConfigSpec {
            install_mode: Some(klusterlet_install_mode()),
        }),
        info: Some(info_data_amended(config, intent, &master_amendment)),
    }
}

/// Desired namespace-install config content while enabled
pub fn ns_install_config_spec(settings: &Config) -> AddOnDeploymentConfigSpec {
    AddOnDeploymentConfigSpec {
        agent_install_namespace: Some(settings.addon_namespace.clone()),
        customized_variables: Vec::new(),
    }
}

/// Desired klusterlet install-mode tree while enabled
pub fn klusterlet_install_mode() -> NestedValue {
    NestedValue::map([
        ("type", INSTALL_MODE_TYPE.into()),
        (
            INSTALL_MODE_TYPE,
            NestedValue::map([("postfix", INSTALL_MODE_POSTFIX.into())]),
        ),
    ])
}

/// Flattened info-record projection of a master config as observed
pub fn info_data(config: &AddOnDeploymentConfig, intent: Intent) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    for variable in &config.spec.customized_variables {
        data.insert(variable.name.clone(), variable.value.clone());
    }
    if let Some(namespace) = &config.spec.agent_install_namespace {
        data.insert(INSTALL_NAMESPACE_KEY.to_owned(), namespace.clone());
    }
    data.insert(
        IMPORT_ENABLED_KEY.to_owned(),
        (intent == Intent::Enable).to_string(),
    );
    data
}

/// Info-record projection of the master config with the amendment applied,
/// so the record reflects what the master looks like after step (a)
fn info_data_amended(
    config: &AddOnDeploymentConfig,
    intent: Intent,
    amendment: &MasterAmendment,
) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    for variable in &config.spec.customized_variables {
        if amendment.remove_variables.contains(&variable.name) {
            continue;
        }
        data.insert(variable.name.clone(), variable.value.clone());
    }
    for variable in &amendment.add_variables {
        data.insert(variable.name.clone(), variable.value.clone());
    }
    data.insert(
        INSTALL_NAMESPACE_KEY.to_owned(),
        amendment.install_namespace.clone(),
    );
    data.insert(
        IMPORT_ENABLED_KEY.to_owned(),
        (intent == Intent::Enable).to_string(),
    );
    data
}
