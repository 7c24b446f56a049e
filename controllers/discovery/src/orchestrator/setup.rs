//! The ordered setup pipeline.
//!
//! Five steps, each tracked; the first failure aborts the pipeline and the
//! aggregate goes out as `failed`. Steps are idempotent against state left
//! by earlier attempts or by the discovery reconciler, which manages some of
//! the same records (the orchestrator only creates what is absent and never
//! fights an existing spec).

use crds::{
    AddOnConfig, AddOnDeploymentConfig, AddOnDeploymentConfigSpec, CustomizedVariable,
    PlacementStrategy,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use crate::error::ControllerError;
use crate::names::{
    ADDON_CONFIG_GROUP, ADDON_CONFIG_RESOURCE, BACKUP_LABEL_KEY, BACKUP_LABEL_VALUE,
    DISABLE_HO_MANAGEMENT_VARIABLE, DISABLE_METRICS_VARIABLE, GLOBAL_PLACEMENT_NAME,
    KLUSTERLET_CONFIG_NAME, MASTER_CONFIG_NAME, NS_INSTALL_CONFIG_NAME,
    PLACEMENT_STRATEGY_ADDONS,
};

use super::results::StepTracker;
use super::Orchestrator;

impl Orchestrator {
    pub(super) async fn setup_pipeline(
        &self,
        tracker: &mut StepTracker,
    ) -> Result<(), ControllerError> {
        tracker
            .track("namespace-install-config", self.setup_ns_install_config())
            .await?;
        tracker
            .track("addon-config-references", self.setup_addon_config_refs())
            .await?;
        tracker
            .track("klusterlet-config", self.setup_klusterlet_config())
            .await?;
        tracker
            .track("self-addon-config", self.setup_self_addon_config())
            .await?;
        tracker
            .track("backup-labels", self.setup_backup_labels())
            .await?;
        Ok(())
    }

    /// Step 1: the namespace-install config exists. Created if absent only;
    /// the discovery reconciler owns updates to its content.
    async fn setup_ns_install_config(&self) -> Result<String, ControllerError> {
        let namespace = &self.settings.acm_namespace;
        if self
            .store
            .get_deploy_config(namespace, NS_INSTALL_CONFIG_NAME)
            .await?
            .is_some()
        {
            return Ok(format!("{NS_INSTALL_CONFIG_NAME} already present"));
        }

        let config = AddOnDeploymentConfig {
            metadata: ObjectMeta {
                name: Some(NS_INSTALL_CONFIG_NAME.to_owned()),
                namespace: Some(namespace.clone()),
                ..Default::default()
            },
            spec: AddOnDeploymentConfigSpec {
                agent_install_namespace: Some(self.settings.addon_namespace.clone()),
                customized_variables: Vec::new(),
            },
        };
        self.store.create_deploy_config(&config).await?;
        Ok(format!("created {NS_INSTALL_CONFIG_NAME}"))
    }

    /// Step 2: each addon in the fixed list carries a config ref in its
    /// first placement; a default placement is created when none exists.
    async fn setup_addon_config_refs(&self) -> Result<String, ControllerError> {
        let config_ref = AddOnConfig {
            group: ADDON_CONFIG_GROUP.to_owned(),
            resource: ADDON_CONFIG_RESOURCE.to_owned(),
            name: NS_INSTALL_CONFIG_NAME.to_owned(),
            namespace: Some(self.settings.acm_namespace.clone()),
        };

        let mut attached = 0usize;
        let mut skipped = 0usize;
        for addon_name in PLACEMENT_STRATEGY_ADDONS {
            let Some(mut addon) = self.store.get_cluster_addon(addon_name).await? else {
                debug!("addon {} not installed, skipping", addon_name);
                skipped += 1;
                continue;
            };

            let changed = match addon.spec.install_strategy.placements.first_mut() {
                Some(placement) => {
                    if placement.configs.contains(&config_ref) {
                        false
                    } else {
                        placement.configs.push(config_ref.clone());
                        true
                    }
                }
                None => {
                    addon
                        .spec
                        .install_strategy
                        .placements
                        .push(PlacementStrategy {
                            name: GLOBAL_PLACEMENT_NAME.to_owned(),
                            namespace: self.settings.policy_namespace.clone(),
                            configs: vec![config_ref.clone()],
                        });
                    true
                }
            };

            if changed {
                self.store.update_cluster_addon(&addon).await?;
                attached += 1;
            }
        }
        Ok(format!(
            "{attached} addon(s) updated, {skipped} not installed"
        ))
    }

    /// Step 3: reserved. The discovery reconciler owns the klusterlet
    /// config; an entry is still recorded so the audit trail stays one
    /// entry per step.
    async fn setup_klusterlet_config(&self) -> Result<String, ControllerError> {
        Ok(format!(
            "{KLUSTERLET_CONFIG_NAME} is managed by the discovery reconciler"
        ))
    }

    /// Step 4: the self-addon's deployment config carries the discovery
    /// install namespace and the two agent variables. Merge semantics:
    /// later values win, everything else in the bag survives.
    async fn setup_self_addon_config(&self) -> Result<String, ControllerError> {
        let namespace = &self.settings.acm_namespace;
        let variables = [
            CustomizedVariable::new(DISABLE_METRICS_VARIABLE, "true"),
            CustomizedVariable::new(DISABLE_HO_MANAGEMENT_VARIABLE, "true"),
        ];

        match self
            .store
            .get_deploy_config(namespace, MASTER_CONFIG_NAME)
            .await?
        {
            Some(existing) => {
                let mut desired = existing.clone();
                desired.spec.agent_install_namespace =
                    Some(self.settings.addon_namespace.clone());
                for variable in &variables {
                    if let Some(current) = desired
                        .spec
                        .customized_variables
                        .iter_mut()
                        .find(|v| v.name == variable.name)
                    {
                        current.value = variable.value.clone();
                    } else {
                        desired.spec.customized_variables.push(variable.clone());
                    }
                }
                if desired.spec == existing.spec {
                    Ok(format!("{MASTER_CONFIG_NAME} already configured"))
                } else {
                    self.store.update_deploy_config(&desired).await?;
                    Ok(format!("configured {MASTER_CONFIG_NAME}"))
                }
            }
            None => {
                let config = AddOnDeploymentConfig {
                    metadata: ObjectMeta {
                        name: Some(MASTER_CONFIG_NAME.to_owned()),
                        namespace: Some(namespace.clone()),
                        ..Default::default()
                    },
                    spec: AddOnDeploymentConfigSpec {
                        agent_install_namespace: Some(self.settings.addon_namespace.clone()),
                        customized_variables: variables.to_vec(),
                    },
                };
                self.store.create_deploy_config(&config).await?;
                Ok(format!("created {MASTER_CONFIG_NAME}"))
            }
        }
    }

    /// Step 5: apply the backup label to each managed record so fleet
    /// backup tooling picks them up. Gated by `BACKUP_ENABLED`.
    async fn setup_backup_labels(&self) -> Result<String, ControllerError> {
        if !self.settings.backup_enabled {
            return Ok("backup disabled, skipping".to_owned());
        }

        let namespace = &self.settings.acm_namespace;
        let mut labeled = 0usize;

        for name in [NS_INSTALL_CONFIG_NAME, MASTER_CONFIG_NAME] {
            if let Some(mut config) = self.store.get_deploy_config(namespace, name).await? {
                if insert_backup_label(&mut config.metadata) {
                    self.store.update_deploy_config(&config).await?;
                    labeled += 1;
                }
            }
        }

        if let Some(mut config) = self
            .store
            .get_klusterlet_config(KLUSTERLET_CONFIG_NAME)
            .await?
        {
            if insert_backup_label(&mut config.metadata) {
                self.store.update_klusterlet_config(&config).await?;
                labeled += 1;
            }
        }

        Ok(format!("backup label applied to {labeled} record(s)"))
    }
}

/// Add the backup label; false when it is already present
fn insert_backup_label(meta: &mut ObjectMeta) -> bool {
    let labels = meta.labels.get_or_insert_with(Default::default);
    if labels.get(BACKUP_LABEL_KEY).map(String::as_str) == Some(BACKUP_LABEL_VALUE) {
        return false;
    }
    labels.insert(BACKUP_LABEL_KEY.to_owned(), BACKUP_LABEL_VALUE.to_owned());
    true
}
