//! The best-effort undo pipeline.
//!
//! Reverse of setup in logical order. Every step records its own outcome
//! and the pipeline always runs to the end: the operator wants maximum
//! teardown even when individual steps hit transient gaps. The disable
//! safety precondition is not re-checked here; callers clear the klusterlet
//! annotations before requesting undo.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use crate::error::ControllerError;
use crate::names::{
    ADDON_CONFIG_GROUP, ADDON_CONFIG_RESOURCE, BACKUP_LABEL_KEY, DEFAULT_INSTALL_NAMESPACE,
    DISABLE_HO_MANAGEMENT_VARIABLE, DISABLE_METRICS_VARIABLE, KLUSTERLET_CONFIG_NAME,
    MASTER_CONFIG_NAME, NS_INSTALL_CONFIG_NAME, PLACEMENT_STRATEGY_ADDONS,
};

use super::results::StepTracker;
use super::Orchestrator;

impl Orchestrator {
    pub(super) async fn undo_pipeline(&self, tracker: &mut StepTracker) {
        // Failures are recorded by the tracker and deliberately not
        // propagated; teardown continues past them
        let _ = tracker
            .track("backup-labels", self.undo_backup_labels())
            .await;
        let _ = tracker
            .track("self-addon-config", self.undo_self_addon_config())
            .await;
        let _ = tracker
            .track("addon-config-references", self.undo_addon_config_refs())
            .await;
        let _ = tracker
            .track("namespace-install-config", self.undo_ns_install_config())
            .await;
        let _ = tracker
            .track("klusterlet-config", self.undo_klusterlet_config())
            .await;
    }

    async fn undo_backup_labels(&self) -> Result<String, ControllerError> {
        let namespace = &self.settings.acm_namespace;
        let mut removed = 0usize;

        for name in [NS_INSTALL_CONFIG_NAME, MASTER_CONFIG_NAME] {
            if let Some(mut config) = self.store.get_deploy_config(namespace, name).await? {
                if remove_backup_label(&mut config.metadata) {
                    self.store.update_deploy_config(&config).await?;
                    removed += 1;
                }
            }
        }

        if let Some(mut config) = self
            .store
            .get_klusterlet_config(KLUSTERLET_CONFIG_NAME)
            .await?
        {
            if remove_backup_label(&mut config.metadata) {
                self.store.update_klusterlet_config(&config).await?;
                removed += 1;
            }
        }

        Ok(format!("backup label removed from {removed} record(s)"))
    }

    /// Restore the self-addon's deployment config: default install
    /// namespace back, the two agent variables gone, the rest of the bag
    /// untouched.
    async fn undo_self_addon_config(&self) -> Result<String, ControllerError> {
        let namespace = &self.settings.acm_namespace;
        let Some(existing) = self
            .store
            .get_deploy_config(namespace, MASTER_CONFIG_NAME)
            .await?
        else {
            return Ok(format!("{MASTER_CONFIG_NAME} already absent"));
        };

        let mut desired = existing.clone();
        desired.spec.agent_install_namespace = Some(DEFAULT_INSTALL_NAMESPACE.to_owned());
        desired.spec.customized_variables.retain(|v| {
            v.name != DISABLE_METRICS_VARIABLE && v.name != DISABLE_HO_MANAGEMENT_VARIABLE
        });

        if desired.spec == existing.spec {
            Ok(format!("{MASTER_CONFIG_NAME} already restored"))
        } else {
            self.store.update_deploy_config(&desired).await?;
            Ok(format!("restored {MASTER_CONFIG_NAME}"))
        }
    }

    /// Strip the namespace-install config ref from every placement of every
    /// addon in the fixed list.
    async fn undo_addon_config_refs(&self) -> Result<String, ControllerError> {
        let mut detached = 0usize;
        for addon_name in PLACEMENT_STRATEGY_ADDONS {
            let Some(mut addon) = self.store.get_cluster_addon(addon_name).await? else {
                debug!("addon {} not installed, skipping", addon_name);
                continue;
            };

            let mut changed = false;
            for placement in &mut addon.spec.install_strategy.placements {
                let before = placement.configs.len();
                placement.configs.retain(|c| {
                    !(c.group == ADDON_CONFIG_GROUP
                        && c.resource == ADDON_CONFIG_RESOURCE
                        && c.name == NS_INSTALL_CONFIG_NAME)
                });
                changed |= placement.configs.len() != before;
            }

            if changed {
                self.store.update_cluster_addon(&addon).await?;
                detached += 1;
            }
        }
        Ok(format!("config ref removed from {detached} addon(s)"))
    }

    async fn undo_ns_install_config(&self) -> Result<String, ControllerError> {
        self.store
            .delete_deploy_config(&self.settings.acm_namespace, NS_INSTALL_CONFIG_NAME)
            .await?;
        Ok(format!("deleted {NS_INSTALL_CONFIG_NAME}"))
    }

    async fn undo_klusterlet_config(&self) -> Result<String, ControllerError> {
        self.store
            .delete_klusterlet_config(KLUSTERLET_CONFIG_NAME)
            .await?;
        Ok(format!("deleted {KLUSTERLET_CONFIG_NAME}"))
    }
}

/// Drop the backup label; false when it was not present
fn remove_backup_label(meta: &mut ObjectMeta) -> bool {
    match &mut meta.labels {
        Some(labels) => labels.remove(BACKUP_LABEL_KEY).is_some(),
        None => false,
    }
}
