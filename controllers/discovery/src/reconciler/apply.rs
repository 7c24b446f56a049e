//! Plan application.
//!
//! Applies a projected plan in a fixed order, each step idempotent:
//!   a. master config amendment
//!   b. namespace-install config create-or-update / delete-if-present
//!   c. placement-strategy addon config refs
//!   d. manual-strategy addon supported-config defaults
//!   e. klusterlet config create-or-update / delete-if-present
//!   f. info record create-or-update
//!
//! Master first so the intent on disk has moved even if a later step dies;
//! on enable referrers come after the referent, on disable referrers are
//! cleaned before the referent is removed.

use std::collections::BTreeMap;

use crds::{
    AddOnConfig, AddOnDeploymentConfig, AddOnDeploymentConfigSpec, ConfigMeta, ConfigReferent,
    CustomizedVariable, InstallStrategyType, KlusterletConfig, KlusterletConfigSpec,
};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, info};

use crate::error::ControllerError;
use crate::names::{
    ADDON_CONFIG_GROUP, ADDON_CONFIG_RESOURCE, INFO_RECORD_NAME, KLUSTERLET_CONFIG_NAME,
    NS_INSTALL_CONFIG_NAME,
};

use super::compare::equal_string_map;
use super::intent::Intent;
use super::plan::{AddonAttachment, MasterAmendment, Plan};
use super::Reconciler;

impl Reconciler {
    /// Apply every step of the plan in order; the first failure aborts and
    /// the next notification re-runs from the top.
    pub(crate) async fn apply_plan(
        &self,
        observed_master: &AddOnDeploymentConfig,
        plan: &Plan,
    ) -> Result<(), ControllerError> {
        let ensure = plan.intent == Intent::Enable;

        self.amend_master_config(observed_master, &plan.master_amendment)
            .await?;

        // Referent before referrers on enable; referrers cleaned before the
        // referent disappears on disable
        match &plan.ns_install_config {
            Some(spec) => {
                self.ensure_ns_install_config(spec).await?;
                self.apply_attachments(&plan.attachments, ensure).await?;
            }
            None => {
                self.apply_attachments(&plan.attachments, ensure).await?;
                self.store
                    .delete_deploy_config(&self.settings.acm_namespace, NS_INSTALL_CONFIG_NAME)
                    .await?;
            }
        }

        match &plan.klusterlet_config {
            Some(spec) => self.ensure_klusterlet_config(spec).await?,
            None => {
                self.store
                    .delete_klusterlet_config(KLUSTERLET_CONFIG_NAME)
                    .await?;
            }
        }

        if let Some(info) = &plan.info {
            self.ensure_info_record(info).await?;
        }

        Ok(())
    }

    /// Steps (c) and (d): dispatch each projected attachment variant.
    async fn apply_attachments(
        &self,
        attachments: &[AddonAttachment],
        ensure: bool,
    ) -> Result<(), ControllerError> {
        for attachment in attachments {
            match attachment {
                AddonAttachment::Placement {
                    addon,
                    placement_name,
                    placement_namespace,
                } => {
                    self.apply_placement_attachment(
                        addon,
                        placement_name,
                        placement_namespace,
                        ensure,
                    )
                    .await?;
                }
                AddonAttachment::Manual { addon } => {
                    self.apply_manual_attachment(addon, ensure).await?;
                }
            }
        }
        Ok(())
    }

    /// Step (a): converge the master config's install namespace and
    /// variable bag. Writes only when the spec actually changes.
    async fn amend_master_config(
        &self,
        observed: &AddOnDeploymentConfig,
        amendment: &MasterAmendment,
    ) -> Result<(), ControllerError> {
        let mut desired = observed.clone();
        desired.spec.agent_install_namespace = Some(amendment.install_namespace.clone());
        desired
            .spec
            .customized_variables
            .retain(|v| !amendment.remove_variables.contains(&v.name));
        for variable in &amendment.add_variables {
            upsert_variable(&mut desired.spec.customized_variables, variable);
        }

        if desired.spec == observed.spec {
            debug!("master config already amended, skipping write");
            return Ok(());
        }

        self.store.update_deploy_config(&desired).await?;
        info!("amended master config variable bag and install namespace");
        Ok(())
    }

    /// Step (b), enable direction: namespace-install config present with
    /// the mandated content. Existing metadata (labels included) survives.
    async fn ensure_ns_install_config(
        &self,
        spec: &AddOnDeploymentConfigSpec,
    ) -> Result<(), ControllerError> {
        let namespace = &self.settings.acm_namespace;
        match self
            .store
            .get_deploy_config(namespace, NS_INSTALL_CONFIG_NAME)
            .await?
        {
            Some(existing) if existing.spec == *spec => {
                debug!("{} up to date", NS_INSTALL_CONFIG_NAME);
            }
            Some(mut existing) => {
                existing.spec = spec.clone();
                self.store.update_deploy_config(&existing).await?;
                info!("updated {}", NS_INSTALL_CONFIG_NAME);
            }
            None => {
                let config = AddOnDeploymentConfig {
                    metadata: ObjectMeta {
                        name: Some(NS_INSTALL_CONFIG_NAME.to_owned()),
                        namespace: Some(namespace.clone()),
                        ..Default::default()
                    },
                    spec: spec.clone(),
                };
                self.store.create_deploy_config(&config).await?;
                info!("created {}", NS_INSTALL_CONFIG_NAME);
            }
        }
        Ok(())
    }

    /// Steps (c): converge the config ref inside one named placement of a
    /// placement-strategy addon. A missing addon or placement is skipped;
    /// the fleet may not run every addon.
    async fn apply_placement_attachment(
        &self,
        addon_name: &str,
        placement_name: &str,
        placement_namespace: &str,
        ensure: bool,
    ) -> Result<(), ControllerError> {
        let Some(mut addon) = self.store.get_cluster_addon(addon_name).await? else {
            debug!("addon {} not installed, skipping", addon_name);
            return Ok(());
        };

        let config_ref = self.ns_install_config_ref();
        let Some(placement) = addon
            .spec
            .install_strategy
            .placements
            .iter_mut()
            .find(|p| p.name == placement_name && p.namespace == placement_namespace)
        else {
            debug!(
                "addon {} has no placement {}/{}, skipping",
                addon_name, placement_namespace, placement_name
            );
            return Ok(());
        };

        // Rebuild the ref list: strip every matching ref, re-add exactly one
        // when enabling. Also collapses accidental duplicates.
        let mut configs: Vec<AddOnConfig> = placement
            .configs
            .iter()
            .filter(|c| **c != config_ref)
            .cloned()
            .collect();
        if ensure {
            configs.push(config_ref);
        }

        if configs == placement.configs {
            debug!("addon {} placement refs up to date", addon_name);
            return Ok(());
        }

        placement.configs = configs;
        self.store.update_cluster_addon(&addon).await?;
        info!(
            "{} config ref on addon {} placement {}/{}",
            if ensure { "attached" } else { "detached" },
            addon_name,
            placement_namespace,
            placement_name
        );
        Ok(())
    }

    /// Steps (d): force a manual-strategy addon to manual install with the
    /// namespace-install config as its supported-config default (enable) or
    /// with that default removed (disable).
    async fn apply_manual_attachment(
        &self,
        addon_name: &str,
        ensure: bool,
    ) -> Result<(), ControllerError> {
        let Some(addon) = self.store.get_cluster_addon(addon_name).await? else {
            debug!("addon {} not installed, skipping", addon_name);
            return Ok(());
        };

        let referent = ConfigReferent {
            name: NS_INSTALL_CONFIG_NAME.to_owned(),
            namespace: Some(self.settings.acm_namespace.clone()),
        };

        let mut desired = addon.clone();
        desired.spec.install_strategy.strategy_type = InstallStrategyType::Manual;
        desired.spec.install_strategy.placements.clear();

        if ensure {
            if let Some(meta) = desired
                .spec
                .supported_configs
                .iter_mut()
                .find(|m| m.group == ADDON_CONFIG_GROUP && m.resource == ADDON_CONFIG_RESOURCE)
            {
                meta.default_config = Some(referent);
            } else {
                desired.spec.supported_configs.push(ConfigMeta {
                    group: ADDON_CONFIG_GROUP.to_owned(),
                    resource: ADDON_CONFIG_RESOURCE.to_owned(),
                    default_config: Some(referent),
                });
            }
        } else {
            for meta in &mut desired.spec.supported_configs {
                if meta.group == ADDON_CONFIG_GROUP
                    && meta.resource == ADDON_CONFIG_RESOURCE
                    && meta.default_config.as_ref() == Some(&referent)
                {
                    meta.default_config = None;
                }
            }
        }

        if desired.spec == addon.spec {
            debug!("addon {} manual strategy up to date", addon_name);
            return Ok(());
        }

        self.store.update_cluster_addon(&desired).await?;
        info!(
            "{} supported-config default on manual addon {}",
            if ensure { "set" } else { "removed" },
            addon_name
        );
        Ok(())
    }

    /// Step (e), enable direction: klusterlet config present with the
    /// desired install-mode tree. Nested comparison decides whether the
    /// write happens.
    async fn ensure_klusterlet_config(
        &self,
        spec: &KlusterletConfigSpec,
    ) -> Result<(), ControllerError> {
        match self
            .store
            .get_klusterlet_config(KLUSTERLET_CONFIG_NAME)
            .await?
        {
            Some(existing) if existing.spec == *spec => {
                debug!("{} up to date", KLUSTERLET_CONFIG_NAME);
            }
            Some(mut existing) => {
                existing.spec = spec.clone();
                self.store.update_klusterlet_config(&existing).await?;
                info!("updated {}", KLUSTERLET_CONFIG_NAME);
            }
            None => {
                let config = KlusterletConfig {
                    metadata: ObjectMeta {
                        name: Some(KLUSTERLET_CONFIG_NAME.to_owned()),
                        ..Default::default()
                    },
                    spec: spec.clone(),
                };
                self.store.create_klusterlet_config(&config).await?;
                info!("created {}", KLUSTERLET_CONFIG_NAME);
            }
        }
        Ok(())
    }

    /// Step (f): info record mirrors the master config. Runs on every
    /// reconciliation, including no-op and refused-disable paths.
    pub(crate) async fn ensure_info_record(
        &self,
        data: &BTreeMap<String, String>,
    ) -> Result<(), ControllerError> {
        let namespace = &self.settings.acm_namespace;
        match self.store.get_config_map(namespace, INFO_RECORD_NAME).await? {
            Some(existing) if equal_string_map(existing.data.as_ref(), Some(data)) => {
                debug!("info record up to date");
            }
            Some(mut existing) => {
                existing.data = Some(data.clone());
                self.store.update_config_map(&existing).await?;
                info!("refreshed info record {}", INFO_RECORD_NAME);
            }
            None => {
                let map = ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(INFO_RECORD_NAME.to_owned()),
                        namespace: Some(namespace.clone()),
                        ..Default::default()
                    },
                    data: Some(data.clone()),
                    ..Default::default()
                };
                self.store.create_config_map(&map).await?;
                info!("created info record {}", INFO_RECORD_NAME);
            }
        }
        Ok(())
    }

    /// The ref every placement-strategy addon carries while enabled
    pub(crate) fn ns_install_config_ref(&self) -> AddOnConfig {
        AddOnConfig {
            group: ADDON_CONFIG_GROUP.to_owned(),
            resource: ADDON_CONFIG_RESOURCE.to_owned(),
            name: NS_INSTALL_CONFIG_NAME.to_owned(),
            namespace: Some(self.settings.acm_namespace.clone()),
        }
    }
}

/// Insert or overwrite one variable in a bag, preserving order otherwise
fn upsert_variable(bag: &mut Vec<CustomizedVariable>, variable: &CustomizedVariable) {
    if let Some(existing) = bag.iter_mut().find(|v| v.name == variable.name) {
        existing.value = variable.value.clone();
    } else {
        bag.push(variable.clone());
    }
}
