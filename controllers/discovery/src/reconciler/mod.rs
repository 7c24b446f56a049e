//! Discovery configuration reconciliation.
//!
//! Drives the hub's configuration records toward the state the master
//! config asks for. Each invocation re-reads authoritative state, resolves
//! intent, projects a plan, and applies it step by step; every step is
//! idempotent, so partial failures converge on the next notification.

pub mod apply;
pub mod compare;
pub mod intent;
pub mod plan;

#[cfg(test)]
mod intent_test;
#[cfg(test)]
mod plan_test;

use crds::AddOnDeploymentConfig;
use hub_store::HubStoreTrait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ControllerError;
use crate::names::{KLUSTERLET_ANNOTATION_KEY, KLUSTERLET_CONFIG_NAME, MASTER_CONFIG_NAME};

use intent::{resolve, Environment, Intent};
use plan::{info_data, project};

/// Reconciles discovery-import configuration records.
pub struct Reconciler {
    pub(crate) store: Box<dyn HubStoreTrait>,
    pub(crate) settings: Config,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(store: impl HubStoreTrait + 'static, settings: Config) -> Self {
        Self {
            store: Box::new(store),
            settings,
        }
    }

    /// Reconcile one change notification for a deployment config.
    ///
    /// The notification only supplies the key; authoritative state is
    /// re-read from the store. Keys other than the master config in the
    /// configured namespace are ignored.
    pub async fn reconcile_deploy_config(
        &self,
        observed: &AddOnDeploymentConfig,
    ) -> Result<(), ControllerError> {
        let name = observed
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| ControllerError::InvalidConfig("deploy config missing name".to_owned()))?;
        let namespace = observed
            .metadata
            .namespace
            .as_deref()
            .unwrap_or(&self.settings.acm_namespace);

        if name != MASTER_CONFIG_NAME || namespace != self.settings.acm_namespace {
            debug!("ignoring deploy config {}/{}", namespace, name);
            return Ok(());
        }

        info!("Reconciling master config {}/{}", namespace, name);

        // Deleted while the notification was in flight: nothing to converge
        let Some(config) = self.store.get_deploy_config(namespace, name).await? else {
            debug!("master config {}/{} absent, nothing to do", namespace, name);
            return Ok(());
        };

        if intent::probe_environment(self.store.as_ref()).await? == Environment::Ungoverned {
            info!("governing platform not installed, skipping reconciliation");
            return Ok(());
        }

        let intent = resolve(&config);

        if intent == Intent::NoOp {
            self.ensure_info_record(&info_data(&config, intent)).await?;
            return Ok(());
        }

        if intent == Intent::Disable && !self.disable_allowed().await? {
            warn!(
                "refusing to disable discovery import: managed clusters still annotated with {}={}",
                KLUSTERLET_ANNOTATION_KEY, KLUSTERLET_CONFIG_NAME
            );
            self.ensure_info_record(&info_data(&config, intent)).await?;
            return Ok(());
        }

        let plan = project(intent, Environment::Governed, &config, &self.settings);
        self.apply_plan(&config, &plan).await?;

        info!(
            "master config {}/{} reconciled ({:?})",
            namespace, name, intent
        );
        Ok(())
    }

    /// Disable is forbidden while any managed cluster still opts into the
    /// import klusterlet config; tearing it down would strand those imports.
    async fn disable_allowed(&self) -> Result<bool, ControllerError> {
        let clusters = self.store.list_managed_clusters().await?;
        let blocked: Vec<&str> = clusters
            .iter()
            .filter(|c| c.annotation(KLUSTERLET_ANNOTATION_KEY) == Some(KLUSTERLET_CONFIG_NAME))
            .filter_map(|c| c.metadata.name.as_deref())
            .collect();
        if blocked.is_empty() {
            Ok(true)
        } else {
            warn!(
                "disable blocked by {} managed cluster(s): {}",
                blocked.len(),
                blocked.join(", ")
            );
            Ok(false)
        }
    }
}
