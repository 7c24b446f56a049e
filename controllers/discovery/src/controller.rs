//! Main controller implementation.
//!
//! This module contains the `Controller` struct that spawns the watch loops
//! for the discovery reconciler and the setup orchestrator, honoring the
//! feature gates, and supervises them until one exits.

use std::sync::Arc;

use crds::AddOnDeploymentConfig;
use hub_store::HubStore;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ControllerError;
use crate::orchestrator::Orchestrator;
use crate::reconciler::Reconciler;
use crate::watcher;

/// Main controller for discovery configuration management.
pub struct Controller {
    watchers: Vec<JoinHandle<Result<(), ControllerError>>>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(settings: Config) -> Result<Self, ControllerError> {
        info!("Initializing discovery controller");

        let client = Client::try_default().await?;
        let mut watchers = Vec::new();

        if settings.discovery_enabled {
            let api: Api<AddOnDeploymentConfig> =
                Api::namespaced(client.clone(), &settings.acm_namespace);
            let reconciler = Arc::new(Reconciler::new(
                HubStore::new(client.clone()),
                settings.clone(),
            ));
            watchers.push(tokio::spawn(async move {
                watcher::watch_master_config(api, reconciler).await
            }));
        } else {
            info!("discovery reconciler disabled by ENABLE_MCE_DISCOVERY");
        }

        if settings.hub_setup_enabled {
            let api: Api<ConfigMap> = Api::namespaced(client.clone(), &settings.acm_namespace);
            let orchestrator = Arc::new(Orchestrator::new(
                HubStore::new(client.clone()),
                settings.clone(),
            ));
            watchers.push(tokio::spawn(async move {
                watcher::watch_setup_trigger(api, orchestrator).await
            }));
        } else {
            info!("setup orchestrator disabled by ENABLE_ACM_HUB_SETUP");
        }

        Ok(Self { watchers })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        if self.watchers.is_empty() {
            warn!("all watchers disabled by feature gates, nothing to run");
            return Ok(());
        }

        info!("Discovery controller running");

        // Watchers run forever; the first one to exit takes the process down
        let (result, _index, _remaining) = futures::future::select_all(self.watchers).await;
        result.map_err(|e| ControllerError::Watch(format!("watcher panicked: {e}")))?
    }
}
