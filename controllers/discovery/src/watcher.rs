//! Kubernetes resource watchers.
//!
//! This module wires change notifications to the reconciler and the
//! orchestrator using `kube_runtime::Controller`. Each watcher pins its
//! watch to the single named record it cares about via a field selector;
//! the named-key filter is re-checked inside the reconcile entry points.
//!
//! The generic `watch_resource()` helper handles the reconcile loop with
//! automatic reconnection and retry for both watchers at once.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crds::AddOnDeploymentConfig;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Api;
use kube_runtime::{
    controller::{Action, Config as ControllerConfig},
    watcher, Controller,
};
use tracing::{debug, error, info};

use crate::error::ControllerError;
use crate::names::{MASTER_CONFIG_NAME, SETUP_TRIGGER_NAME};
use crate::orchestrator::Orchestrator;
use crate::reconciler::Reconciler;

/// Generic watcher helper over `kube_runtime::Controller`.
///
/// - Automatic reconnection and watch re-establishment
/// - Requeue-with-delay on reconcile errors (the reconcilers themselves
///   never retry internally)
/// - Debounce batches bursts of notifications for the same record
/// - Concurrency 1: each watcher serves exactly one named key, so serial
///   execution preserves the at-most-one-in-flight contract
async fn watch_resource<K, Ctx, F>(
    api: Api<K>,
    watcher_config: watcher::Config,
    context: Arc<Ctx>,
    reconcile_fn: F,
    resource_name: &'static str,
) -> Result<(), ControllerError>
where
    K: kube::Resource
        + Clone
        + Send
        + Sync
        + 'static
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
    K::DynamicType: Default + std::cmp::Eq + std::hash::Hash + Clone + std::fmt::Debug + Unpin,
    Ctx: Send + Sync + 'static,
    F: Fn(
            Arc<Ctx>,
            Arc<K>,
        ) -> Pin<Box<dyn Future<Output = Result<Action, ControllerError>> + Send>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    info!("Starting {} watcher", resource_name);

    let error_policy = move |_obj: Arc<K>, error: &ControllerError, _ctx: Arc<Ctx>| {
        error!("Reconciliation error for {}: {}", resource_name, error);
        Action::requeue(Duration::from_secs(60))
    };

    let reconcile = move |obj: Arc<K>, ctx: Arc<Ctx>| {
        let reconcile_fn = reconcile_fn.clone();
        async move {
            debug!("Reconciling {}", resource_name);
            match reconcile_fn(ctx, obj).await {
                Ok(action) => Ok(action),
                Err(e) => {
                    error!("Reconciliation failed for {}: {}", resource_name, e);
                    Err(e)
                }
            }
        }
    };

    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(1);

    Controller::new(api, watcher_config)
        .with_config(controller_config)
        .run(reconcile, error_policy, context)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for {}: {}", resource_name, e);
            }
        })
        .await;

    Ok(())
}

/// Watch the master deployment config and drive the discovery reconciler.
pub async fn watch_master_config(
    api: Api<AddOnDeploymentConfig>,
    reconciler: Arc<Reconciler>,
) -> Result<(), ControllerError> {
    let watcher_config =
        watcher::Config::default().fields(&format!("metadata.name={MASTER_CONFIG_NAME}"));
    watch_resource(
        api,
        watcher_config,
        reconciler,
        |ctx, obj| {
            Box::pin(async move {
                ctx.reconcile_deploy_config(obj.as_ref()).await?;
                Ok(Action::await_change())
            })
        },
        "AddOnDeploymentConfig",
    )
    .await
}

/// Watch the setup trigger record and drive the orchestrator.
pub async fn watch_setup_trigger(
    api: Api<ConfigMap>,
    orchestrator: Arc<Orchestrator>,
) -> Result<(), ControllerError> {
    let watcher_config =
        watcher::Config::default().fields(&format!("metadata.name={SETUP_TRIGGER_NAME}"));
    watch_resource(
        api,
        watcher_config,
        orchestrator,
        |ctx, obj| {
            Box::pin(async move {
                ctx.reconcile_trigger(obj.as_ref()).await?;
                Ok(Action::await_change())
            })
        },
        "SetupTrigger",
    )
    .await
}
