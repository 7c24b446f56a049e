//! Test utilities for unit testing the reconciler and orchestrator.
//!
//! This module provides helpers for creating test records and wiring the
//! mock store into reconciler/orchestrator instances.

use std::collections::BTreeMap;

use crds::{
    AddOnDeploymentConfig, AddOnDeploymentConfigSpec, ClusterManagementAddOn,
    ClusterManagementAddOnSpec, ClusterServiceVersion, ClusterServiceVersionSpec,
    CustomizedVariable, InstallStrategy, InstallStrategyType, ManagedCluster, ManagedClusterSpec,
    PlacementStrategy,
};
use hub_store::MockHubStore;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::config::Config;
use crate::names::{GLOBAL_PLACEMENT_NAME, MASTER_CONFIG_NAME, SETUP_TRIGGER_NAME};
use crate::orchestrator::Orchestrator;
use crate::reconciler::Reconciler;

/// Default test configuration (production namespaces, all gates open)
pub fn test_config() -> Config {
    Config::default()
}

/// Reconciler wired to a clone of the given mock store
pub fn reconciler_with(store: &MockHubStore) -> Reconciler {
    Reconciler::new(store.clone(), test_config())
}

/// Orchestrator wired to a clone of the given mock store
pub fn orchestrator_with(store: &MockHubStore) -> Orchestrator {
    Orchestrator::new(store.clone(), test_config())
}

/// Seed the platform probe so the environment classifies as governed
pub fn governed(store: &MockHubStore) {
    store.add_service_version(service_version("advanced-cluster-management.v2.9.0"));
}

/// Deployment config with the given variable bag
pub fn deploy_config(namespace: &str, name: &str, vars: &[(&str, &str)]) -> AddOnDeploymentConfig {
    AddOnDeploymentConfig {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        spec: AddOnDeploymentConfigSpec {
            agent_install_namespace: None,
            customized_variables: vars
                .iter()
                .map(|(n, v)| CustomizedVariable::new(*n, *v))
                .collect(),
        },
    }
}

/// The master config in its well-known namespace
pub fn master_config(vars: &[(&str, &str)]) -> AddOnDeploymentConfig {
    deploy_config(&test_config().acm_namespace, MASTER_CONFIG_NAME, vars)
}

/// Placement-strategy addon with one empty global placement
pub fn placement_addon(name: &str) -> ClusterManagementAddOn {
    ClusterManagementAddOn {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            ..Default::default()
        },
        spec: ClusterManagementAddOnSpec {
            add_on_meta: None,
            install_strategy: InstallStrategy {
                strategy_type: InstallStrategyType::Placements,
                placements: vec![PlacementStrategy {
                    name: GLOBAL_PLACEMENT_NAME.to_owned(),
                    namespace: test_config().policy_namespace,
                    configs: Vec::new(),
                }],
            },
            supported_configs: Vec::new(),
        },
    }
}

/// Addon with no placements and no supported configs
pub fn bare_addon(name: &str) -> ClusterManagementAddOn {
    ClusterManagementAddOn {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            ..Default::default()
        },
        spec: ClusterManagementAddOnSpec::default(),
    }
}

/// Managed cluster carrying the given annotations
pub fn managed_cluster(name: &str, annotations: &[(&str, &str)]) -> ManagedCluster {
    let annotations: BTreeMap<String, String> = annotations
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    ManagedCluster {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            annotations: (!annotations.is_empty()).then_some(annotations),
            ..Default::default()
        },
        spec: ManagedClusterSpec {
            hub_accepts_client: true,
        },
    }
}

/// Service-version record with the given name
pub fn service_version(name: &str) -> ClusterServiceVersion {
    ClusterServiceVersion {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some("open-cluster-management".to_owned()),
            ..Default::default()
        },
        spec: ClusterServiceVersionSpec::default(),
    }
}

/// Setup trigger record with the given data entries
pub fn trigger(data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(SETUP_TRIGGER_NAME.to_owned()),
            namespace: Some(test_config().acm_namespace),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        ),
        ..Default::default()
    }
}
