//! Contract tests for the mock hub store
//!
//! The reconciler's idempotence guarantees are only as good as the store
//! contract these tests pin down: revision tokens bump on every accepted
//! write, creates conflict on existing records, updates require existence,
//! and deletes of absent records succeed without counting as writes.

use crds::{
    AddOnDeploymentConfig, AddOnDeploymentConfigSpec, ClusterServiceVersion,
    ClusterServiceVersionSpec, CustomizedVariable,
};
use hub_store::{HubStoreTrait, MockHubStore, StoreError};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn deploy_config(namespace: &str, name: &str) -> AddOnDeploymentConfig {
    AddOnDeploymentConfig {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: AddOnDeploymentConfigSpec {
            agent_install_namespace: None,
            customized_variables: vec![CustomizedVariable::new("configureMceImport", "true")],
        },
    }
}

#[tokio::test]
async fn get_absent_record_is_none() {
    let store = MockHubStore::new();
    let got = store.get_deploy_config("ns", "missing").await.unwrap();
    assert!(got.is_none());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let store = MockHubStore::new();
    let created = store
        .create_deploy_config(&deploy_config("ns", "cfg"))
        .await
        .unwrap();
    assert!(created.metadata.resource_version.is_some());

    let got = store.get_deploy_config("ns", "cfg").await.unwrap().unwrap();
    assert_eq!(got.spec, created.spec);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn create_of_existing_record_conflicts() {
    let store = MockHubStore::new();
    store.add_deploy_config(deploy_config("ns", "cfg"));

    let err = store
        .create_deploy_config(&deploy_config("ns", "cfg"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn update_bumps_revision_token() {
    let store = MockHubStore::new();
    store.add_deploy_config(deploy_config("ns", "cfg"));
    let before = store
        .deploy_config("ns", "cfg")
        .unwrap()
        .metadata
        .resource_version;

    let mut changed = store.deploy_config("ns", "cfg").unwrap();
    changed
        .spec
        .customized_variables
        .push(CustomizedVariable::new("disableMetrics", "true"));
    let updated = store.update_deploy_config(&changed).await.unwrap();

    assert_ne!(updated.metadata.resource_version, before);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn update_of_absent_record_is_not_found() {
    let store = MockHubStore::new();
    let err = store
        .update_deploy_config(&deploy_config("ns", "missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = MockHubStore::new();
    store.add_deploy_config(deploy_config("ns", "cfg"));

    store.delete_deploy_config("ns", "cfg").await.unwrap();
    assert_eq!(store.write_count(), 1);
    assert!(store.deploy_config("ns", "cfg").is_none());

    // Second delete is success without a write
    store.delete_deploy_config("ns", "cfg").await.unwrap();
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn service_version_probe_distinguishes_unregistered_kind() {
    let store = MockHubStore::new();
    store.add_service_version(ClusterServiceVersion {
        metadata: ObjectMeta {
            name: Some("advanced-cluster-management.v2.9.0".to_string()),
            namespace: Some("open-cluster-management".to_string()),
            ..Default::default()
        },
        spec: ClusterServiceVersionSpec::default(),
    });
    assert_eq!(store.list_service_versions().await.unwrap().len(), 1);

    store.set_service_versions_unregistered(true);
    let err = store.list_service_versions().await.unwrap_err();
    assert!(matches!(err, StoreError::CategoryNotRegistered(_)));
}

#[tokio::test]
async fn injected_failures_hit_the_named_operation_only() {
    let store = MockHubStore::new();
    store.fail_on("create_config_map");

    let map = k8s_openapi::api::core::v1::ConfigMap {
        metadata: ObjectMeta {
            name: Some("trigger".to_string()),
            namespace: Some("ns".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = store.create_config_map(&map).await.unwrap_err();
    assert!(matches!(err, StoreError::Transient(_)));

    // Unrelated operations still succeed
    store
        .create_deploy_config(&deploy_config("ns", "cfg"))
        .await
        .unwrap();

    store.clear_failures();
    store.create_config_map(&map).await.unwrap();
}
