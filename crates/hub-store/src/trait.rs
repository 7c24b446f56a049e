//! HubStoreTrait for mocking
//!
//! Abstracts the hub's declarative store so reconcilers can be unit tested
//! against an in-memory implementation. The concrete [`crate::HubStore`]
//! implements this trait over the Kubernetes API.

use crds::{
    AddOnDeploymentConfig, ClusterManagementAddOn, ClusterServiceVersion, KlusterletConfig,
    ManagedCluster,
};
use k8s_openapi::api::core::v1::ConfigMap;

use crate::error::StoreError;

/// Typed store operations over the record kinds the controller touches.
///
/// Point reads return `Ok(None)` for absent records. Deletes of absent
/// records succeed. All async methods must be `Send` to work with Tokio's
/// work-stealing runtime.
#[async_trait::async_trait]
pub trait HubStoreTrait: Send + Sync {
    // Addon deployment configs (namespaced)
    async fn get_deploy_config(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AddOnDeploymentConfig>, StoreError>;
    async fn create_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError>;
    async fn update_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError>;
    async fn delete_deploy_config(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    // Cluster management addons (cluster-scoped)
    async fn get_cluster_addon(
        &self,
        name: &str,
    ) -> Result<Option<ClusterManagementAddOn>, StoreError>;
    async fn update_cluster_addon(
        &self,
        addon: &ClusterManagementAddOn,
    ) -> Result<ClusterManagementAddOn, StoreError>;

    // Klusterlet configs (cluster-scoped)
    async fn get_klusterlet_config(&self, name: &str)
        -> Result<Option<KlusterletConfig>, StoreError>;
    async fn create_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError>;
    async fn update_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError>;
    async fn delete_klusterlet_config(&self, name: &str) -> Result<(), StoreError>;

    // Managed clusters (cluster-scoped, read-only)
    async fn list_managed_clusters(&self) -> Result<Vec<ManagedCluster>, StoreError>;

    // Platform probe; may fail with `StoreError::CategoryNotRegistered`
    async fn list_service_versions(&self) -> Result<Vec<ClusterServiceVersion>, StoreError>;

    // Config maps (namespaced): info record and setup trigger
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError>;
    async fn create_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError>;
    async fn update_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError>;
}
