//! Mock hub store for unit testing
//!
//! In-memory implementation of [`HubStoreTrait`] so reconciler and
//! orchestrator logic can be exercised without a cluster. The mock mimics
//! the store's observable contract: revision tokens bump on every accepted
//! write, creates of existing records conflict, updates of absent records
//! are not found, and deletes of absent records succeed.
//!
//! A total write counter lets idempotence tests assert "zero writes" after a
//! converged reconciliation, and named failure injection drives the pipeline
//! failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crds::{
    AddOnDeploymentConfig, ClusterManagementAddOn, ClusterServiceVersion, KlusterletConfig,
    ManagedCluster,
};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::error::StoreError;
use crate::store_trait::HubStoreTrait;

type Key = (String, String);

/// In-memory hub store for testing
#[derive(Clone, Default)]
pub struct MockHubStore {
    deploy_configs: Arc<Mutex<HashMap<Key, AddOnDeploymentConfig>>>,
    cluster_addons: Arc<Mutex<HashMap<String, ClusterManagementAddOn>>>,
    klusterlet_configs: Arc<Mutex<HashMap<String, KlusterletConfig>>>,
    managed_clusters: Arc<Mutex<Vec<ManagedCluster>>>,
    service_versions: Arc<Mutex<Vec<ClusterServiceVersion>>>,
    config_maps: Arc<Mutex<HashMap<Key, ConfigMap>>>,
    service_versions_unregistered: Arc<Mutex<bool>>,
    fail_ops: Arc<Mutex<HashSet<String>>>,
    next_revision: Arc<Mutex<u64>>,
    writes: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHubStore")
            .field("writes", &self.write_count())
            .finish_non_exhaustive()
    }
}

fn key_of(meta: &ObjectMeta) -> Key {
    (
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

impl MockHubStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a deployment config (for test setup; does not count as a write)
    pub fn add_deploy_config(&self, config: AddOnDeploymentConfig) {
        let mut config = config;
        self.stamp(&mut config.metadata);
        self.deploy_configs
            .lock()
            .unwrap()
            .insert(key_of(&config.metadata), config);
    }

    /// Seed a cluster management addon
    pub fn add_cluster_addon(&self, addon: ClusterManagementAddOn) {
        let mut addon = addon;
        self.stamp(&mut addon.metadata);
        let name = addon.metadata.name.clone().unwrap_or_default();
        self.cluster_addons.lock().unwrap().insert(name, addon);
    }

    /// Seed a klusterlet config
    pub fn add_klusterlet_config(&self, config: KlusterletConfig) {
        let mut config = config;
        self.stamp(&mut config.metadata);
        let name = config.metadata.name.clone().unwrap_or_default();
        self.klusterlet_configs.lock().unwrap().insert(name, config);
    }

    /// Seed a managed cluster
    pub fn add_managed_cluster(&self, cluster: ManagedCluster) {
        self.managed_clusters.lock().unwrap().push(cluster);
    }

    /// Seed a service-version record for the platform probe
    pub fn add_service_version(&self, csv: ClusterServiceVersion) {
        self.service_versions.lock().unwrap().push(csv);
    }

    /// Seed a config map
    pub fn add_config_map(&self, map: ConfigMap) {
        let mut map = map;
        self.stamp(&mut map.metadata);
        self.config_maps
            .lock()
            .unwrap()
            .insert(key_of(&map.metadata), map);
    }

    /// Make the service-version list fail as an unregistered kind
    pub fn set_service_versions_unregistered(&self, unregistered: bool) {
        *self.service_versions_unregistered.lock().unwrap() = unregistered;
    }

    /// Inject a transient failure for the named operation
    /// (e.g. `"create_deploy_config"`)
    pub fn fail_on(&self, operation: &str) {
        self.fail_ops.lock().unwrap().insert(operation.to_owned());
    }

    /// Clear all injected failures
    pub fn clear_failures(&self) {
        self.fail_ops.lock().unwrap().clear();
    }

    /// Total accepted writes since construction
    pub fn write_count(&self) -> u64 {
        *self.writes.lock().unwrap()
    }

    /// Current deployment config, if present
    pub fn deploy_config(&self, namespace: &str, name: &str) -> Option<AddOnDeploymentConfig> {
        self.deploy_configs
            .lock()
            .unwrap()
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
    }

    /// Current cluster addon, if present
    pub fn cluster_addon(&self, name: &str) -> Option<ClusterManagementAddOn> {
        self.cluster_addons.lock().unwrap().get(name).cloned()
    }

    /// Current klusterlet config, if present
    pub fn klusterlet_config(&self, name: &str) -> Option<KlusterletConfig> {
        self.klusterlet_configs.lock().unwrap().get(name).cloned()
    }

    /// Current config map, if present
    pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.config_maps
            .lock()
            .unwrap()
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
    }

    fn stamp(&self, meta: &mut ObjectMeta) {
        let mut rev = self.next_revision.lock().unwrap();
        *rev += 1;
        meta.resource_version = Some(rev.to_string());
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }

    fn check_failure(&self, operation: &str) -> Result<(), StoreError> {
        if self.fail_ops.lock().unwrap().contains(operation) {
            return Err(StoreError::Transient(format!(
                "injected failure: {operation}"
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HubStoreTrait for MockHubStore {
    async fn get_deploy_config(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AddOnDeploymentConfig>, StoreError> {
        self.check_failure("get_deploy_config")?;
        Ok(self.deploy_config(namespace, name))
    }

    async fn create_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError> {
        self.check_failure("create_deploy_config")?;
        let key = key_of(&config.metadata);
        let mut records = self.deploy_configs.lock().unwrap();
        if records.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "AddOnDeploymentConfig {}/{} already exists",
                key.0, key.1
            )));
        }
        let mut stored = config.clone();
        self.stamp(&mut stored.metadata);
        records.insert(key, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn update_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError> {
        self.check_failure("update_deploy_config")?;
        let key = key_of(&config.metadata);
        let mut records = self.deploy_configs.lock().unwrap();
        if !records.contains_key(&key) {
            return Err(StoreError::NotFound(format!(
                "AddOnDeploymentConfig {}/{}",
                key.0, key.1
            )));
        }
        let mut stored = config.clone();
        self.stamp(&mut stored.metadata);
        records.insert(key, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn delete_deploy_config(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.check_failure("delete_deploy_config")?;
        let key = (namespace.to_owned(), name.to_owned());
        if self.deploy_configs.lock().unwrap().remove(&key).is_some() {
            self.record_write();
        }
        Ok(())
    }

    async fn get_cluster_addon(
        &self,
        name: &str,
    ) -> Result<Option<ClusterManagementAddOn>, StoreError> {
        self.check_failure("get_cluster_addon")?;
        Ok(self.cluster_addon(name))
    }

    async fn update_cluster_addon(
        &self,
        addon: &ClusterManagementAddOn,
    ) -> Result<ClusterManagementAddOn, StoreError> {
        self.check_failure("update_cluster_addon")?;
        let name = addon.metadata.name.clone().unwrap_or_default();
        let mut records = self.cluster_addons.lock().unwrap();
        if !records.contains_key(&name) {
            return Err(StoreError::NotFound(format!("ClusterManagementAddOn {name}")));
        }
        let mut stored = addon.clone();
        self.stamp(&mut stored.metadata);
        records.insert(name, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn get_klusterlet_config(
        &self,
        name: &str,
    ) -> Result<Option<KlusterletConfig>, StoreError> {
        self.check_failure("get_klusterlet_config")?;
        Ok(self.klusterlet_config(name))
    }

    async fn create_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError> {
        self.check_failure("create_klusterlet_config")?;
        let name = config.metadata.name.clone().unwrap_or_default();
        let mut records = self.klusterlet_configs.lock().unwrap();
        if records.contains_key(&name) {
            return Err(StoreError::Conflict(format!(
                "KlusterletConfig {name} already exists"
            )));
        }
        let mut stored = config.clone();
        self.stamp(&mut stored.metadata);
        records.insert(name, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn update_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError> {
        self.check_failure("update_klusterlet_config")?;
        let name = config.metadata.name.clone().unwrap_or_default();
        let mut records = self.klusterlet_configs.lock().unwrap();
        if !records.contains_key(&name) {
            return Err(StoreError::NotFound(format!("KlusterletConfig {name}")));
        }
        let mut stored = config.clone();
        self.stamp(&mut stored.metadata);
        records.insert(name, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn delete_klusterlet_config(&self, name: &str) -> Result<(), StoreError> {
        self.check_failure("delete_klusterlet_config")?;
        if self
            .klusterlet_configs
            .lock()
            .unwrap()
            .remove(name)
            .is_some()
        {
            self.record_write();
        }
        Ok(())
    }

    async fn list_managed_clusters(&self) -> Result<Vec<ManagedCluster>, StoreError> {
        self.check_failure("list_managed_clusters")?;
        Ok(self.managed_clusters.lock().unwrap().clone())
    }

    async fn list_service_versions(&self) -> Result<Vec<ClusterServiceVersion>, StoreError> {
        self.check_failure("list_service_versions")?;
        if *self.service_versions_unregistered.lock().unwrap() {
            return Err(StoreError::CategoryNotRegistered(
                "clusterserviceversions".to_owned(),
            ));
        }
        Ok(self.service_versions.lock().unwrap().clone())
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError> {
        self.check_failure("get_config_map")?;
        Ok(self.config_map(namespace, name))
    }

    async fn create_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.check_failure("create_config_map")?;
        let key = key_of(&map.metadata);
        let mut records = self.config_maps.lock().unwrap();
        if records.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "ConfigMap {}/{} already exists",
                key.0, key.1
            )));
        }
        let mut stored = map.clone();
        self.stamp(&mut stored.metadata);
        records.insert(key, stored.clone());
        self.record_write();
        Ok(stored)
    }

    async fn update_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.check_failure("update_config_map")?;
        let key = key_of(&map.metadata);
        let mut records = self.config_maps.lock().unwrap();
        if !records.contains_key(&key) {
            return Err(StoreError::NotFound(format!(
                "ConfigMap {}/{}",
                key.0, key.1
            )));
        }
        let mut stored = map.clone();
        self.stamp(&mut stored.metadata);
        records.insert(key, stored.clone());
        self.record_write();
        Ok(stored)
    }
}
