//! Kubernetes-backed hub store
//!
//! Implements [`HubStoreTrait`] over `kube::Api`, building a typed `Api`
//! handle per call from one shared client. Error mapping: HTTP 404 on point
//! reads is absence (`Ok(None)`), 404 on writes is `NotFound`, 409 is
//! `Conflict`, and a 404 while listing service-version records means the
//! kind's API category is absent on this hub (`CategoryNotRegistered`).

use crds::{
    AddOnDeploymentConfig, ClusterManagementAddOn, ClusterServiceVersion, KlusterletConfig,
    ManagedCluster,
};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};
use tracing::debug;

use crate::error::StoreError;
use crate::store_trait::HubStoreTrait;

/// Hub store backed by the Kubernetes API
#[derive(Clone)]
pub struct HubStore {
    client: Client,
}

impl std::fmt::Debug for HubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubStore").finish_non_exhaustive()
    }
}

impl HubStore {
    /// Wrap an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a store from the in-cluster / kubeconfig default configuration
    pub async fn try_default() -> Result<Self, StoreError> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn cluster<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::ClusterResourceScope, DynamicType = ()>,
    {
        Api::all(self.client.clone())
    }
}

/// Map a kube error from a write path to a store error
fn classify(err: kube::Error, what: &str) -> StoreError {
    match err {
        kube::Error::Api(ref resp) if resp.code == 404 => StoreError::NotFound(what.to_owned()),
        kube::Error::Api(ref resp) if resp.code == 409 => StoreError::Conflict(what.to_owned()),
        other => StoreError::Api(other),
    }
}

fn require_name<'a>(meta: &'a ObjectMeta, kind: &str) -> Result<&'a str, StoreError> {
    meta.name
        .as_deref()
        .ok_or_else(|| StoreError::InvalidRecord(format!("{kind} record has no name")))
}

fn require_namespace<'a>(meta: &'a ObjectMeta, kind: &str) -> Result<&'a str, StoreError> {
    meta.namespace
        .as_deref()
        .ok_or_else(|| StoreError::InvalidRecord(format!("{kind} record has no namespace")))
}

#[async_trait::async_trait]
impl HubStoreTrait for HubStore {
    async fn get_deploy_config(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<AddOnDeploymentConfig>, StoreError> {
        let api: Api<AddOnDeploymentConfig> = self.namespaced(namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError> {
        let name = require_name(&config.metadata, "AddOnDeploymentConfig")?;
        let namespace = require_namespace(&config.metadata, "AddOnDeploymentConfig")?;
        let api: Api<AddOnDeploymentConfig> = self.namespaced(namespace);
        api.create(&PostParams::default(), config)
            .await
            .map_err(|e| classify(e, &format!("AddOnDeploymentConfig {namespace}/{name}")))
    }

    async fn update_deploy_config(
        &self,
        config: &AddOnDeploymentConfig,
    ) -> Result<AddOnDeploymentConfig, StoreError> {
        let name = require_name(&config.metadata, "AddOnDeploymentConfig")?;
        let namespace = require_namespace(&config.metadata, "AddOnDeploymentConfig")?;
        let api: Api<AddOnDeploymentConfig> = self.namespaced(namespace);
        api.replace(name, &PostParams::default(), config)
            .await
            .map_err(|e| classify(e, &format!("AddOnDeploymentConfig {namespace}/{name}")))
    }

    async fn delete_deploy_config(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let api: Api<AddOnDeploymentConfig> = self.namespaced(namespace);
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            // Delete-if-present: a record that is already gone is success
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                debug!("AddOnDeploymentConfig {}/{} already absent", namespace, name);
                Ok(())
            }
            Err(e) => Err(StoreError::Api(e)),
        }
    }

    async fn get_cluster_addon(
        &self,
        name: &str,
    ) -> Result<Option<ClusterManagementAddOn>, StoreError> {
        let api: Api<ClusterManagementAddOn> = self.cluster();
        Ok(api.get_opt(name).await?)
    }

    async fn update_cluster_addon(
        &self,
        addon: &ClusterManagementAddOn,
    ) -> Result<ClusterManagementAddOn, StoreError> {
        let name = require_name(&addon.metadata, "ClusterManagementAddOn")?;
        let api: Api<ClusterManagementAddOn> = self.cluster();
        api.replace(name, &PostParams::default(), addon)
            .await
            .map_err(|e| classify(e, &format!("ClusterManagementAddOn {name}")))
    }

    async fn get_klusterlet_config(
        &self,
        name: &str,
    ) -> Result<Option<KlusterletConfig>, StoreError> {
        let api: Api<KlusterletConfig> = self.cluster();
        Ok(api.get_opt(name).await?)
    }

    async fn create_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError> {
        let name = require_name(&config.metadata, "KlusterletConfig")?;
        let api: Api<KlusterletConfig> = self.cluster();
        api.create(&PostParams::default(), config)
            .await
            .map_err(|e| classify(e, &format!("KlusterletConfig {name}")))
    }

    async fn update_klusterlet_config(
        &self,
        config: &KlusterletConfig,
    ) -> Result<KlusterletConfig, StoreError> {
        let name = require_name(&config.metadata, "KlusterletConfig")?;
        let api: Api<KlusterletConfig> = self.cluster();
        api.replace(name, &PostParams::default(), config)
            .await
            .map_err(|e| classify(e, &format!("KlusterletConfig {name}")))
    }

    async fn delete_klusterlet_config(&self, name: &str) -> Result<(), StoreError> {
        let api: Api<KlusterletConfig> = self.cluster();
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                debug!("KlusterletConfig {} already absent", name);
                Ok(())
            }
            Err(e) => Err(StoreError::Api(e)),
        }
    }

    async fn list_managed_clusters(&self) -> Result<Vec<ManagedCluster>, StoreError> {
        let api: Api<ManagedCluster> = self.cluster();
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_service_versions(&self) -> Result<Vec<ClusterServiceVersion>, StoreError> {
        let api: Api<ClusterServiceVersion> = Api::all(self.client.clone());
        match api.list(&ListParams::default()).await {
            Ok(list) => Ok(list.items),
            // The kind's API group is not served on hubs without the
            // operator lifecycle machinery
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(
                StoreError::CategoryNotRegistered("clusterserviceversions".to_owned()),
            ),
            Err(e) => Err(StoreError::Api(e)),
        }
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError> {
        let api: Api<ConfigMap> = self.namespaced(namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError> {
        let name = require_name(&map.metadata, "ConfigMap")?;
        let namespace = require_namespace(&map.metadata, "ConfigMap")?;
        let api: Api<ConfigMap> = self.namespaced(namespace);
        api.create(&PostParams::default(), map)
            .await
            .map_err(|e| classify(e, &format!("ConfigMap {namespace}/{name}")))
    }

    async fn update_config_map(&self, map: &ConfigMap) -> Result<ConfigMap, StoreError> {
        let name = require_name(&map.metadata, "ConfigMap")?;
        let namespace = require_namespace(&map.metadata, "ConfigMap")?;
        let api: Api<ConfigMap> = self.namespaced(namespace);
        api.replace(name, &PostParams::default(), map)
            .await
            .map_err(|e| classify(e, &format!("ConfigMap {namespace}/{name}")))
    }
}
