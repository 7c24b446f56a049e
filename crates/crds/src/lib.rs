//! Hub Configuration Record Definitions
//!
//! Typed definitions for the orchestration-layer records the discovery
//! controller reads and converges:
//! - `AddOnDeploymentConfig`: deployment configuration for addons (the master
//!   config and the namespace-install config are both this kind)
//! - `ClusterManagementAddOn`: fleet-level addon declaration with install
//!   strategy and config references
//! - `KlusterletConfig`: import-mode instruction for managed clusters
//! - `ManagedCluster`: member cluster representation (read-only here)
//! - `ClusterServiceVersion`: operator service-version record, used only to
//!   probe for the governing platform

pub mod addon_deployment_config;
pub mod cluster_management_addon;
pub mod cluster_service_version;
pub mod klusterlet_config;
pub mod managed_cluster;

pub use addon_deployment_config::*;
pub use cluster_management_addon::*;
pub use cluster_service_version::*;
pub use klusterlet_config::*;
pub use managed_cluster::*;
