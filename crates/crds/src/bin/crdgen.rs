//! Prints the CRD manifests for every record kind defined in this crate.
//!
//! Usage: `cargo run --bin crdgen > crds.yaml`

use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [
        serde_yaml::to_string(&crds::AddOnDeploymentConfig::crd())?,
        serde_yaml::to_string(&crds::ClusterManagementAddOn::crd())?,
        serde_yaml::to_string(&crds::KlusterletConfig::crd())?,
        serde_yaml::to_string(&crds::ManagedCluster::crd())?,
        serde_yaml::to_string(&crds::ClusterServiceVersion::crd())?,
    ];

    for crd in crds {
        println!("---");
        print!("{crd}");
    }

    Ok(())
}
