//! Unit tests for intent resolution and the platform probe

#[cfg(test)]
mod tests {
    use hub_store::MockHubStore;

    use crate::reconciler::intent::{probe_environment, resolve, Environment, Intent};
    use crate::test_utils::{master_config, service_version};

    #[test]
    fn only_the_literal_true_enables() {
        assert_eq!(
            resolve(&master_config(&[("configureMceImport", "true")])),
            Intent::Enable
        );
        assert_eq!(
            resolve(&master_config(&[("configureMceImport", "false")])),
            Intent::Disable
        );
    }

    #[test]
    fn anything_else_is_a_no_op() {
        assert_eq!(resolve(&master_config(&[])), Intent::NoOp);
        assert_eq!(
            resolve(&master_config(&[("configureMceImport", "True")])),
            Intent::NoOp
        );
        assert_eq!(
            resolve(&master_config(&[("configureMceImport", "yes")])),
            Intent::NoOp
        );
        assert_eq!(
            resolve(&master_config(&[("someOtherVariable", "true")])),
            Intent::NoOp
        );
    }

    #[tokio::test]
    async fn probe_detects_platform_by_name_prefix() {
        let store = MockHubStore::new();
        store.add_service_version(service_version("some-other-operator.v1.0.0"));
        store.add_service_version(service_version("advanced-cluster-management.v2.9.0"));

        assert_eq!(
            probe_environment(&store).await.unwrap(),
            Environment::Governed
        );
    }

    #[tokio::test]
    async fn probe_without_platform_is_ungoverned() {
        let store = MockHubStore::new();
        store.add_service_version(service_version("some-other-operator.v1.0.0"));

        assert_eq!(
            probe_environment(&store).await.unwrap(),
            Environment::Ungoverned
        );

        let empty = MockHubStore::new();
        assert_eq!(
            probe_environment(&empty).await.unwrap(),
            Environment::Ungoverned
        );
    }

    #[tokio::test]
    async fn unregistered_kind_counts_as_governed() {
        let store = MockHubStore::new();
        store.set_service_versions_unregistered(true);

        assert_eq!(
            probe_environment(&store).await.unwrap(),
            Environment::Governed
        );
    }
}
