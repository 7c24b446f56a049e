//! Scenario tests for the setup orchestrator
//!
//! Drive the trigger state machine against the mock store: the happy path,
//! monotonic re-entry, pipeline failure and recovery, undo refusal, and the
//! best-effort undo pipeline.

#[cfg(test)]
mod tests {
    use hub_store::MockHubStore;

    use crate::names::{
        BACKUP_LABEL_KEY, BACKUP_LABEL_VALUE, KLUSTERLET_CONFIG_NAME, MASTER_CONFIG_NAME,
        NS_INSTALL_CONFIG_NAME, SETUP_TRIGGER_NAME,
    };
    use crate::orchestrator::results::ResultsDocument;
    use crate::orchestrator::{
        SETUP_ERROR_KEY, SETUP_REQUESTED_KEY, SETUP_RESULTS_KEY, SETUP_STATUS_KEY,
        SETUP_TIMESTAMP_KEY, UNDO_REQUESTED_KEY,
    };
    use crate::test_utils::{orchestrator_with, placement_addon, trigger};

    const ACM_NS: &str = "multicluster-engine";

    const SETUP_STEPS: [&str; 5] = [
        "namespace-install-config",
        "addon-config-references",
        "klusterlet-config",
        "self-addon-config",
        "backup-labels",
    ];

    const UNDO_STEPS: [&str; 5] = [
        "backup-labels",
        "self-addon-config",
        "addon-config-references",
        "namespace-install-config",
        "klusterlet-config",
    ];

    async fn notify(store: &MockHubStore) -> Result<(), crate::error::ControllerError> {
        orchestrator_with(store)
            .reconcile_trigger(&trigger(&[]))
            .await
    }

    fn trigger_data(store: &MockHubStore) -> std::collections::BTreeMap<String, String> {
        store
            .config_map(ACM_NS, SETUP_TRIGGER_NAME)
            .unwrap()
            .data
            .unwrap_or_default()
    }

    fn results_document(store: &MockHubStore) -> ResultsDocument {
        serde_json::from_str(trigger_data(store).get(SETUP_RESULTS_KEY).unwrap()).unwrap()
    }

    fn set_trigger_flag(store: &MockHubStore, key: &str, value: &str) {
        let mut map = store.config_map(ACM_NS, SETUP_TRIGGER_NAME).unwrap();
        map.data
            .get_or_insert_with(Default::default)
            .insert(key.to_owned(), value.to_owned());
        store.add_config_map(map);
    }

    fn setup_store() -> MockHubStore {
        let store = MockHubStore::new();
        store.add_config_map(trigger(&[(SETUP_REQUESTED_KEY, "true")]));
        store.add_cluster_addon(placement_addon("work-manager"));
        store
    }

    #[tokio::test]
    async fn setup_happy_path_records_all_five_steps() {
        let store = setup_store();
        notify(&store).await.unwrap();

        let data = trigger_data(&store);
        assert_eq!(data.get(SETUP_STATUS_KEY).map(String::as_str), Some("completed"));
        assert!(data.contains_key(SETUP_TIMESTAMP_KEY));
        assert!(!data.contains_key(SETUP_ERROR_KEY));

        let document = results_document(&store);
        assert_eq!(document.status, "completed");
        let components: Vec<&str> = document
            .results
            .iter()
            .map(|r| r.component.as_str())
            .collect();
        assert_eq!(components, SETUP_STEPS);
        assert!(document.results.iter().all(|r| r.status == "completed"));
        for pair in document.results.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }

        // The pipeline's records are on disk
        assert!(store.deploy_config(ACM_NS, NS_INSTALL_CONFIG_NAME).is_some());
        let master = store.deploy_config(ACM_NS, MASTER_CONFIG_NAME).unwrap();
        assert_eq!(master.variable("disableMetrics"), Some("true"));
        assert_eq!(master.variable("disableHOManagement"), Some("true"));

        // Step 3 is reserved: the reconciler owns the klusterlet config
        assert!(store.klusterlet_config(KLUSTERLET_CONFIG_NAME).is_none());

        // Backup labels landed on the managed records
        let ns_config = store.deploy_config(ACM_NS, NS_INSTALL_CONFIG_NAME).unwrap();
        assert_eq!(
            ns_config
                .metadata
                .labels
                .unwrap()
                .get(BACKUP_LABEL_KEY)
                .map(String::as_str),
            Some(BACKUP_LABEL_VALUE)
        );

        // The addon got a ref in its first placement
        let addon = store.cluster_addon("work-manager").unwrap();
        assert_eq!(
            addon.spec.install_strategy.placements[0].configs[0].name,
            NS_INSTALL_CONFIG_NAME
        );
    }

    #[tokio::test]
    async fn completed_setup_ignores_further_notifications() {
        let store = setup_store();
        notify(&store).await.unwrap();

        let writes = store.write_count();
        notify(&store).await.unwrap();
        assert_eq!(store.write_count(), writes);
        assert_eq!(
            trigger_data(&store).get(SETUP_STATUS_KEY).map(String::as_str),
            Some("completed")
        );
    }

    #[tokio::test]
    async fn in_progress_status_makes_notifications_no_ops() {
        let store = setup_store();
        set_trigger_flag(&store, SETUP_STATUS_KEY, "in-progress");

        let writes = store.write_count();
        notify(&store).await.unwrap();
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn a_step_failure_fails_the_run_and_retry_recovers() {
        let store = setup_store();
        store.fail_on("create_deploy_config");

        assert!(notify(&store).await.is_err());

        let data = trigger_data(&store);
        assert_eq!(data.get(SETUP_STATUS_KEY).map(String::as_str), Some("failed"));
        assert!(data.contains_key(SETUP_ERROR_KEY));

        let document = results_document(&store);
        assert_eq!(document.status, "failed");
        assert_eq!(document.results.len(), 1);
        assert_eq!(document.results[0].component, "namespace-install-config");
        assert_eq!(document.results[0].status, "failed");

        // The failed status re-admits the request on the next notification
        store.clear_failures();
        notify(&store).await.unwrap();
        let data = trigger_data(&store);
        assert_eq!(data.get(SETUP_STATUS_KEY).map(String::as_str), Some("completed"));
        assert!(!data.contains_key(SETUP_ERROR_KEY));
        assert_eq!(results_document(&store).results.len(), 5);
    }

    #[tokio::test]
    async fn undo_is_refused_before_setup_completed() {
        let store = MockHubStore::new();
        store.add_config_map(trigger(&[(UNDO_REQUESTED_KEY, "true")]));

        notify(&store).await.unwrap();

        let data = trigger_data(&store);
        assert_eq!(
            data.get(SETUP_STATUS_KEY).map(String::as_str),
            Some("undo-failed")
        );
        assert!(data.contains_key(SETUP_ERROR_KEY));
    }

    #[tokio::test]
    async fn undo_reverses_the_setup_pipeline() {
        let store = setup_store();
        notify(&store).await.unwrap();
        set_trigger_flag(&store, UNDO_REQUESTED_KEY, "true");

        notify(&store).await.unwrap();

        let data = trigger_data(&store);
        assert_eq!(
            data.get(SETUP_STATUS_KEY).map(String::as_str),
            Some("undo-completed")
        );

        let document = results_document(&store);
        let components: Vec<&str> = document
            .results
            .iter()
            .map(|r| r.component.as_str())
            .collect();
        assert_eq!(components, UNDO_STEPS);

        assert!(store.deploy_config(ACM_NS, NS_INSTALL_CONFIG_NAME).is_none());
        assert!(store.klusterlet_config(KLUSTERLET_CONFIG_NAME).is_none());

        let master = store.deploy_config(ACM_NS, MASTER_CONFIG_NAME).unwrap();
        assert_eq!(master.variable("disableMetrics"), None);
        assert_eq!(master.variable("disableHOManagement"), None);
        assert_eq!(
            master.spec.agent_install_namespace.as_deref(),
            Some("open-cluster-management-agent-addon")
        );
        assert!(master
            .metadata
            .labels
            .map(|l| !l.contains_key(BACKUP_LABEL_KEY))
            .unwrap_or(true));

        let addon = store.cluster_addon("work-manager").unwrap();
        assert!(addon.spec.install_strategy.placements[0].configs.is_empty());
    }

    #[tokio::test]
    async fn undo_keeps_going_past_failed_steps() {
        let store = setup_store();
        notify(&store).await.unwrap();
        set_trigger_flag(&store, UNDO_REQUESTED_KEY, "true");
        store.fail_on("delete_deploy_config");

        notify(&store).await.unwrap();

        let data = trigger_data(&store);
        assert_eq!(
            data.get(SETUP_STATUS_KEY).map(String::as_str),
            Some("undo-completed")
        );

        let document = results_document(&store);
        assert_eq!(document.results.len(), 5);
        let failed: Vec<&str> = document
            .results
            .iter()
            .filter(|r| r.status == "failed")
            .map(|r| r.component.as_str())
            .collect();
        assert_eq!(failed, ["namespace-install-config"]);
        // The step after the failure still ran
        assert_eq!(document.results[4].component, "klusterlet-config");
        assert_eq!(document.results[4].status, "completed");
        assert!(document.summary.contains("1 failed"));

        // The record the failed step should have removed is still there
        assert!(store.deploy_config(ACM_NS, NS_INSTALL_CONFIG_NAME).is_some());
    }

    #[tokio::test]
    async fn completed_undo_ignores_further_notifications() {
        let store = setup_store();
        notify(&store).await.unwrap();
        set_trigger_flag(&store, UNDO_REQUESTED_KEY, "true");
        notify(&store).await.unwrap();

        let writes = store.write_count();
        notify(&store).await.unwrap();
        assert_eq!(store.write_count(), writes);
        assert_eq!(
            trigger_data(&store).get(SETUP_STATUS_KEY).map(String::as_str),
            Some("undo-completed")
        );
    }

    #[tokio::test]
    async fn unrelated_config_maps_are_filtered_out() {
        let store = setup_store();
        let orchestrator = orchestrator_with(&store);

        let mut other = trigger(&[(SETUP_REQUESTED_KEY, "true")]);
        other.metadata.name = Some("some-other-map".to_owned());

        orchestrator.reconcile_trigger(&other).await.unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn absent_trigger_is_success() {
        let store = MockHubStore::new();
        notify(&store).await.unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn flags_other_than_literal_true_are_ignored() {
        let store = MockHubStore::new();
        store.add_config_map(trigger(&[(SETUP_REQUESTED_KEY, "yes")]));

        notify(&store).await.unwrap();
        assert_eq!(store.write_count(), 0);
        assert!(store.deploy_config(ACM_NS, NS_INSTALL_CONFIG_NAME).is_none());
    }
}
