//! Unit tests for the target-state projection

#[cfg(test)]
mod tests {
    use crds::NestedValue;

    use crate::reconciler::intent::{Environment, Intent};
    use crate::reconciler::plan::{project, AddonAttachment, Plan};
    use crate::test_utils::{master_config, test_config};

    fn project_enable() -> Plan {
        project(
            Intent::Enable,
            Environment::Governed,
            &master_config(&[("configureMceImport", "true")]),
            &test_config(),
        )
    }

    fn project_disable() -> Plan {
        project(
            Intent::Disable,
            Environment::Governed,
            &master_config(&[
                ("configureMceImport", "false"),
                ("disableMetrics", "true"),
                ("disableHOManagement", "true"),
            ]),
            &test_config(),
        )
    }

    #[test]
    fn enable_projects_the_full_record_set() {
        let plan = project_enable();

        let ns_config = plan.ns_install_config.expect("ns install config desired");
        assert_eq!(
            ns_config.agent_install_namespace.as_deref(),
            Some("open-cluster-management-agent-addon-discovery")
        );

        assert_eq!(
            plan.master_amendment.install_namespace,
            "open-cluster-management-agent-addon-discovery"
        );
        let added: Vec<&str> = plan
            .master_amendment
            .add_variables
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(added, ["disableMetrics", "disableHOManagement"]);
        assert!(plan.master_amendment.remove_variables.is_empty());

        let mode = plan
            .klusterlet_config
            .expect("klusterlet config desired")
            .install_mode
            .expect("install mode set");
        assert_eq!(mode.get("type").and_then(NestedValue::as_str), Some("noOperator"));
        assert_eq!(
            mode.get("noOperator")
                .and_then(|m| m.get("postfix"))
                .and_then(NestedValue::as_str),
            Some("mce-import")
        );

        let info = plan.info.expect("info record desired");
        assert_eq!(info.get("import-enabled").map(String::as_str), Some("true"));
        assert_eq!(
            info.get("configureMceImport").map(String::as_str),
            Some("true")
        );
        assert_eq!(info.get("disableMetrics").map(String::as_str), Some("true"));
        assert_eq!(
            info.get("agentInstallNamespace").map(String::as_str),
            Some("open-cluster-management-agent-addon-discovery")
        );
    }

    #[test]
    fn both_addon_classes_are_projected() {
        let plan = project_enable();

        let placements: Vec<&str> = plan
            .attachments
            .iter()
            .filter_map(|a| match a {
                AddonAttachment::Placement {
                    addon,
                    placement_name,
                    placement_namespace,
                } => {
                    assert_eq!(placement_name, "global");
                    assert_eq!(placement_namespace, "open-cluster-management-global-set");
                    Some(addon.as_str())
                }
                AddonAttachment::Manual { .. } => None,
            })
            .collect();
        assert_eq!(
            placements,
            ["work-manager", "managed-serviceaccount", "cluster-proxy"]
        );

        let manual: Vec<&str> = plan
            .attachments
            .iter()
            .filter_map(|a| match a {
                AddonAttachment::Manual { addon } => Some(addon.as_str()),
                AddonAttachment::Placement { .. } => None,
            })
            .collect();
        assert_eq!(manual, ["application-manager"]);
    }

    #[test]
    fn the_self_addon_is_never_projected() {
        // Rewriting the record whose changes trigger the reconciler would
        // feed back into its own watch
        for plan in [project_enable(), project_disable()] {
            assert!(plan.attachments.iter().all(|a| match a {
                AddonAttachment::Placement { addon, .. }
                | AddonAttachment::Manual { addon } => addon != "hypershift-addon",
            }));
        }
    }

    #[test]
    fn disable_projects_absence_and_removals() {
        let plan = project_disable();

        assert!(plan.ns_install_config.is_none());
        assert!(plan.klusterlet_config.is_none());
        assert_eq!(
            plan.master_amendment.install_namespace,
            "open-cluster-management-agent-addon"
        );
        assert!(plan.master_amendment.add_variables.is_empty());
        assert_eq!(
            plan.master_amendment.remove_variables,
            ["disableMetrics", "disableHOManagement"]
        );

        // Attachments still projected: the reconciler detaches them
        assert_eq!(plan.attachments.len(), 4);

        let info = plan.info.expect("info record still desired");
        assert_eq!(info.get("import-enabled").map(String::as_str), Some("false"));
        assert!(!info.contains_key("disableMetrics"));
        assert_eq!(
            info.get("agentInstallNamespace").map(String::as_str),
            Some("open-cluster-management-agent-addon")
        );
    }

    #[test]
    fn ungoverned_projects_the_empty_plan() {
        let plan = project(
            Intent::Enable,
            Environment::Ungoverned,
            &master_config(&[("configureMceImport", "true")]),
            &test_config(),
        );
        assert!(plan.ns_install_config.is_none());
        assert!(plan.klusterlet_config.is_none());
        assert!(plan.attachments.is_empty());
        assert!(plan.info.is_none());
    }

    #[test]
    fn projection_is_deterministic() {
        assert_eq!(project_enable(), project_enable());
        assert_eq!(project_disable(), project_disable());
    }
}
