//! Trigger-driven hub setup orchestration.
//!
//! A trigger record in the store carries request/undo flags. The
//! orchestrator moves through `requested -> in-progress -> {completed,
//! failed}` (mirror chain for undo), runs a fixed ordered pipeline, records
//! per-step outcomes, and publishes the aggregate back into the trigger.
//! At most one execution per trigger is in flight: the in-progress status
//! check turns change notifications delivered mid-run into no-ops.

pub mod results;
pub mod setup;
pub mod status;
pub mod undo;

#[cfg(test)]
mod orchestrator_test;

use std::collections::BTreeMap;

use hub_store::{HubStoreTrait, StoreError};
use k8s_openapi::api::core::v1::ConfigMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ControllerError;
use crate::names::SETUP_TRIGGER_NAME;

use results::{rfc3339_now, ResultsDocument, StepTracker};
use status::SetupStatus;

/// Trigger key an external caller sets to request setup
pub const SETUP_REQUESTED_KEY: &str = "setup-requested";

/// Trigger key an external caller sets to request undo
pub const UNDO_REQUESTED_KEY: &str = "undo-requested";

/// Trigger key the orchestrator writes its state-machine status into
pub const SETUP_STATUS_KEY: &str = "setup-status";

/// Trigger key holding the RFC 3339 time of the last status change
pub const SETUP_TIMESTAMP_KEY: &str = "setup-timestamp";

/// Trigger key holding the JSON-serialized results document
pub const SETUP_RESULTS_KEY: &str = "setup-results";

/// Trigger key holding the failure summary; present only on failure
pub const SETUP_ERROR_KEY: &str = "setup-error";

/// Trigger key holding the current-status message
pub const SETUP_MESSAGE_KEY: &str = "setup-message";

/// Runs the setup and undo pipelines off the trigger record.
pub struct Orchestrator {
    pub(crate) store: Box<dyn HubStoreTrait>,
    pub(crate) settings: Config,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates a new orchestrator instance.
    pub fn new(store: impl HubStoreTrait + 'static, settings: Config) -> Self {
        Self {
            store: Box::new(store),
            settings,
        }
    }

    /// Reconcile one change notification for the trigger record.
    ///
    /// The notification only supplies the key; flags and status are re-read
    /// from the store before any transition.
    pub async fn reconcile_trigger(&self, observed: &ConfigMap) -> Result<(), ControllerError> {
        let name = observed.metadata.name.as_deref().unwrap_or_default();
        let namespace = observed
            .metadata
            .namespace
            .as_deref()
            .unwrap_or(&self.settings.acm_namespace);
        if name != SETUP_TRIGGER_NAME || namespace != self.settings.acm_namespace {
            debug!("ignoring config map {}/{}", namespace, name);
            return Ok(());
        }

        let Some(trigger) = self.store.get_config_map(namespace, name).await? else {
            debug!("setup trigger absent, nothing to do");
            return Ok(());
        };

        let data = trigger.data.clone().unwrap_or_default();
        let setup_requested = data.get(SETUP_REQUESTED_KEY).map(String::as_str) == Some("true");
        let undo_requested = data.get(UNDO_REQUESTED_KEY).map(String::as_str) == Some("true");
        let current = data
            .get(SETUP_STATUS_KEY)
            .and_then(|s| SetupStatus::parse(s));

        if undo_requested {
            return match current {
                Some(SetupStatus::Completed) | Some(SetupStatus::UndoFailed) => {
                    self.run_undo().await
                }
                Some(SetupStatus::UndoInProgress) | Some(SetupStatus::UndoCompleted) => {
                    debug!("undo already {:?}, ignoring", current);
                    Ok(())
                }
                other => {
                    warn!("refusing undo request in status {:?}", other);
                    self.transition(
                        SetupStatus::UndoFailed,
                        Some("undo refused: hub setup has not completed"),
                        None,
                        Some("undo requested before setup completed".to_owned()),
                    )
                    .await
                }
            };
        }

        if setup_requested {
            return match current {
                Some(SetupStatus::InProgress) | Some(SetupStatus::UndoInProgress) => {
                    debug!("pipeline already in progress, ignoring notification");
                    Ok(())
                }
                Some(SetupStatus::Completed) => {
                    debug!("setup already completed, ignoring until the request flag is cleared");
                    Ok(())
                }
                _ => self.run_setup().await,
            };
        }

        debug!("trigger carries no request flags, nothing to do");
        Ok(())
    }

    async fn run_setup(&self) -> Result<(), ControllerError> {
        info!("starting hub setup pipeline");
        self.transition(
            SetupStatus::InProgress,
            Some("hub setup pipeline running"),
            None,
            None,
        )
        .await?;

        let mut tracker = StepTracker::new();
        match self.setup_pipeline(&mut tracker).await {
            Ok(()) => {
                let steps = tracker.len();
                let document =
                    tracker.finish("completed", format!("{steps} of {steps} steps completed"));
                self.transition(
                    SetupStatus::Completed,
                    Some("hub setup completed"),
                    Some(&document),
                    None,
                )
                .await?;
                info!("hub setup pipeline completed");
                Ok(())
            }
            Err(e) => {
                let summary = format!("setup aborted: {e}");
                let document = tracker.finish("failed", summary);
                self.transition(
                    SetupStatus::Failed,
                    Some("hub setup failed"),
                    Some(&document),
                    Some(e.to_string()),
                )
                .await?;
                // Surface the step failure; the watch layer retries after a
                // delay and the failed status re-admits the request
                Err(e)
            }
        }
    }

    async fn run_undo(&self) -> Result<(), ControllerError> {
        info!("starting hub undo pipeline");
        self.transition(
            SetupStatus::UndoInProgress,
            Some("hub undo pipeline running"),
            None,
            None,
        )
        .await?;

        let mut tracker = StepTracker::new();
        self.undo_pipeline(&mut tracker).await;

        let failed = tracker.failed_count();
        let summary = if failed == 0 {
            "all undo steps completed".to_owned()
        } else {
            format!("undo ran to the end with {failed} failed step(s)")
        };
        // Best-effort teardown: the pipeline always runs to the end, so the
        // aggregate is undo-completed even when individual steps failed
        let document = tracker.finish("completed", summary);
        self.transition(
            SetupStatus::UndoCompleted,
            Some("hub undo completed"),
            Some(&document),
            None,
        )
        .await?;
        info!("hub undo pipeline completed ({} failed steps)", failed);
        Ok(())
    }

    /// Publish a status transition into the trigger record.
    ///
    /// The trigger is re-read immediately before every write and the write
    /// is retried on revision conflicts, so concurrent flag edits by the
    /// external caller are never clobbered blindly.
    async fn transition(
        &self,
        status: SetupStatus,
        message: Option<&str>,
        document: Option<&ResultsDocument>,
        error: Option<String>,
    ) -> Result<(), ControllerError> {
        let results_json = match document {
            Some(doc) => Some(serde_json::to_string(doc)?),
            None => None,
        };

        self.write_trigger(|data| {
            data.insert(SETUP_STATUS_KEY.to_owned(), status.as_str().to_owned());
            data.insert(SETUP_TIMESTAMP_KEY.to_owned(), rfc3339_now());
            if let Some(message) = message {
                data.insert(SETUP_MESSAGE_KEY.to_owned(), message.to_owned());
            }
            if let Some(json) = &results_json {
                data.insert(SETUP_RESULTS_KEY.to_owned(), json.clone());
            }
            match &error {
                Some(error) => {
                    data.insert(SETUP_ERROR_KEY.to_owned(), error.clone());
                }
                None => {
                    data.remove(SETUP_ERROR_KEY);
                }
            }
        })
        .await?;
        Ok(())
    }

    async fn write_trigger<F>(&self, mut mutate: F) -> Result<ConfigMap, ControllerError>
    where
        F: FnMut(&mut BTreeMap<String, String>),
    {
        let mut attempts = 0;
        loop {
            let Some(mut trigger) = self
                .store
                .get_config_map(&self.settings.acm_namespace, SETUP_TRIGGER_NAME)
                .await?
            else {
                return Err(ControllerError::InvalidConfig(
                    "setup trigger disappeared mid-run".to_owned(),
                ));
            };

            mutate(trigger.data.get_or_insert_with(BTreeMap::new));

            match self.store.update_config_map(&trigger).await {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict(_)) if attempts < 2 => {
                    debug!("trigger write conflicted, re-reading");
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
