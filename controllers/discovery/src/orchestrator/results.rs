//! Per-step result recording.
//!
//! Every pipeline step runs inside [`StepTracker::track`], which appends one
//! ordered [`ResultEntry`] whether the step succeeded or failed. The
//! finished [`ResultsDocument`] is serialized into the trigger record under
//! `setup-results` as the caller-visible audit trail.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ControllerError;

/// Aggregate outcome of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDocument {
    /// Overall pipeline status: `completed` or `failed`
    pub status: String,

    /// RFC 3339 start of the pipeline
    pub started_at: String,

    /// RFC 3339 end of the pipeline
    pub completed_at: String,

    /// Wall-clock seconds the pipeline took
    pub duration_seconds: i64,

    /// Human-readable one-line summary
    pub summary: String,

    /// One entry per attempted step, in execution order
    pub results: Vec<ResultEntry>,
}

/// Outcome of a single pipeline step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    /// Step identifier
    pub component: String,

    /// `completed` or `failed`
    pub status: String,

    /// Success detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// RFC 3339 time the step finished
    pub timestamp: String,
}

/// Records step outcomes for one pipeline run
#[derive(Debug)]
pub struct StepTracker {
    started_at: DateTime<Utc>,
    results: Vec<ResultEntry>,
}

impl StepTracker {
    /// Start tracking a pipeline run
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    /// Run one step and record its outcome. The step's own result is handed
    /// back so setup pipelines can abort while undo pipelines carry on.
    pub async fn track<F>(&mut self, component: &str, step: F) -> Result<(), ControllerError>
    where
        F: Future<Output = Result<String, ControllerError>>,
    {
        match step.await {
            Ok(message) => {
                info!("step {} completed: {}", component, message);
                self.results.push(ResultEntry {
                    component: component.to_owned(),
                    status: "completed".to_owned(),
                    message: Some(message),
                    error: None,
                    timestamp: rfc3339_now(),
                });
                Ok(())
            }
            Err(e) => {
                error!("step {} failed: {}", component, e);
                self.results.push(ResultEntry {
                    component: component.to_owned(),
                    status: "failed".to_owned(),
                    message: None,
                    error: Some(e.to_string()),
                    timestamp: rfc3339_now(),
                });
                Err(e)
            }
        }
    }

    /// How many recorded steps failed so far
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status == "failed").count()
    }

    /// How many steps have been recorded so far
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no steps have been recorded yet
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Close the run and build the aggregate document
    pub fn finish(self, status: &str, summary: String) -> ResultsDocument {
        let completed_at = Utc::now();
        ResultsDocument {
            status: status.to_owned(),
            started_at: self
                .started_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            completed_at: completed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            duration_seconds: (completed_at - self.started_at).num_seconds(),
            summary,
            results: self.results,
        }
    }
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time in the RFC 3339 wire form used throughout the trigger record
pub fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
