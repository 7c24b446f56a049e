//! Intent resolution and environment probing.
//!
//! The master config's `configureMceImport` variable is the only switch:
//! `"true"` enables discovery import, `"false"` disables it, anything else
//! (including absence) is a no-op that only refreshes the info record.

use crds::AddOnDeploymentConfig;
use hub_store::{HubStoreTrait, StoreError};
use tracing::debug;

use crate::error::ControllerError;
use crate::names::{CONFIGURE_MCE_IMPORT_VARIABLE, PLATFORM_OPERATOR_PREFIX};

/// What the master config asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Converge toward discovery-mode import being configured
    Enable,
    /// Tear discovery-mode import configuration down
    Disable,
    /// Leave everything alone except the info record
    NoOp,
}

/// Whether the governing platform operator is installed on this hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Platform operator present; the reconciler acts
    Governed,
    /// Platform operator absent; the reconciler skips entirely
    Ungoverned,
}

/// Map the master config's switch variable to an intent
pub fn resolve(config: &AddOnDeploymentConfig) -> Intent {
    match config.variable(CONFIGURE_MCE_IMPORT_VARIABLE) {
        Some("true") => Intent::Enable,
        Some("false") => Intent::Disable,
        other => {
            debug!(
                "{} is {:?}, treating as no-op",
                CONFIGURE_MCE_IMPORT_VARIABLE, other
            );
            Intent::NoOp
        }
    }
}

/// Probe the store for the governing platform operator.
///
/// A hub without the operator lifecycle machinery cannot answer the probe at
/// all; the controller would not be deployed there unless the platform were
/// present, so an unregistered kind classifies as governed.
pub async fn probe_environment(
    store: &dyn HubStoreTrait,
) -> Result<Environment, ControllerError> {
    match store.list_service_versions().await {
        Ok(versions) => {
            let governed = versions.iter().any(|csv| {
                csv.metadata
                    .name
                    .as_deref()
                    .is_some_and(|name| name.starts_with(PLATFORM_OPERATOR_PREFIX))
            });
            if governed {
                Ok(Environment::Governed)
            } else {
                Ok(Environment::Ungoverned)
            }
        }
        Err(StoreError::CategoryNotRegistered(kind)) => {
            debug!("{} not registered, assuming governed environment", kind);
            Ok(Environment::Governed)
        }
        Err(e) => Err(e.into()),
    }
}
