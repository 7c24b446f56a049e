//! Discovery Configuration Controller
//!
//! Configures a hub cluster so it can discover and import hosted control
//! planes exposed by downstream engine clusters. Two watch loops share one
//! process:
//! - The discovery reconciler converges addon and klusterlet configuration
//!   against the master config's `configureMceImport` switch.
//! - The setup orchestrator runs the one-shot hub setup/undo pipelines off
//!   a trigger record and publishes per-step results back into it.

mod config;
mod controller;
mod error;
mod names;
mod orchestrator;
mod reconciler;
mod watcher;

#[cfg(test)]
mod test_utils;

use config::Config;
use controller::Controller;
use error::ControllerError;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Discovery Configuration Controller");

    let settings = Config::from_env();
    info!("Configuration:");
    info!("  Addon namespace: {}", settings.addon_namespace);
    info!("  Hub namespace: {}", settings.acm_namespace);
    info!("  Placement namespace: {}", settings.policy_namespace);
    info!("  Discovery reconciler enabled: {}", settings.discovery_enabled);
    info!("  Setup orchestrator enabled: {}", settings.hub_setup_enabled);
    info!("  Backup labels enabled: {}", settings.backup_enabled);

    let controller = Controller::new(settings).await?;
    controller.run().await?;

    Ok(())
}
