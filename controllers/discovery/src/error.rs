//! Controller-specific error types.
//!
//! This module defines error types specific to the discovery controller that
//! are not covered by upstream library errors.

use hub_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the discovery controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Hub store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource watch failed
    #[error("resource watch failed: {0}")]
    Watch(String),
}
