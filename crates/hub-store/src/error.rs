//! Hub store errors

use thiserror::Error;

/// Errors that can occur when interacting with the hub's declarative store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found. Point reads translate this to `Ok(None)`; it only
    /// surfaces from writes against a record that no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write lost to a concurrent writer (stale revision token)
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record kind's API category is not registered on this hub
    #[error("kind not registered: {0}")]
    CategoryNotRegistered(String),

    /// Transient failure; the watch layer retries the whole reconciliation
    #[error("transient store error: {0}")]
    Transient(String),

    /// Record is malformed for the requested operation (e.g. missing name)
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying Kubernetes API error
    #[error("api error: {0}")]
    Api(#[from] kube::Error),
}

impl StoreError {
    /// Whether the error means the target record is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
