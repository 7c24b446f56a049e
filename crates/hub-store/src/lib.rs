//! Hub Store Facade
//!
//! A typed get/list/create/update/delete facade over the hub cluster's
//! declarative store, covering exactly the record kinds the discovery
//! controller converges. All controller side effects flow through the
//! [`HubStoreTrait`] so reconciliation logic can be driven against the
//! in-memory [`MockHubStore`] in tests.
//!
//! # Example
//!
//! ```no_run
//! use hub_store::{HubStore, HubStoreTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HubStore::try_default().await?;
//!
//! // Point reads surface absence as None, not as an error
//! if let Some(config) = store
//!     .get_deploy_config("multicluster-engine", "hypershift-addon-deploy-config")
//!     .await?
//! {
//!     println!("config has {} variables", config.spec.customized_variables.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::HubStore;
pub use error::StoreError;
pub use store_trait::HubStoreTrait;
#[cfg(feature = "test-util")]
pub use mock::MockHubStore;
