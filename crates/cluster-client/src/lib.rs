//! Object-store client for one cluster.
//!
//! The syncer talks to two clusters at once — the virtual API store and the
//! physical host cluster — through the same [`ObjectClient`] interface: one
//! object at a time, with a not-found signal distinguishable from other
//! errors and deletes that accept grace periods and identity preconditions.
//!
//! Secondary indices are declared by registering an extractor function on a
//! client and queried with `get_by_index`; the client never persists index
//! state of its own.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ApiClient, ObjectClient};
//! use k8s_openapi::api::core::v1::PersistentVolume;
//! use kube::{Api, Client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::try_default().await?;
//! let volumes = ApiClient::new(Api::<PersistentVolume>::all(client));
//! let pv = volumes.get("pv-data").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::ApiClient;
pub use error::ClientError;
pub use store_trait::{DeleteOptions, IndexExtractor, ObjectClient};
#[cfg(feature = "test-util")]
pub use mock::{MockAction, MockClient};
