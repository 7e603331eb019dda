//! ObjectClient trait for mocking
//!
//! This trait abstracts one cluster's object store so the reconciliation
//! engine can be exercised in unit tests without a running cluster. The
//! kube-backed [`crate::ApiClient`] implements it in production; tests use
//! the in-memory mock behind the `test-util` feature.

use std::sync::Arc;

use crate::error::ClientError;

/// Extractor producing the index keys a stored object is filed under.
pub type IndexExtractor<K> = Arc<dyn Fn(&K) -> Vec<String> + Send + Sync>;

/// Options for a precondition-guarded delete.
///
/// The UID precondition prevents deleting a different object that raced
/// into the same name between read and delete.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Seconds the object is given to terminate gracefully
    pub grace_period_seconds: Option<i64>,
    /// Only delete if the stored object carries this UID
    pub precondition_uid: Option<String>,
}

/// Operations on one cluster's store of a single resource kind
///
/// All async methods must be `Send` to work with Tokio's work-stealing
/// runtime. Every call operates on one object and returns a not-found
/// signal distinguishable from other errors.
#[async_trait::async_trait]
pub trait ObjectClient<K>: Send + Sync {
    /// Fetch one object by name.
    async fn get(&self, name: &str) -> Result<K, ClientError>;

    /// Create the object; conflict when the name is already taken.
    async fn create(&self, obj: &K) -> Result<K, ClientError>;

    /// Replace the object; the store's resource-version check rejects
    /// stale writes with a conflict.
    async fn update(&self, obj: &K) -> Result<K, ClientError>;

    /// Replace only the status subresource.
    async fn update_status(&self, obj: &K) -> Result<K, ClientError>;

    /// Delete by name, honoring grace period and UID precondition.
    async fn delete(&self, name: &str, options: &DeleteOptions) -> Result<(), ClientError>;

    /// Fetch the object filed under `key` in a registered index.
    async fn get_by_index(&self, index: &str, key: &str) -> Result<K, ClientError>;
}
