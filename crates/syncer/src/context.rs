//! Per-pass context handed to every syncer call.

use std::sync::Arc;

use cluster_client::ObjectClient;

/// Store access for one reconciliation pass of one resource kind.
///
/// Both stores speak the same [`ObjectClient`] interface; which cluster a
/// call lands on is fixed by which field it goes through. The context holds
/// no per-pass mutable state, so one instance is shared by all passes.
#[derive(Clone)]
pub struct SyncContext<K> {
    /// The virtual cluster's store of this kind
    pub virtual_objects: Arc<dyn ObjectClient<K>>,
    /// The host cluster's store of this kind
    pub physical_objects: Arc<dyn ObjectClient<K>>,
    /// Host namespace all virtual objects are projected into
    pub target_namespace: String,
}

impl<K> SyncContext<K> {
    /// Creates a context from the two stores and the target namespace.
    pub fn new(
        virtual_objects: Arc<dyn ObjectClient<K>>,
        physical_objects: Arc<dyn ObjectClient<K>>,
        target_namespace: impl Into<String>,
    ) -> Self {
        Self {
            virtual_objects,
            physical_objects,
            target_namespace: target_namespace.into(),
        }
    }
}
