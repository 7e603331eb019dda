//! The managed-cluster ownership test.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Decides whether an unclaimed physical object should still be treated as
/// belonging to a virtual cluster (e.g. statically provisioned volumes).
///
/// Pure predicate, no mutation. The decision engine consumes this through a
/// trait object so deployments can plug in their own selection rules.
pub trait OwnershipTest: Send + Sync {
    /// Whether the object belongs to the virtual cluster backed by
    /// `target_namespace`.
    fn belongs_to_cluster(&self, target_namespace: &str, meta: &ObjectMeta) -> bool;
}

/// Default ownership test: the managed-by marker label matches the cluster
/// identity derived from the target namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerOwnership;

impl OwnershipTest for MarkerOwnership {
    fn belongs_to_cluster(&self, target_namespace: &str, meta: &ObjectMeta) -> bool {
        translate::is_managed_cluster(target_namespace, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use translate::{cluster_identity, MANAGED_BY_LABEL};

    #[test]
    fn test_marker_ownership_matches_identity() {
        let meta = ObjectMeta {
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_string(),
                cluster_identity("tenant-a"),
            )])),
            ..Default::default()
        };
        assert!(MarkerOwnership.belongs_to_cluster("tenant-a", &meta));
        assert!(!MarkerOwnership.belongs_to_cluster("tenant-b", &meta));
    }
}
