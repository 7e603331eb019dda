//! Ownership markers on physical objects.
//!
//! Every physical object the syncer creates is stamped with a marker label
//! identifying the virtual cluster it belongs to, and an annotation carrying
//! the originating virtual name for reverse lookup. The marker is what lets
//! cleanup distinguish objects this syncer provisioned from pre-existing
//! host objects.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::names::{safe_concat, IDENTITY_PREFIX};

/// Annotation on a physical object carrying the originating virtual name.
pub const NAME_ANNOTATION: &str = "nestcluster.io/object-name";

/// Label marking a physical object as managed by a virtual cluster.
pub const MANAGED_BY_LABEL: &str = "nestcluster.io/managed-by";

/// Deterministic identity of the virtual cluster backed by `target_namespace`.
pub fn cluster_identity(target_namespace: &str) -> String {
    safe_concat(&[IDENTITY_PREFIX, "x", target_namespace])
}

/// Whether a cluster-scoped physical object is marked as managed by the
/// virtual cluster backed by `target_namespace`.
pub fn is_managed_cluster(target_namespace: &str, meta: &ObjectMeta) -> bool {
    meta.labels
        .as_ref()
        .and_then(|labels| labels.get(MANAGED_BY_LABEL))
        .is_some_and(|value| *value == cluster_identity(target_namespace))
}
