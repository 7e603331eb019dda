//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test objects and for wiring
//! the syncer to in-memory mock stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::core::v1::{
    HostPathVolumeSource, PersistentVolume, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use cluster_client::MockClient;
use syncer::{OwnershipTest, SyncContext};
use translate::{physical_name, INDEX_BY_PHYSICAL_NAME};

use crate::config::SyncerConfig;
use crate::reconciler::PersistentVolumeSyncer;

/// Ownership stub answering a fixed verdict
pub struct StaticOwnership(pub bool);

impl OwnershipTest for StaticOwnership {
    fn belongs_to_cluster(&self, _target_namespace: &str, _meta: &ObjectMeta) -> bool {
        self.0
    }
}

/// Helper to create a test configuration
pub fn test_config(target_namespace: &str) -> SyncerConfig {
    SyncerConfig {
        target_namespace: target_namespace.to_string(),
        virtual_kubeconfig: None,
    }
}

/// Helper to create a test persistent volume
pub fn test_volume(name: &str) -> PersistentVolume {
    PersistentVolume {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            capacity: Some(BTreeMap::from([(
                "storage".to_string(),
                Quantity("10Gi".to_string()),
            )])),
            host_path: Some(HostPathVolumeSource {
                path: format!("/data/{name}"),
                type_: None,
            }),
            persistent_volume_reclaim_policy: Some("Retain".to_string()),
            ..Default::default()
        }),
        status: None,
    }
}

/// Helper to create a test claim, optionally bound to a volume
pub fn test_claim(
    name: &str,
    namespace: &str,
    volume_name: Option<&str>,
) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{name}")),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            volume_name: volume_name.map(|volume| volume.to_string()),
            ..Default::default()
        }),
        status: None,
    }
}

/// Syncer wired to in-memory stores, with handles to every store for
/// asserting exactly which mutations a pass performed.
pub struct Harness {
    pub ctx: SyncContext<PersistentVolume>,
    pub syncer: Arc<PersistentVolumeSyncer>,
    pub virtual_volumes: MockClient<PersistentVolume>,
    pub physical_volumes: MockClient<PersistentVolume>,
    pub virtual_claims: MockClient<PersistentVolumeClaim>,
}

/// Helper to wire a syncer to fresh mock stores
pub fn test_harness(target_namespace: &str, ownership: StaticOwnership) -> Harness {
    let virtual_volumes = MockClient::new();
    let physical_volumes = MockClient::new();
    let virtual_claims = MockClient::new();
    virtual_claims.add_index(
        INDEX_BY_PHYSICAL_NAME,
        Arc::new(|claim: &PersistentVolumeClaim| {
            match (&claim.metadata.name, &claim.metadata.namespace) {
                (Some(name), Some(namespace)) => vec![physical_name(name, namespace)],
                _ => Vec::new(),
            }
        }),
    );

    let ctx = SyncContext::new(
        Arc::new(virtual_volumes.clone()),
        Arc::new(physical_volumes.clone()),
        target_namespace,
    );
    let syncer = Arc::new(PersistentVolumeSyncer::new(
        test_config(target_namespace),
        Arc::new(virtual_claims.clone()),
        Arc::new(ownership),
    ));

    Harness {
        ctx,
        syncer,
        virtual_volumes,
        physical_volumes,
        virtual_claims,
    }
}
