//! Reconciliation logic for persistent volumes.
//!
//! The decision engine for one (virtual, physical) volume pair. Branches
//! are mutually exclusive and ordered: deletion propagation, ownership
//! loss, backward drift, status drift, forward drift. Every pass issues at
//! most one mutating store call, so the pair converges over repeated
//! passes and each pass stays auditable.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube_runtime::controller::Action;
use tracing::info;

use cluster_client::{DeleteOptions, ObjectClient};
use syncer::{
    delete_object, ManagedProbe, NameResolver, OwnershipTest, SyncContext, SyncError, Syncer,
    UpSyncer,
};
use translate::{INDEX_BY_PHYSICAL_NAME, NAME_ANNOTATION};

use crate::config::SyncerConfig;
use crate::translator;

/// Annotation pinning a virtual volume to a pre-existing host volume.
///
/// A pinned volume is a reference, not something this syncer provisions: it
/// must never cause a create on the host side and is excluded from forward
/// updates.
pub const HOST_VOLUME_ANNOTATION: &str = "nestcluster.io/host-volume";

/// Physical name of a virtual persistent volume.
pub fn translate_volume_name(
    target_namespace: &str,
    name: &str,
    v_obj: Option<&PersistentVolume>,
) -> String {
    let Some(v_pv) = v_obj else {
        return name.to_string();
    };

    match pinned_host_name(v_pv) {
        Some(pinned) => pinned.to_string(),
        None => translate::physical_name_cluster_scoped(name, target_namespace),
    }
}

/// The pin annotation's value, when present and non-empty.
pub fn pinned_host_name(v_pv: &PersistentVolume) -> Option<&str> {
    v_pv.metadata
        .annotations
        .as_ref()?
        .get(HOST_VOLUME_ANNOTATION)
        .filter(|value| !value.is_empty())
        .map(String::as_str)
}

/// Maps a claim event to the volume identity it re-triggers.
///
/// A claim bound to a volume re-enqueues that volume; unbound claims map to
/// nothing.
pub fn map_claims(claim: &PersistentVolumeClaim) -> Option<String> {
    claim
        .spec
        .as_ref()?
        .volume_name
        .clone()
        .filter(|name| !name.is_empty())
}

/// Reconciles persistent volumes between the virtual and the host cluster.
pub struct PersistentVolumeSyncer {
    config: SyncerConfig,
    virtual_claims: Arc<dyn ObjectClient<PersistentVolumeClaim>>,
    ownership: Arc<dyn OwnershipTest>,
}

impl PersistentVolumeSyncer {
    /// Creates a new syncer instance.
    pub fn new(
        config: SyncerConfig,
        virtual_claims: Arc<dyn ObjectClient<PersistentVolumeClaim>>,
        ownership: Arc<dyn OwnershipTest>,
    ) -> Self {
        Self {
            config,
            virtual_claims,
            ownership,
        }
    }

    /// Whether a physical volume should be synced, and the virtual claim it
    /// belongs to if one exists.
    ///
    /// Side-effect free; called from both reconciliation directions and
    /// from the standalone managed probe.
    pub async fn should_sync(
        &self,
        p_pv: &PersistentVolume,
    ) -> Result<(bool, Option<PersistentVolumeClaim>), SyncError> {
        // is there an assigned claim in the target namespace?
        let claim_name = p_pv
            .spec
            .as_ref()
            .and_then(|spec| spec.claim_ref.as_ref())
            .filter(|claim_ref| {
                claim_ref.namespace.as_deref() == Some(self.config.target_namespace.as_str())
            })
            .and_then(|claim_ref| claim_ref.name.as_deref());
        let Some(claim_name) = claim_name else {
            return Ok((self.belongs_to_cluster(p_pv), None));
        };

        match self
            .virtual_claims
            .get_by_index(INDEX_BY_PHYSICAL_NAME, claim_name)
            .await
        {
            Ok(claim) => Ok((true, Some(claim))),
            Err(err) if err.is_not_found() => Ok((self.belongs_to_cluster(p_pv), None)),
            Err(err) => Err(err.into()),
        }
    }

    fn belongs_to_cluster(&self, p_pv: &PersistentVolume) -> bool {
        self.ownership
            .belongs_to_cluster(&self.config.target_namespace, &p_pv.metadata)
    }
}

#[async_trait::async_trait]
impl Syncer<PersistentVolume> for PersistentVolumeSyncer {
    fn name(&self) -> &'static str {
        "persistentvolume"
    }

    async fn sync_down(
        &self,
        ctx: &SyncContext<PersistentVolume>,
        v_obj: PersistentVolume,
    ) -> Result<Action, SyncError> {
        let mut v_pv = v_obj;
        let v_name = v_pv
            .metadata
            .name
            .clone()
            .ok_or(SyncError::MissingMetadata("name"))?;

        // A pinned or terminating volume must never cause a create on the
        // host side.
        if v_pv.metadata.deletion_timestamp.is_some() || pinned_host_name(&v_pv).is_some() {
            if v_pv
                .metadata
                .finalizers
                .as_ref()
                .is_some_and(|finalizers| !finalizers.is_empty())
            {
                // delete the finalizers here so that the object can be deleted
                v_pv.metadata.finalizers = Some(Vec::new());
                info!("remove virtual persistent volume {v_name} finalizers, because object should get deleted");
                ctx.virtual_objects.update(&v_pv).await?;
                return Ok(Action::await_change());
            }

            info!("remove virtual persistent volume {v_name}, because object should get deleted");
            ctx.virtual_objects
                .delete(&v_name, &DeleteOptions::default())
                .await?;
            return Ok(Action::await_change());
        }

        let p_pv = translator::to_physical(&self.config, &v_pv)?;
        let p_name = p_pv.metadata.name.as_deref().unwrap_or_default();
        info!("create physical persistent volume {p_name}, because there is a virtual persistent volume");
        ctx.physical_objects.create(&p_pv).await?;

        Ok(Action::await_change())
    }

    async fn sync(
        &self,
        ctx: &SyncContext<PersistentVolume>,
        p_obj: PersistentVolume,
        v_obj: PersistentVolume,
    ) -> Result<Action, SyncError> {
        let p_pv = p_obj;
        let v_pv = v_obj;
        let v_name = v_pv
            .metadata
            .name
            .clone()
            .ok_or(SyncError::MissingMetadata("name"))?;
        let p_name = p_pv
            .metadata
            .name
            .clone()
            .ok_or(SyncError::MissingMetadata("name"))?;

        // check if objects are getting deleted
        if v_pv.metadata.deletion_timestamp.is_some() {
            if p_pv.metadata.deletion_timestamp.is_none() {
                info!("delete physical persistent volume {p_name}, because virtual persistent volume is terminating");
                ctx.physical_objects
                    .delete(&p_name, &DeleteOptions::default())
                    .await?;
            }

            // host-side finalizers need time to complete
            return Ok(Action::requeue(Duration::from_secs(1)));
        }

        // check if the persistent volume should get synced
        let (sync, v_claim) = self.should_sync(&p_pv).await?;
        if !sync {
            info!("delete virtual persistent volume {v_name}, because there is no virtual persistent volume claim with that volume");
            ctx.virtual_objects
                .delete(&v_name, &DeleteOptions::default())
                .await?;
            return Ok(Action::await_change());
        }

        // host-side binding flows back into the virtual object first
        if let Some(updated) = translator::update_virtual_backwards(&v_pv, &p_pv, v_claim.as_ref())
        {
            info!("update virtual persistent volume {v_name}, because spec has changed");
            ctx.virtual_objects.update(&updated).await?;

            // we will reconcile anyways
            return Ok(Action::await_change());
        }

        // check status; the host side is authoritative
        if v_pv.status != p_pv.status {
            let mut updated = v_pv.clone();
            updated.status = p_pv.status.clone();
            info!("update virtual persistent volume {v_name}, because status has changed");
            ctx.virtual_objects.update_status(&updated).await?;

            // we will reconcile anyways
            return Ok(Action::await_change());
        }

        // update the physical persistent volume if the virtual has changed;
        // pinned volumes are references and never updated forward
        if pinned_host_name(&v_pv).is_none() {
            if v_pv.metadata.deletion_timestamp.is_some() {
                if p_pv.metadata.deletion_timestamp.is_some() {
                    return Ok(Action::await_change());
                }

                info!("delete physical persistent volume {p_name}, because virtual persistent volume is being deleted");
                let options = DeleteOptions {
                    grace_period_seconds: v_pv.metadata.deletion_grace_period_seconds,
                    precondition_uid: p_pv.metadata.uid.clone(),
                };
                return match ctx.physical_objects.delete(&p_name, &options).await {
                    Ok(()) => Ok(Action::await_change()),
                    Err(err) if err.is_not_found() => Ok(Action::await_change()),
                    Err(err) => Err(err.into()),
                };
            }

            if let Some(updated) = translator::update_physical(&v_pv, &p_pv) {
                info!("update physical persistent volume {p_name}, because spec or annotations have changed");
                ctx.physical_objects.update(&updated).await?;
            }
        }

        Ok(Action::await_change())
    }
}

#[async_trait::async_trait]
impl UpSyncer<PersistentVolume> for PersistentVolumeSyncer {
    async fn sync_up(
        &self,
        ctx: &SyncContext<PersistentVolume>,
        p_obj: PersistentVolume,
    ) -> Result<Action, SyncError> {
        let p_pv = p_obj;
        let p_name = p_pv.metadata.name.as_deref().unwrap_or_default().to_string();

        let (sync, v_claim) = self.should_sync(&p_pv).await?;
        if translate::is_managed_cluster(&self.config.target_namespace, &p_pv.metadata) {
            // provisioned by this syncer, but the virtual object is gone
            info!("delete physical persistent volume {p_name}, because it is not needed anymore");
            return delete_object(ctx, &p_pv).await;
        }

        if sync {
            // create the persistent volume in the virtual cluster
            let v_pv = translator::to_virtual(&p_pv, v_claim.as_ref())?;
            let v_name = v_pv.metadata.name.as_deref().unwrap_or_default();
            if let Some(claim) = &v_claim {
                info!(
                    "create persistent volume {v_name}, because it belongs to virtual claim {}/{} and does not exist in virtual cluster",
                    claim.metadata.namespace.as_deref().unwrap_or_default(),
                    claim.metadata.name.as_deref().unwrap_or_default(),
                );
            }

            ctx.virtual_objects.create(&v_pv).await?;
            return Ok(Action::await_change());
        }

        Ok(Action::await_change())
    }
}

#[async_trait::async_trait]
impl NameResolver<PersistentVolume> for PersistentVolumeSyncer {
    fn virtual_to_physical(&self, name: &str, v_obj: Option<&PersistentVolume>) -> String {
        translate_volume_name(&self.config.target_namespace, name, v_obj)
    }

    async fn physical_to_virtual(
        &self,
        ctx: &SyncContext<PersistentVolume>,
        p_obj: &PersistentVolume,
    ) -> String {
        if let Some(v_name) = p_obj
            .metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(NAME_ANNOTATION))
            .filter(|value| !value.is_empty())
        {
            return v_name.clone();
        }

        let p_name = p_obj.metadata.name.clone().unwrap_or_default();
        match ctx
            .virtual_objects
            .get_by_index(INDEX_BY_PHYSICAL_NAME, &p_name)
            .await
        {
            Ok(v_pv) => v_pv.metadata.name.unwrap_or(p_name),
            // a never-translated name is its own reverse translation
            Err(err) if err.is_not_found() => p_name,
            // resolution failed hard; drop the event
            Err(_) => String::new(),
        }
    }
}

#[async_trait::async_trait]
impl ManagedProbe<PersistentVolume> for PersistentVolumeSyncer {
    async fn is_managed(&self, p_obj: &PersistentVolume) -> bool {
        match self.should_sync(p_obj).await {
            Ok((sync, _)) => sync,
            // leave the object alone rather than claiming it on a failed lookup
            Err(_) => false,
        }
    }
}
