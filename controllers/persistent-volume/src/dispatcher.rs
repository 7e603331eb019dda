//! Pair resolution and dispatch.
//!
//! A change notification names one virtual identity. The dispatcher
//! resolves both sides of the pair — the virtual object by name, the
//! physical object by translated name — and hands them to exactly one of
//! SyncDown, Sync or SyncUp.

use std::sync::Arc;

use k8s_openapi::api::core::v1::PersistentVolume;
use kube_runtime::controller::Action;
use tracing::debug;

use syncer::{NameResolver, SyncContext, Syncer, UpSyncer};

use crate::error::ControllerError;
use crate::reconciler::PersistentVolumeSyncer;

/// Resolves (virtual, physical) volume pairs and runs one reconciliation
/// pass per notification.
pub struct SyncDispatcher {
    ctx: SyncContext<PersistentVolume>,
    syncer: Arc<PersistentVolumeSyncer>,
}

impl SyncDispatcher {
    /// Creates a dispatcher around the shared context and syncer.
    pub fn new(ctx: SyncContext<PersistentVolume>, syncer: Arc<PersistentVolumeSyncer>) -> Self {
        Self { ctx, syncer }
    }

    /// The shared sync context.
    pub fn context(&self) -> &SyncContext<PersistentVolume> {
        &self.ctx
    }

    /// The persistent volume syncer.
    pub fn syncer(&self) -> &PersistentVolumeSyncer {
        &self.syncer
    }

    /// Runs one reconciliation pass for one virtual identity.
    ///
    /// An empty name means reverse resolution failed hard and the event is
    /// dropped; the next watch event retries it.
    pub async fn reconcile_identity(&self, v_name: &str) -> Result<Action, ControllerError> {
        if v_name.is_empty() {
            return Ok(Action::await_change());
        }

        let v_pv = match self.ctx.virtual_objects.get(v_name).await {
            Ok(pv) => Some(pv),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };

        let p_name = self.syncer.virtual_to_physical(v_name, v_pv.as_ref());
        let p_pv = match self.ctx.physical_objects.get(&p_name).await {
            Ok(pv) => Some(pv),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };

        match (v_pv, p_pv) {
            (Some(v_pv), None) => Ok(self.syncer.sync_down(&self.ctx, v_pv).await?),
            (Some(v_pv), Some(p_pv)) => Ok(self.syncer.sync(&self.ctx, p_pv, v_pv).await?),
            (None, Some(p_pv)) => Ok(self.syncer.sync_up(&self.ctx, p_pv).await?),
            (None, None) => {
                debug!("persistent volume {v_name} is gone on both sides");
                Ok(Action::await_change())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use cluster_client::MockAction;
    use translate::physical_name_cluster_scoped;

    #[tokio::test]
    async fn test_virtual_only_pair_syncs_down() {
        let harness = test_harness("host-ns", StaticOwnership(false));
        harness.virtual_volumes.insert(test_volume("vol-a"));
        let dispatcher = SyncDispatcher::new(harness.ctx.clone(), Arc::clone(&harness.syncer));

        dispatcher.reconcile_identity("vol-a").await.unwrap();

        let p_name = physical_name_cluster_scoped("vol-a", "host-ns");
        assert_eq!(
            harness.physical_volumes.actions(),
            vec![MockAction::Created(p_name.clone())]
        );
        assert!(harness.physical_volumes.get_named(&p_name).is_some());
    }

    #[tokio::test]
    async fn test_physical_only_pair_syncs_up() {
        let harness = test_harness("host-ns", StaticOwnership(true));
        harness.physical_volumes.insert(test_volume("pv-data"));
        let dispatcher = SyncDispatcher::new(harness.ctx.clone(), Arc::clone(&harness.syncer));

        dispatcher.reconcile_identity("pv-data").await.unwrap();

        assert_eq!(
            harness.virtual_volumes.actions(),
            vec![MockAction::Created("pv-data".to_string())]
        );
    }

    #[tokio::test]
    async fn test_absent_pair_is_a_no_op() {
        let harness = test_harness("host-ns", StaticOwnership(false));
        let dispatcher = SyncDispatcher::new(harness.ctx.clone(), Arc::clone(&harness.syncer));

        dispatcher.reconcile_identity("vol-a").await.unwrap();

        assert!(harness.virtual_volumes.actions().is_empty());
        assert!(harness.physical_volumes.actions().is_empty());
    }
}
