//! Kubernetes resource watchers.
//!
//! This module runs the two controller loops using `kube_runtime::Controller`:
//! one against the virtual cluster (volumes plus claims mapped to the volume
//! they are bound to) and one against the host cluster (volumes mapped back
//! through reverse name resolution). Both loops share one dispatcher, so a
//! change notification from either side runs the same reconciliation pass.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube::Api;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use tracing::{debug, error};

use syncer::NameResolver;

use crate::dispatcher::SyncDispatcher;
use crate::error::ControllerError;
use crate::reconciler::map_claims;

/// Watches persistent volumes on both clusters for changes.
pub struct Watcher {
    dispatcher: Arc<SyncDispatcher>,
    virtual_volume_api: Api<PersistentVolume>,
    physical_volume_api: Api<PersistentVolume>,
    virtual_claim_api: Api<PersistentVolumeClaim>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        dispatcher: Arc<SyncDispatcher>,
        virtual_volume_api: Api<PersistentVolume>,
        physical_volume_api: Api<PersistentVolume>,
        virtual_claim_api: Api<PersistentVolumeClaim>,
    ) -> Self {
        Self {
            dispatcher,
            virtual_volume_api,
            physical_volume_api,
            virtual_claim_api,
        }
    }

    // Debounce batches bursts of events together; concurrency bounds the
    // number of in-flight passes. Passes for the same identity stay
    // serialized by the controller queue.
    fn controller_config() -> ControllerConfig {
        ControllerConfig::default()
            .debounce(Duration::from_secs(5))
            .concurrency(3)
    }

    fn error_policy(
        _obj: Arc<PersistentVolume>,
        error: &ControllerError,
        _ctx: Arc<SyncDispatcher>,
    ) -> Action {
        error!("Reconciliation error for persistent volume: {error}");
        Action::requeue(Duration::from_secs(60))
    }

    /// Watches the virtual cluster: volumes directly, claims mapped to the
    /// volume they are bound to.
    pub async fn watch_virtual_volumes(&self) -> Result<(), ControllerError> {
        let reconcile = |obj: Arc<PersistentVolume>, ctx: Arc<SyncDispatcher>| async move {
            let name = obj.metadata.name.clone().unwrap_or_default();
            debug!("Reconciling virtual persistent volume {name}");
            ctx.reconcile_identity(&name).await
        };

        Controller::new(self.virtual_volume_api.clone(), watcher::Config::default())
            .with_config(Self::controller_config())
            .watches(
                self.virtual_claim_api.clone(),
                watcher::Config::default(),
                |claim: PersistentVolumeClaim| {
                    map_claims(&claim).map(|volume| ObjectRef::new(&volume))
                },
            )
            .run(reconcile, Self::error_policy, Arc::clone(&self.dispatcher))
            .for_each(|result| async move {
                if let Err(err) = result {
                    error!("Controller error for virtual persistent volumes: {err}");
                }
            })
            .await;

        Ok(())
    }

    /// Watches the host cluster and maps each volume back to the virtual
    /// identity it reconciles.
    pub async fn watch_physical_volumes(&self) -> Result<(), ControllerError> {
        let reconcile = |obj: Arc<PersistentVolume>, ctx: Arc<SyncDispatcher>| async move {
            let v_name = ctx.syncer().physical_to_virtual(ctx.context(), &obj).await;
            debug!(
                "Reconciling physical persistent volume {} as virtual {v_name}",
                obj.metadata.name.as_deref().unwrap_or_default()
            );
            ctx.reconcile_identity(&v_name).await
        };

        Controller::new(self.physical_volume_api.clone(), watcher::Config::default())
            .with_config(Self::controller_config())
            .run(reconcile, Self::error_policy, Arc::clone(&self.dispatcher))
            .for_each(|result| async move {
                if let Err(err) = result {
                    error!("Controller error for physical persistent volumes: {err}");
                }
            })
            .await;

        Ok(())
    }
}
