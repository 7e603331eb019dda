//! Main controller implementation.
//!
//! This module contains the `Controller` struct that builds the clients for
//! both clusters, registers the field indices, and runs the two watch loops
//! for the persistent volume syncer.

use std::sync::Arc;

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tokio::task::JoinHandle;
use tracing::info;

use cluster_client::ApiClient;
use syncer::{MarkerOwnership, SyncContext};
use translate::{physical_name, INDEX_BY_PHYSICAL_NAME};

use crate::config::SyncerConfig;
use crate::dispatcher::SyncDispatcher;
use crate::error::ControllerError;
use crate::reconciler::{translate_volume_name, PersistentVolumeSyncer};
use crate::watcher::Watcher;

/// Main controller for persistent volume syncing.
pub struct Controller {
    virtual_watcher: JoinHandle<Result<(), ControllerError>>,
    physical_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: SyncerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Persistent Volume Syncer");

        // Host cluster client from the ambient configuration
        let physical_client = Client::try_default().await?;

        // Virtual cluster client, from its own kubeconfig when configured
        let virtual_client = match &config.virtual_kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                let kube_config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await?;
                Client::try_from(kube_config)?
            }
            None => Client::try_default().await?,
        };

        let virtual_volume_api: Api<PersistentVolume> = Api::all(virtual_client.clone());
        let physical_volume_api: Api<PersistentVolume> = Api::all(physical_client);
        let virtual_claim_api: Api<PersistentVolumeClaim> = Api::all(virtual_client);

        // Field indices: identity is recomputed from names, never stored
        let mut virtual_volumes = ApiClient::new(virtual_volume_api.clone());
        let target_namespace = config.target_namespace.clone();
        virtual_volumes.add_index(
            INDEX_BY_PHYSICAL_NAME,
            Arc::new(move |pv: &PersistentVolume| {
                vec![translate_volume_name(
                    &target_namespace,
                    pv.metadata.name.as_deref().unwrap_or_default(),
                    Some(pv),
                )]
            }),
        );

        let mut virtual_claims = ApiClient::new(virtual_claim_api.clone());
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
            Arc::new(virtual_volumes),
            Arc::new(ApiClient::new(physical_volume_api.clone())),
            config.target_namespace.clone(),
        );
        let pv_syncer = Arc::new(PersistentVolumeSyncer::new(
            config,
            Arc::new(virtual_claims),
            Arc::new(MarkerOwnership),
        ));
        let dispatcher = Arc::new(SyncDispatcher::new(ctx, pv_syncer));

        let watcher = Arc::new(Watcher::new(
            dispatcher,
            virtual_volume_api,
            physical_volume_api,
            virtual_claim_api,
        ));

        // Start watchers in background tasks
        let virtual_watcher = tokio::spawn({
            let watcher = Arc::clone(&watcher);
            async move { watcher.watch_virtual_volumes().await }
        });
        let physical_watcher =
            tokio::spawn(async move { watcher.watch_physical_volumes().await });

        Ok(Self {
            virtual_watcher,
            physical_watcher,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Persistent Volume Syncer running");

        // Wait for either watcher to exit (they should run forever)
        tokio::select! {
            result = &mut self.virtual_watcher => {
                result
                    .map_err(|e| ControllerError::Watch(format!("virtual volume watcher panicked: {e}")))?
                    .map_err(|e| ControllerError::Watch(format!("virtual volume watcher error: {e}")))?;
            }
            result = &mut self.physical_watcher => {
                result
                    .map_err(|e| ControllerError::Watch(format!("physical volume watcher panicked: {e}")))?
                    .map_err(|e| ControllerError::Watch(format!("physical volume watcher error: {e}")))?;
            }
        }

        Ok(())
    }
}
