//! Persistent Volume Syncer
//!
//! Projects persistent volumes of a virtual cluster into the host cluster
//! and back:
//! - virtual volumes are created on the host under a translated name
//! - host-side binding and status changes flow back into the virtual object
//! - pre-existing host volumes matching a virtual claim are adopted
//!
//! Identity between the two sides is recomputed from naming conventions on
//! every pass; there is no durable mapping table.

mod config;
mod controller;
mod dispatcher;
mod error;
mod reconciler;
mod translator;
mod watcher;

#[cfg(test)]
mod test_utils;

use controller::Controller;
use crate::config::SyncerConfig;
use crate::error::ControllerError;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Persistent Volume Syncer");

    let config = SyncerConfig::from_env()?;

    info!("Configuration:");
    info!("  Target namespace: {}", config.target_namespace);
    info!(
        "  Virtual kubeconfig: {}",
        config.virtual_kubeconfig.as_deref().unwrap_or("ambient")
    );

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
