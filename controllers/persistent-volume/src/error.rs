//! Controller-specific error types.
//!
//! This module defines error types specific to the persistent volume syncer
//! that are not covered by upstream library errors.

use thiserror::Error;

use cluster_client::ClientError;
use kube::Error as KubeError;
use syncer::SyncError;

/// Errors that can occur in the Persistent Volume Syncer.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Kubeconfig could not be read or converted
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Object store error
    #[error("store error: {0}")]
    Store(#[from] ClientError),

    /// Reconciliation error
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
