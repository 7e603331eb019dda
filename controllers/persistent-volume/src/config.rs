//! Syncer configuration.
//!
//! All configuration is explicit and passed at construction time; nothing
//! is read from globals after startup.

use std::env;

use crate::error::ControllerError;

/// Configuration of one persistent volume syncer instance.
#[derive(Debug, Clone)]
pub struct SyncerConfig {
    /// Host namespace all virtual objects are projected into.
    pub target_namespace: String,
    /// Path to the virtual cluster's kubeconfig; the ambient config is used
    /// when unset.
    pub virtual_kubeconfig: Option<String>,
}

impl SyncerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ControllerError> {
        let target_namespace = env::var("TARGET_NAMESPACE").map_err(|_| {
            ControllerError::InvalidConfig(
                "TARGET_NAMESPACE environment variable is required".to_string(),
            )
        })?;
        let virtual_kubeconfig = env::var("VIRTUAL_KUBECONFIG").ok();

        Ok(Self {
            target_namespace,
            virtual_kubeconfig,
        })
    }
}
