//! Syncer errors.

use thiserror::Error;

use cluster_client::ClientError;

/// Errors a reconciliation pass can return.
///
/// Every error is scoped to one pass; the external scheduler retries the
/// whole pass from a fresh read. Mutating-call errors are never swallowed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Store call failed
    #[error("store error: {0}")]
    Store(#[from] ClientError),

    /// Object is missing metadata the engine requires
    #[error("object is missing {0}")]
    MissingMetadata(&'static str),
}
