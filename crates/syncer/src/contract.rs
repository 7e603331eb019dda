//! The per-resource-kind syncer traits.

use kube_runtime::controller::Action;

use crate::context::SyncContext;
use crate::error::SyncError;

/// The core decision engine of one resource kind.
///
/// Implementations must be safe to invoke concurrently for different object
/// identities and tolerant of repeated invocation for the same identity;
/// per-identity serialization is the caller's job. No method may issue more
/// than one mutating store call per pass.
#[async_trait::async_trait]
pub trait Syncer<K>: Send + Sync {
    /// Kind name used in log output.
    fn name(&self) -> &'static str;

    /// Reconciles a virtual object whose physical counterpart is absent.
    async fn sync_down(&self, ctx: &SyncContext<K>, v_obj: K) -> Result<Action, SyncError>;

    /// Reconciles an existing (physical, virtual) pair.
    async fn sync(&self, ctx: &SyncContext<K>, p_obj: K, v_obj: K) -> Result<Action, SyncError>;
}

/// Optional capability: react to physical objects with no virtual counterpart.
#[async_trait::async_trait]
pub trait UpSyncer<K>: Send + Sync {
    /// Reconciles a physical object whose virtual counterpart is absent.
    async fn sync_up(&self, ctx: &SyncContext<K>, p_obj: K) -> Result<Action, SyncError>;
}

/// Name resolution between the two clusters.
///
/// The forward direction is a pure function; the reverse direction may
/// consult the physical-name index on the virtual store.
#[async_trait::async_trait]
pub trait NameResolver<K>: Send + Sync {
    /// Physical name a virtual identity maps to.
    fn virtual_to_physical(&self, name: &str, v_obj: Option<&K>) -> String;

    /// Virtual name a physical object maps back to; empty when resolution
    /// fails hard and the event should be dropped.
    async fn physical_to_virtual(&self, ctx: &SyncContext<K>, p_obj: &K) -> String;
}

/// Standalone probe for garbage-collection and adoption scans.
#[async_trait::async_trait]
pub trait ManagedProbe<K>: Send + Sync {
    /// Whether the physical object is managed by this virtual cluster.
    ///
    /// Lookup errors answer `false`: the scan prefers leaving an object
    /// alone over destructively claiming it when uncertain.
    async fn is_managed(&self, p_obj: &K) -> bool;
}
