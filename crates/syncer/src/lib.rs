//! Syncer contract between a virtual cluster and its host cluster.
//!
//! Each resource kind implements one syncer: `SyncDown` projects virtual
//! objects into the host cluster, `Sync` reconciles an existing pair, and
//! `SyncUp` decides what to do with a physical object that has no virtual
//! counterpart. The external controller runtime resolves the (virtual,
//! physical) pair for every change notification and dispatches to exactly
//! one of the three; every pass issues at most one mutating store call.
//!
//! The contract is capability-based: a kind's syncer implements [`Syncer`]
//! and opts into [`UpSyncer`], [`NameResolver`] and [`ManagedProbe`] as its
//! semantics require.

pub mod context;
pub mod contract;
pub mod error;
pub mod helpers;
pub mod ownership;

pub use context::SyncContext;
pub use contract::{ManagedProbe, NameResolver, Syncer, UpSyncer};
pub use error::SyncError;
pub use helpers::delete_object;
pub use ownership::{MarkerOwnership, OwnershipTest};
