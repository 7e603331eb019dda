//! Name translation between the virtual and the host cluster.
//!
//! There is no durable mapping table between virtual and physical objects:
//! identity is recomputed from naming conventions every time. Everything in
//! this crate is therefore a pure function of its inputs — translation must
//! yield the same physical name for the same virtual object on every call,
//! across restarts and across replicas.

pub mod marker;
pub mod names;

pub use marker::{cluster_identity, is_managed_cluster, MANAGED_BY_LABEL, NAME_ANNOTATION};
pub use names::{physical_name, physical_name_cluster_scoped, safe_concat, IDENTITY_PREFIX};

/// Field index keyed by the translated physical name of a virtual object.
pub const INDEX_BY_PHYSICAL_NAME: &str = "by-physical-name";
