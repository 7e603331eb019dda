//! Shared reconciliation helpers.

use cluster_client::DeleteOptions;
use kube::Resource;
use kube_runtime::controller::Action;
use tracing::info;

use crate::context::SyncContext;
use crate::error::SyncError;

/// Deletes a physical object, treating an already-absent object as success.
///
/// Used by cleanup paths where a concurrent delete having won the race is
/// exactly the desired end state.
pub async fn delete_object<K>(ctx: &SyncContext<K>, p_obj: &K) -> Result<Action, SyncError>
where
    K: Resource,
{
    let name = p_obj
        .meta()
        .name
        .clone()
        .ok_or(SyncError::MissingMetadata("name"))?;
    match ctx.physical_objects.delete(&name, &DeleteOptions::default()).await {
        Ok(()) => Ok(Action::await_change()),
        Err(err) if err.is_not_found() => {
            info!("physical object {name} was already deleted");
            Ok(Action::await_change())
        }
        Err(err) => Err(err.into()),
    }
}
