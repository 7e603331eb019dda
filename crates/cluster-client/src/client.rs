//! Kube-backed object-store client.

use std::collections::HashMap;
use std::fmt::Debug;

use kube::api::{DeleteParams, ListParams, PostParams, Preconditions};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::store_trait::{DeleteOptions, IndexExtractor, ObjectClient};

/// Object-store client backed by a `kube::Api`.
///
/// Indices are registered once at startup and evaluated against the listed
/// objects on lookup; in production the list is served by the watch cache,
/// not by a live round trip per object.
pub struct ApiClient<K> {
    api: Api<K>,
    indices: HashMap<&'static str, IndexExtractor<K>>,
}

impl<K> ApiClient<K> {
    /// Creates a client around an existing API handle.
    pub fn new(api: Api<K>) -> Self {
        Self {
            api,
            indices: HashMap::new(),
        }
    }

    /// Registers a named index extractor. Declarative, startup-only.
    pub fn add_index(&mut self, name: &'static str, extract: IndexExtractor<K>) {
        self.indices.insert(name, extract);
    }
}

#[async_trait::async_trait]
impl<K> ObjectClient<K> for ApiClient<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K, ClientError> {
        Ok(self.api.get(name).await?)
    }

    async fn create(&self, obj: &K) -> Result<K, ClientError> {
        Ok(self.api.create(&PostParams::default(), obj).await?)
    }

    async fn update(&self, obj: &K) -> Result<K, ClientError> {
        let name = obj.meta().name.clone().ok_or(ClientError::InvalidObject("name"))?;
        Ok(self.api.replace(&name, &PostParams::default(), obj).await?)
    }

    async fn update_status(&self, obj: &K) -> Result<K, ClientError> {
        let name = obj.meta().name.clone().ok_or(ClientError::InvalidObject("name"))?;
        let data = serde_json::to_vec(obj)?;
        Ok(self.api.replace_status(&name, &PostParams::default(), data).await?)
    }

    async fn delete(&self, name: &str, options: &DeleteOptions) -> Result<(), ClientError> {
        let params = DeleteParams {
            grace_period_seconds: options
                .grace_period_seconds
                .and_then(|grace| u32::try_from(grace).ok()),
            preconditions: options.precondition_uid.clone().map(|uid| Preconditions {
                uid: Some(uid),
                resource_version: None,
            }),
            ..DeleteParams::default()
        };
        self.api.delete(name, &params).await?;
        Ok(())
    }

    async fn get_by_index(&self, index: &str, key: &str) -> Result<K, ClientError> {
        let extract = self
            .indices
            .get(index)
            .ok_or_else(|| ClientError::UnknownIndex(index.to_string()))?;
        let list = self.api.list(&ListParams::default()).await?;
        list.items
            .into_iter()
            .find(|obj| extract(obj).iter().any(|indexed| indexed == key))
            .ok_or_else(|| ClientError::NotFound(format!("no object indexed under {index}={key}")))
    }
}
