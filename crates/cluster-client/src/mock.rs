//! Mock object-store client for unit testing
//!
//! This module provides an in-memory implementation of [`ObjectClient`] that
//! can be used in unit tests without a running cluster. Besides the stored
//! objects it keeps a log of every mutating call, so tests can assert
//! exactly which mutations a reconciliation pass performed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kube::Resource;

use crate::error::ClientError;
use crate::store_trait::{DeleteOptions, IndexExtractor, ObjectClient};

/// One recorded mutating call, keyed by object name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// `create` was called
    Created(String),
    /// `update` was called
    Updated(String),
    /// `update_status` was called
    UpdatedStatus(String),
    /// `delete` was called
    Deleted(String),
}

/// Mock object-store client for testing
#[derive(Clone)]
pub struct MockClient<K> {
    objects: Arc<Mutex<HashMap<String, K>>>,
    indices: Arc<Mutex<HashMap<&'static str, IndexExtractor<K>>>>,
    actions: Arc<Mutex<Vec<MockAction>>>,
    lookup_error: Arc<Mutex<Option<String>>>,
}

impl<K> MockClient<K>
where
    K: Resource + Clone,
{
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            indices: Arc::new(Mutex::new(HashMap::new())),
            actions: Arc::new(Mutex::new(Vec::new())),
            lookup_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Add an object to the mock store (for test setup)
    pub fn insert(&self, obj: K) {
        let name = obj.meta().name.clone().unwrap_or_default();
        self.objects.lock().unwrap().insert(name, obj);
    }

    /// Register a named index extractor, mirroring `ApiClient::add_index`
    pub fn add_index(&self, name: &'static str, extract: IndexExtractor<K>) {
        self.indices.lock().unwrap().insert(name, extract);
    }

    /// Make every subsequent `get_by_index` fail with a transient error
    pub fn fail_lookups(&self, message: &str) {
        *self.lookup_error.lock().unwrap() = Some(message.to_string());
    }

    /// Fetch a stored object by name without recording an action
    pub fn get_named(&self, name: &str) -> Option<K> {
        self.objects.lock().unwrap().get(name).cloned()
    }

    /// All mutating calls recorded so far
    pub fn actions(&self) -> Vec<MockAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Drop the recorded actions (between test phases)
    pub fn clear_actions(&self) {
        self.actions.lock().unwrap().clear();
    }

    fn record(&self, action: MockAction) {
        self.actions.lock().unwrap().push(action);
    }
}

impl<K> Default for MockClient<K>
where
    K: Resource + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<K> ObjectClient<K> for MockClient<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K, ClientError> {
        self.objects
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }

    async fn create(&self, obj: &K) -> Result<K, ClientError> {
        let name = obj.meta().name.clone().ok_or(ClientError::InvalidObject("name"))?;
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&name) {
            return Err(ClientError::Conflict(format!("{name} already exists")));
        }
        objects.insert(name.clone(), obj.clone());
        self.record(MockAction::Created(name));
        Ok(obj.clone())
    }

    async fn update(&self, obj: &K) -> Result<K, ClientError> {
        let name = obj.meta().name.clone().ok_or(ClientError::InvalidObject("name"))?;
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&name) {
            return Err(ClientError::NotFound(name));
        }
        objects.insert(name.clone(), obj.clone());
        self.record(MockAction::Updated(name));
        Ok(obj.clone())
    }

    async fn update_status(&self, obj: &K) -> Result<K, ClientError> {
        let name = obj.meta().name.clone().ok_or(ClientError::InvalidObject("name"))?;
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&name) {
            return Err(ClientError::NotFound(name));
        }
        objects.insert(name.clone(), obj.clone());
        self.record(MockAction::UpdatedStatus(name));
        Ok(obj.clone())
    }

    async fn delete(&self, name: &str, options: &DeleteOptions) -> Result<(), ClientError> {
        let mut objects = self.objects.lock().unwrap();
        let Some(existing) = objects.get(name) else {
            return Err(ClientError::NotFound(name.to_string()));
        };
        if let Some(expected_uid) = &options.precondition_uid {
            if existing.meta().uid.as_ref() != Some(expected_uid) {
                return Err(ClientError::Conflict(format!(
                    "uid precondition failed for {name}"
                )));
            }
        }
        objects.remove(name);
        self.record(MockAction::Deleted(name.to_string()));
        Ok(())
    }

    async fn get_by_index(&self, index: &str, key: &str) -> Result<K, ClientError> {
        if let Some(message) = self.lookup_error.lock().unwrap().clone() {
            return Err(ClientError::Unavailable(message));
        }
        let indices = self.indices.lock().unwrap();
        let extract = indices
            .get(index)
            .ok_or_else(|| ClientError::UnknownIndex(index.to_string()))?;
        self.objects
            .lock()
            .unwrap()
            .values()
            .find(|obj| extract(obj).iter().any(|indexed| indexed == key))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("no object indexed under {index}={key}")))
    }
}
