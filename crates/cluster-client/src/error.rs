//! Cluster store client errors

use thiserror::Error;

/// Errors that can occur when talking to a cluster's object store
#[derive(Debug, Error)]
pub enum ClientError {
    /// Object not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Write rejected by the store's optimistic-concurrency check
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Queried index was never registered on this client
    #[error("unknown index: {0}")]
    UnknownIndex(String),

    /// Store temporarily unavailable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Object is missing required metadata
    #[error("invalid object: missing {0}")]
    InvalidObject(&'static str),
}

impl ClientError {
    /// Whether this error is the not-found signal.
    ///
    /// Not-found is the expected outcome for lookups and deletes of
    /// already-absent objects and is treated as success on delete paths.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound(response.message),
            kube::Error::Api(response) if response.code == 409 => Self::Conflict(response.message),
            other => Self::Kube(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_404_maps_to_not_found() {
        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "persistentvolumes \"pv-data\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        });
        assert!(ClientError::from(err).is_not_found());
    }

    #[test]
    fn test_api_409_maps_to_conflict() {
        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "the object has been modified".to_string(),
            reason: "Conflict".to_string(),
            code: 409,
        });
        assert!(matches!(ClientError::from(err), ClientError::Conflict(_)));
    }
}
