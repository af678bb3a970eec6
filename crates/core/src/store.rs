//! Store capability traits implemented by secret-storage providers
//!
//! The accessor consumes exactly one capability from the external service:
//! fetch the latest version of a secret addressed by a full resource path.
//! Authentication, transport security, retry and backoff all belong to the
//! implementation behind these traits.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a store implementation
///
/// Carries only a cause description; the accessor classifies it into the
/// public [`SecretError`](crate::SecretError) taxonomy and attaches the
/// secret name where appropriate.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    /// Cause description from the underlying client
    pub message: String,
}

impl StoreError {
    /// Create a store error from a cause description
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A secret-storage service reachable through short-lived sessions
///
/// One session is opened per retrieval call and released before the call
/// returns, on success and failure paths alike.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Session type produced by [`connect`](SecretStore::connect)
    type Session: SecretSession;

    /// Establish a session with the external service
    async fn connect(&self) -> Result<Self::Session, StoreError>;
}

/// A single session against a secret-storage service
#[async_trait]
pub trait SecretSession: Send {
    /// Fetch the latest-version payload addressed by a full resource path
    ///
    /// The path has the form
    /// `projects/<projectId>/secrets/<secretName>/versions/latest` and is
    /// passed through untouched; name validation is the service's job.
    async fn access_latest(&mut self, resource_path: &str) -> Result<Vec<u8>, StoreError>;

    /// Release the session
    async fn close(&mut self);
}
