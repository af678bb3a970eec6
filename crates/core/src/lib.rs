//! Secret retrieval for secretgate
//!
//! Provides a provider-neutral accessor that fetches the latest version of a
//! named secret from an external secret-storage service. The service client
//! sits behind the [`store`] capability traits so retrieval logic can be
//! tested without contacting any real network service.
//!
//! Retrieval is a single linear sequence: validate configuration, build the
//! resource path, open a session, issue one access request, release the
//! session, return the payload or an error. No caching, no retries, no
//! shared state between calls.
//!
//! ```ignore
//! use secretgate_core::{AccessorConfig, SecretAccessor};
//!
//! let accessor = SecretAccessor::new(AccessorConfig::from_env(), store);
//! let password = accessor.retrieve("db-password").await?;
//! ```

mod accessor;
mod config;
pub mod store;
mod types;

pub use accessor::SecretAccessor;
pub use config::{AccessorConfig, PROJECT_ID_ENV};
pub use store::{SecretSession, SecretStore, StoreError};
pub use types::SecretPayload;

// Store implementations live in separate crates:
// - secretgate-gcp: GcpSecretManager

use thiserror::Error;

/// Error types for secret retrieval
#[derive(Debug, Error)]
pub enum SecretError {
    /// No project id was configured; the store was never contacted
    #[error("project id is not configured; set the PROJECT_ID environment variable")]
    MissingProjectId,

    /// Failed to establish a session with the secret store
    #[error("failed to connect to the secret store: {message}")]
    Connection {
        /// Cause description from the store implementation
        message: String,
    },

    /// The store rejected or could not fulfil the access request
    #[error("failed to access secret '{name}': {message}")]
    Access {
        /// Secret name as supplied by the caller
        name: String,
        /// Underlying cause reported by the store
        message: String,
    },
}
