//! Latest-version secret retrieval

use crate::store::{SecretSession, SecretStore};
use crate::{AccessorConfig, SecretError, SecretPayload};
use tracing::{debug, error};

/// Retrieves the latest version of named secrets from a secret store.
///
/// Each call opens its own session and releases it before returning, so the
/// accessor is safe to share across concurrent call sites; there is no
/// shared mutable state, no coalescing of in-flight requests, and no
/// internal retry. Dropping the returned future aborts the in-flight
/// request.
pub struct SecretAccessor<S> {
    config: AccessorConfig,
    store: S,
}

impl<S> std::fmt::Debug for SecretAccessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAccessor")
            .field("project_id", &self.config.project_id)
            .finish()
    }
}

impl<S: SecretStore> SecretAccessor<S> {
    /// Create an accessor from an explicit config and a store
    #[must_use]
    pub fn new(config: AccessorConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Create an accessor configured from the `PROJECT_ID` environment variable
    #[must_use]
    pub fn from_env(store: S) -> Self {
        Self::new(AccessorConfig::from_env(), store)
    }

    /// Get the accessor configuration
    #[must_use]
    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    /// Retrieve the latest version of a secret as text.
    ///
    /// The secret name is passed through to the store untouched; an unknown
    /// or malformed name is rejected by the service, not here.
    ///
    /// # Errors
    ///
    /// - [`SecretError::MissingProjectId`] if no project id is configured;
    ///   the store is not contacted.
    /// - [`SecretError::Connection`] if the session cannot be established.
    /// - [`SecretError::Access`] if the access request fails or the payload
    ///   is not valid UTF-8.
    pub async fn retrieve(&self, secret_name: &str) -> Result<String, SecretError> {
        let bytes = self.access(secret_name).await?;
        String::from_utf8(bytes).map_err(|e| Self::invalid_utf8(secret_name, &e))
    }

    /// Retrieve the latest version of a secret as a redacting payload.
    ///
    /// The returned [`SecretPayload`] zeroes its memory on drop and renders
    /// as `[REDACTED]` in Debug output.
    ///
    /// # Errors
    ///
    /// Same conditions as [`retrieve`](Self::retrieve).
    pub async fn retrieve_secure(&self, secret_name: &str) -> Result<SecretPayload, SecretError> {
        let bytes = self.access(secret_name).await?;
        SecretPayload::from_utf8(bytes).map_err(|e| Self::invalid_utf8(secret_name, &e))
    }

    fn invalid_utf8(secret_name: &str, cause: &std::string::FromUtf8Error) -> SecretError {
        error!(secret_name, "secret payload is not valid UTF-8");
        SecretError::Access {
            name: secret_name.to_string(),
            message: format!("payload is not valid UTF-8: {cause}"),
        }
    }

    /// One linear pass: validate config, open a session, issue the single
    /// access request, release the session, surface the raw payload.
    async fn access(&self, secret_name: &str) -> Result<Vec<u8>, SecretError> {
        if !self.config.is_configured() {
            error!(
                secret_name,
                "project id is not configured; refusing to contact the secret store"
            );
            return Err(SecretError::MissingProjectId);
        }

        let path = self.config.resource_path(secret_name);
        debug!(secret_name, path = %path, "accessing latest secret version");

        let mut session =
            self.store
                .connect()
                .await
                .map_err(|e| SecretError::Connection {
                    message: e.to_string(),
                })?;

        let outcome = session.access_latest(&path).await;
        // Release the session before surfacing any result.
        session.close().await;

        outcome.map_err(|e| {
            error!(secret_name, error = %e, "failed to access secret version");
            SecretError::Access {
                name: secret_name.to_string(),
                message: e.to_string(),
            }
        })
    }
}
