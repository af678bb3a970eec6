//! Accessor configuration sourced from the process environment

use serde::{Deserialize, Serialize};

/// Environment variable naming the project that stores the secrets
pub const PROJECT_ID_ENV: &str = "PROJECT_ID";

/// Configuration for a [`SecretAccessor`](crate::SecretAccessor)
///
/// The only required field is the project id. It is carried explicitly so
/// retrieval logic can be exercised without mutating real process
/// environment state; [`AccessorConfig::from_env`] covers the common case of
/// reading it from `PROJECT_ID`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessorConfig {
    /// Id of the project that owns the secrets
    pub project_id: String,
}

impl AccessorConfig {
    /// Create a config with an explicit project id
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    /// Read the project id from the `PROJECT_ID` environment variable
    ///
    /// An unset variable yields an empty project id; retrieval then fails
    /// fast with [`SecretError::MissingProjectId`](crate::SecretError) on
    /// every call.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            project_id: std::env::var(PROJECT_ID_ENV).unwrap_or_default(),
        }
    }

    /// Check that a non-empty project id is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty()
    }

    /// Build the full resource path for the latest version of a secret
    ///
    /// The format must match the store's addressing scheme bit-exact:
    /// `projects/<projectId>/secrets/<secretName>/versions/latest`.
    #[must_use]
    pub fn resource_path(&self, secret_name: &str) -> String {
        format!(
            "projects/{}/secrets/{}/versions/latest",
            self.project_id, secret_name
        )
    }
}
