//! Google Cloud Secret Manager store with auto-negotiating dual-mode (HTTP + CLI)

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use secretgate_core::store::{SecretSession, SecretStore, StoreError};
use secretgate_core::{SecretAccessor, SecretError};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Components of a secret version resource path
///
/// Format: `projects/PROJECT/secrets/SECRET/versions/VERSION`
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourceName {
    project: String,
    secret: String,
    version: String,
}

impl ResourceName {
    /// Parse a resource path into its components
    fn parse(resource_path: &str) -> Option<Self> {
        let parts: Vec<&str> = resource_path.split('/').collect();
        if parts.len() >= 6
            && parts[0] == "projects"
            && parts[2] == "secrets"
            && parts[4] == "versions"
        {
            Some(Self {
                project: parts[1].to_string(),
                secret: parts[3].to_string(),
                version: parts[5].to_string(),
            })
        } else {
            None
        }
    }
}

/// Secret Manager store backed by Google Cloud
///
/// Mode is auto-negotiated based on environment:
/// - If `GOOGLE_OAUTH_ACCESS_TOKEN` or `GOOGLE_APPLICATION_CREDENTIALS` is
///   set → HTTP mode (REST access with a bearer token)
/// - Otherwise → CLI mode (uses the `gcloud` CLI)
///
/// Each retrieval opens one short-lived [`GcpSession`] and releases it
/// before the call returns. Authentication, transport security and retry
/// policy stay inside this crate; callers only see the store capability.
pub struct GcpSecretManager {
    use_http: bool,
    endpoint: String,
}

impl std::fmt::Debug for GcpSecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpSecretManager")
            .field("mode", &if self.use_http { "http" } else { "cli" })
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for GcpSecretManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GcpSecretManager {
    /// Create a store with auto-detected mode and the default endpoint
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_http: Self::http_credentials_available(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the Secret Manager endpoint (emulators, tests)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Check if bearer credentials are available in environment
    fn http_credentials_available() -> bool {
        std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").is_ok()
            || std::env::var("GOOGLE_APPLICATION_CREDENTIALS").is_ok()
    }

    /// Resolve a bearer token for HTTP mode
    ///
    /// Prefers an explicit `GOOGLE_OAUTH_ACCESS_TOKEN`, then mints one via
    /// `gcloud auth print-access-token` using the ambient credentials.
    async fn bearer_token() -> Result<String, StoreError> {
        if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            return Ok(token);
        }

        let output = Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| StoreError::new(format!("failed to execute gcloud CLI: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoreError::new(format!(
                "gcloud auth print-access-token failed: {stderr}"
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl SecretStore for GcpSecretManager {
    type Session = GcpSession;

    async fn connect(&self) -> Result<Self::Session, StoreError> {
        let inner = if self.use_http {
            let token = Self::bearer_token().await?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .map_err(|e| StoreError::new(format!("failed to build HTTP client: {e}")))?;
            SessionInner::Http {
                client,
                token,
                endpoint: self.endpoint.clone(),
            }
        } else {
            SessionInner::Cli
        };

        debug!(
            mode = if self.use_http { "http" } else { "cli" },
            "opened secret manager session"
        );
        Ok(GcpSession { inner: Some(inner) })
    }
}

enum SessionInner {
    Http {
        client: reqwest::Client,
        token: String,
        endpoint: String,
    },
    Cli,
}

/// One session against Secret Manager; released by [`SecretSession::close`]
pub struct GcpSession {
    inner: Option<SessionInner>,
}

#[async_trait]
impl SecretSession for GcpSession {
    async fn access_latest(&mut self, resource_path: &str) -> Result<Vec<u8>, StoreError> {
        match self
            .inner
            .as_ref()
            .ok_or_else(|| StoreError::new("session is closed"))?
        {
            SessionInner::Http {
                client,
                token,
                endpoint,
            } => access_http(client, token, endpoint, resource_path).await,
            SessionInner::Cli => access_cli(resource_path).await,
        }
    }

    async fn close(&mut self) {
        // Drops the HTTP client and bearer token held for this call.
        self.inner = None;
        debug!("released secret manager session");
    }
}

/// Build the REST access URL for a resource path
fn access_url(endpoint: &str, resource_path: &str) -> String {
    format!("{endpoint}/{resource_path}:access")
}

async fn access_http(
    client: &reqwest::Client,
    token: &str,
    endpoint: &str,
    resource_path: &str,
) -> Result<Vec<u8>, StoreError> {
    let url = access_url(endpoint, resource_path);
    debug!(%url, "accessing secret version over HTTP");

    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| StoreError::new(format!("access request failed: {e}")))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(StoreError::new(format!(
            "access secret version failed: {status} {body}"
        )));
    }

    decode_access_response(&body)
}

/// Decode the JSON body of an `:access` response into payload bytes
fn decode_access_response(body: &str) -> Result<Vec<u8>, StoreError> {
    let parsed: AccessSecretVersionResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::new(format!("failed to decode access response: {e}")))?;

    let data = parsed
        .payload
        .and_then(|payload| payload.data)
        .ok_or_else(|| StoreError::new("secret payload missing data"))?;

    STANDARD
        .decode(data)
        .map_err(|e| StoreError::new(format!("base64 decode failed: {e}")))
}

async fn access_cli(resource_path: &str) -> Result<Vec<u8>, StoreError> {
    let name = ResourceName::parse(resource_path)
        .ok_or_else(|| StoreError::new(format!("invalid resource path: {resource_path}")))?;

    let output = Command::new("gcloud")
        .args([
            "secrets",
            "versions",
            "access",
            &name.version,
            "--secret",
            &name.secret,
            "--project",
            &name.project,
        ])
        .output()
        .await
        .map_err(|e| StoreError::new(format!("failed to execute gcloud CLI: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StoreError::new(format!("gcloud CLI failed: {stderr}")));
    }

    Ok(output.stdout)
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: Option<SecretPayload>,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: Option<String>,
}

/// Retrieve the latest version of a secret from Google Cloud Secret Manager.
///
/// The project id is read from the `PROJECT_ID` environment variable; the
/// secret is identified by `secret_name`. One session is opened and released
/// per call.
///
/// # Errors
///
/// - [`SecretError::MissingProjectId`] when `PROJECT_ID` is unset or empty.
/// - [`SecretError::Connection`] when no session could be established.
/// - [`SecretError::Access`] when Secret Manager rejects the request.
pub async fn retrieve_secret(secret_name: &str) -> Result<String, SecretError> {
    let accessor = SecretAccessor::from_env(GcpSecretManager::new());
    accessor.retrieve(secret_name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_name() {
        let name = ResourceName::parse("projects/my-project/secrets/my-secret/versions/5").unwrap();
        assert_eq!(name.project, "my-project");
        assert_eq!(name.secret, "my-secret");
        assert_eq!(name.version, "5");
    }

    #[test]
    fn test_parse_resource_name_with_latest() {
        let name =
            ResourceName::parse("projects/my-project/secrets/my-secret/versions/latest").unwrap();
        assert_eq!(name.version, "latest");
    }

    #[test]
    fn test_parse_invalid_resource_name() {
        assert!(ResourceName::parse("invalid/path").is_none());
        assert!(ResourceName::parse("my-project/secrets/my-secret/versions/1").is_none());
        assert!(ResourceName::parse("projects/my-project/my-secret/versions/1").is_none());
        assert!(ResourceName::parse("projects/my-project/secrets/my-secret/1").is_none());
        assert!(ResourceName::parse("projects/my-project/secrets").is_none());
    }

    #[test]
    fn test_access_url() {
        assert_eq!(
            access_url(
                "https://secretmanager.googleapis.com/v1",
                "projects/proj-1/secrets/db-password/versions/latest"
            ),
            "https://secretmanager.googleapis.com/v1/projects/proj-1/secrets/db-password/versions/latest:access"
        );
    }

    #[test]
    fn test_with_endpoint_trims_trailing_slash() {
        let store = GcpSecretManager::new().with_endpoint("http://localhost:8085/v1/");
        assert_eq!(store.endpoint, "http://localhost:8085/v1");
    }

    #[test]
    fn test_mode_detection_without_credentials() {
        temp_env::with_vars(
            [
                ("GOOGLE_OAUTH_ACCESS_TOKEN", None::<&str>),
                ("GOOGLE_APPLICATION_CREDENTIALS", None::<&str>),
            ],
            || {
                let store = GcpSecretManager::new();
                assert!(!store.use_http);
            },
        );
    }

    #[test]
    fn test_mode_detection_with_access_token() {
        temp_env::with_vars([("GOOGLE_OAUTH_ACCESS_TOKEN", Some("token"))], || {
            let store = GcpSecretManager::new();
            assert!(store.use_http);
        });
    }

    #[test]
    fn test_decode_access_response() {
        let body = r#"{"name":"projects/1/secrets/s/versions/1","payload":{"data":"czNjcjN0"}}"#;
        let bytes = decode_access_response(body).unwrap();
        assert_eq!(bytes, b"s3cr3t");
    }

    #[test]
    fn test_decode_access_response_missing_payload() {
        let err = decode_access_response("{}").unwrap_err();
        assert!(err.to_string().contains("missing data"));
    }

    #[test]
    fn test_decode_access_response_bad_base64() {
        let body = r#"{"payload":{"data":"%%%"}}"#;
        let err = decode_access_response(body).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_access() {
        let mut session = GcpSession {
            inner: Some(SessionInner::Cli),
        };
        session.close().await;
        let err = session
            .access_latest("projects/p/secrets/s/versions/latest")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_store_debug_shows_mode() {
        let store = GcpSecretManager {
            use_http: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        };
        let debug = format!("{store:?}");
        assert!(debug.contains("cli"));
    }
}
