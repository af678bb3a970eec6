//! End-to-end retrieval with configuration sourced from the environment.

use async_trait::async_trait;
use secretgate_core::store::{SecretSession, SecretStore, StoreError};
use secretgate_core::{PROJECT_ID_ENV, SecretAccessor, SecretError};

/// Store that knows a single secret at a single resource path.
struct SingleSecretStore {
    path: String,
    payload: Vec<u8>,
}

struct SingleSecretSession {
    path: String,
    payload: Vec<u8>,
}

#[async_trait]
impl SecretStore for SingleSecretStore {
    type Session = SingleSecretSession;

    async fn connect(&self) -> Result<Self::Session, StoreError> {
        Ok(SingleSecretSession {
            path: self.path.clone(),
            payload: self.payload.clone(),
        })
    }
}

#[async_trait]
impl SecretSession for SingleSecretSession {
    async fn access_latest(&mut self, resource_path: &str) -> Result<Vec<u8>, StoreError> {
        if resource_path == self.path {
            Ok(self.payload.clone())
        } else {
            Err(StoreError::new(format!("secret not found: {resource_path}")))
        }
    }

    async fn close(&mut self) {}
}

#[tokio::test]
async fn retrieves_with_project_id_from_environment() {
    temp_env::async_with_vars([(PROJECT_ID_ENV, Some("proj-1"))], async {
        let store = SingleSecretStore {
            path: "projects/proj-1/secrets/db-password/versions/latest".to_string(),
            payload: b"s3cr3t".to_vec(),
        };
        let accessor = SecretAccessor::from_env(store);

        let value = accessor.retrieve("db-password").await.unwrap();
        assert_eq!(value, "s3cr3t");
    })
    .await;
}

#[tokio::test]
async fn unset_project_id_fails_every_retrieval() {
    temp_env::async_with_vars([(PROJECT_ID_ENV, None::<&str>)], async {
        let store = SingleSecretStore {
            path: "projects/proj-1/secrets/db-password/versions/latest".to_string(),
            payload: b"s3cr3t".to_vec(),
        };
        let accessor = SecretAccessor::from_env(store);

        let result = accessor.retrieve("db-password").await;
        assert!(matches!(result, Err(SecretError::MissingProjectId)));
    })
    .await;
}

#[tokio::test]
async fn unknown_secret_surfaces_access_error_with_name() {
    temp_env::async_with_vars([(PROJECT_ID_ENV, Some("proj-1"))], async {
        let store = SingleSecretStore {
            path: "projects/proj-1/secrets/db-password/versions/latest".to_string(),
            payload: b"s3cr3t".to_vec(),
        };
        let accessor = SecretAccessor::from_env(store);

        let result = accessor.retrieve("missing-secret").await;
        match result {
            Err(SecretError::Access { name, .. }) => assert_eq!(name, "missing-secret"),
            other => panic!("expected access error, got {other:?}"),
        }
    })
    .await;
}
