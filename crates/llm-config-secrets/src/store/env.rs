//! Environment-backed secret store stub
//!
//! For local development without a cloud account. The secret named `N` is
//! read from the environment variable `AWS_SECRET_<N>` (upper-cased, every
//! character that is not ASCII alphanumeric replaced with `_`), which must
//! hold the JSON secret string exactly as the real store would return it.
//!
//! ```text
//! AWS_SECRET_MY_APP_PROD='{"username": "admin", "database__host": "localhost"}'
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{RawSecretRecord, SecretStoreClient, SecretStoreConnector};
use crate::config::ClientOptions;
use crate::error::{Result, StoreError};

/// Variable name prefix used by [`EnvSecretStore`]
pub const ENV_SECRET_PREFIX: &str = "AWS_SECRET_";

/// Build the environment variable name for a secret
pub fn env_var_name(secret_name: &str) -> String {
    let normalized: String = secret_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", ENV_SECRET_PREFIX, normalized)
}

/// Stub client that serves secrets from environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore {
    region: Option<String>,
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region recorded at connect time, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

#[async_trait]
impl SecretStoreClient for EnvSecretStore {
    async fn fetch(&self, secret_name: &str) -> std::result::Result<RawSecretRecord, StoreError> {
        let var_name = env_var_name(secret_name);

        match std::env::var(&var_name) {
            Ok(value) => {
                let arn = format!(
                    "arn:aws:secretsmanager:{}:000000000000:secret:{}",
                    self.region.as_deref().unwrap_or("local"),
                    secret_name
                );
                Ok(RawSecretRecord::text(secret_name, value)
                    .with_arn(arn)
                    .with_version(format!("env:{}", var_name)))
            }
            Err(std::env::VarError::NotPresent) => Err(StoreError::from_code(
                secret_name,
                "ResourceNotFoundException",
                format!("environment variable {} is not set", var_name),
            )),
            Err(std::env::VarError::NotUnicode(_)) => Err(StoreError::from_code(
                secret_name,
                "InvalidRequestException",
                format!("environment variable {} contains invalid UTF-8", var_name),
            )),
        }
    }

    fn close(&self) {}
}

#[async_trait]
impl SecretStoreConnector for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn SecretStoreClient>> {
        Ok(Arc::new(Self {
            region: options.region.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("my-app/prod"), "AWS_SECRET_MY_APP_PROD");
        assert_eq!(env_var_name("Testing.Secret"), "AWS_SECRET_TESTING_SECRET");
    }

    #[tokio::test]
    async fn test_env_store_reads_json_string() {
        std::env::set_var("AWS_SECRET_ENV_STORE_TEST_APP", r#"{"username": "admin"}"#);

        let connector = EnvSecretStore::new();
        let client = connector
            .connect(&ClientOptions::default().with_region("eu-west-1"))
            .await
            .unwrap();
        let record = client.fetch("env-store-test-app").await.unwrap();

        std::env::remove_var("AWS_SECRET_ENV_STORE_TEST_APP");

        assert_eq!(record.name, "env-store-test-app");
        assert!(record.arn.contains("eu-west-1"));
    }

    #[tokio::test]
    async fn test_env_store_not_found() {
        let store = EnvSecretStore::new();
        let err = store.fetch("env-store-missing").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::ResourceNotFound);
    }
}
