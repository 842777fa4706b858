//! Core traits for secret store clients
//!
//! The manager never talks to a cloud SDK directly. It asks a
//! [`SecretStoreConnector`] for a client once, then fetches whole secret
//! records through [`SecretStoreClient`]. Decoding the payload is the
//! manager's job; clients return it exactly as the store delivered it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ClientOptions;
use crate::error::{Result, StoreError};

/// Request metadata returned alongside a fetched secret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub request_id: Option<String>,
    pub http_status_code: Option<u16>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
    #[serde(default)]
    pub retry_attempts: u32,
}

/// Secret payload as delivered by the store
#[derive(Debug, Clone, PartialEq)]
pub enum SecretPayload {
    /// Base64 text of a binary secret
    Binary(String),
    /// JSON text of a string secret
    Text(String),
}

/// One undecoded secret record
#[derive(Debug, Clone, PartialEq)]
pub struct RawSecretRecord {
    /// Store identifier (ARN or equivalent)
    pub arn: String,
    /// Logical secret name
    pub name: String,
    /// Version token
    pub version_id: String,
    /// Stage labels attached to this version
    pub version_stages: Vec<String>,
    pub created_date: DateTime<Utc>,
    pub payload: SecretPayload,
    pub response_metadata: ResponseMetadata,
}

impl RawSecretRecord {
    /// Create a record holding a JSON string payload
    pub fn text(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self::with_payload(name, SecretPayload::Text(json.into()))
    }

    /// Create a record holding a base64 binary payload
    pub fn binary(name: impl Into<String>, base64: impl Into<String>) -> Self {
        Self::with_payload(name, SecretPayload::Binary(base64.into()))
    }

    fn with_payload(name: impl Into<String>, payload: SecretPayload) -> Self {
        let name = name.into();
        Self {
            arn: format!("arn:local:secret:{}", name),
            name,
            version_id: String::new(),
            version_stages: vec!["AWSCURRENT".to_string()],
            created_date: Utc::now(),
            payload,
            response_metadata: ResponseMetadata::default(),
        }
    }

    /// Set the store identifier
    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = arn.into();
        self
    }

    /// Set the version token
    pub fn with_version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = version_id.into();
        self
    }

    /// Set the creation timestamp
    pub fn with_created_date(mut self, created_date: DateTime<Utc>) -> Self {
        self.created_date = created_date;
        self
    }
}

/// A connected secret store client
///
/// # Error Handling
///
/// Clients report failures as [`StoreError`] carrying the store's raw error
/// code; the code is classified by [`StoreError::from_code`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStoreClient: Send + Sync {
    /// Fetch the current version of a secret
    async fn fetch(&self, secret_name: &str) -> std::result::Result<RawSecretRecord, StoreError>;

    /// Release the connection
    ///
    /// Must be idempotent; the manager may call it on explicit close and
    /// again on drop.
    fn close(&self);
}

/// Builds secret store clients
///
/// The manager connects lazily, on the first load that needs a client, and
/// reuses the client until it is closed.
#[async_trait]
pub trait SecretStoreConnector: Send + Sync {
    /// Short name used in log events
    fn name(&self) -> &str;

    /// Establish a client with the given options
    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn SecretStoreClient>>;
}

/// Connector that hands out one pre-built client
pub struct StaticConnector {
    client: Arc<dyn SecretStoreClient>,
}

impl StaticConnector {
    pub fn new(client: Arc<dyn SecretStoreClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for StaticConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticConnector").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretStoreConnector for StaticConnector {
    fn name(&self) -> &str {
        "static"
    }

    async fn connect(&self, _options: &ClientOptions) -> Result<Arc<dyn SecretStoreClient>> {
        Ok(Arc::clone(&self.client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builders() {
        let record = RawSecretRecord::text("app", r#"{"a": "1"}"#)
            .with_version("v1")
            .with_arn("arn:aws:secretsmanager:us-east-1:123:secret:app");
        assert_eq!(record.name, "app");
        assert_eq!(record.version_id, "v1");
        assert_eq!(record.version_stages, vec!["AWSCURRENT".to_string()]);
        assert!(matches!(record.payload, SecretPayload::Text(_)));

        let binary = RawSecretRecord::binary("blob", "e30=");
        assert_eq!(binary.payload, SecretPayload::Binary("e30=".to_string()));
    }

    #[tokio::test]
    async fn test_static_connector_returns_same_client() {
        let mut mock = MockSecretStoreClient::new();
        mock.expect_close().return_const(());
        let client: Arc<dyn SecretStoreClient> = Arc::new(mock);

        let connector = StaticConnector::new(Arc::clone(&client));
        let connected = connector.connect(&ClientOptions::default()).await.unwrap();
        assert!(Arc::ptr_eq(&client, &connected));
        connected.close();
    }
}
