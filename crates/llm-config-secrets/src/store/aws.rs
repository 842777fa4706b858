//! AWS Secrets Manager client
//!
//! Enabled with the `aws` feature. Credentials and region resolve through the
//! standard AWS configuration chain; [`ClientOptions`] can pin the region,
//! the named profile and an endpoint override (for LocalStack and similar).
//!
//! ```rust,ignore
//! use llm_config_secrets::store::AwsSecretsManagerConnector;
//! use llm_config_secrets::{SecretManager, SecretManagerConfig};
//!
//! let manager = SecretManager::new(
//!     SecretManagerConfig::new("my-app/prod"),
//!     AwsSecretsManagerConnector::new(),
//! );
//! let password = manager.str("password").await?;
//! ```

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::{
    GetSecretValueError, GetSecretValueOutput,
};
use aws_sdk_secretsmanager::operation::RequestId;
use aws_sdk_secretsmanager::Client;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::traits::{
    RawSecretRecord, ResponseMetadata, SecretPayload, SecretStoreClient, SecretStoreConnector,
};
use crate::config::ClientOptions;
use crate::error::{Result, StoreError};

/// Code reported for failures that never reached the service
const UNCLASSIFIED_CODE: &str = "Unknown";

/// Connector that builds an AWS Secrets Manager client
#[derive(Debug, Clone, Default)]
pub struct AwsSecretsManagerConnector;

impl AwsSecretsManagerConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretStoreConnector for AwsSecretsManagerConnector {
    fn name(&self) -> &str {
        "aws-secretsmanager"
    }

    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn SecretStoreClient>> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = options.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = options.profile.as_deref() {
            loader = loader.profile_name(profile);
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_secretsmanager::config::Builder::from(&shared_config);
        if let Some(endpoint) = options.endpoint_url.as_deref().filter(|s| !s.trim().is_empty()) {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(
            region = ?shared_config.region(),
            endpoint = ?options.endpoint_url,
            "Built AWS Secrets Manager client"
        );
        Ok(Arc::new(AwsSecretsManagerClient {
            client: Client::from_conf(builder.build()),
        }))
    }
}

/// Connected AWS Secrets Manager client
#[derive(Debug, Clone)]
pub struct AwsSecretsManagerClient {
    client: Client,
}

impl AwsSecretsManagerClient {
    /// Wrap an already-configured SDK client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStoreClient for AwsSecretsManagerClient {
    async fn fetch(&self, secret_name: &str) -> std::result::Result<RawSecretRecord, StoreError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_name)
            .send()
            .await
            .map_err(|err| sdk_store_error(secret_name, &err))?;
        record_from_output(secret_name, &output)
    }

    // Dropping the SDK client releases its connection pool.
    fn close(&self) {}
}

fn sdk_store_error(secret_name: &str, err: &SdkError<GetSecretValueError>) -> StoreError {
    let code = match err {
        SdkError::ServiceError(context) => context.err().code(),
        _ => None,
    };
    store_error_from_code(secret_name, code, DisplayErrorContext(err).to_string())
}

fn store_error_from_code(secret_name: &str, code: Option<&str>, message: String) -> StoreError {
    StoreError::from_code(secret_name, code.unwrap_or(UNCLASSIFIED_CODE), message)
}

/// Convert a `GetSecretValue` response into a raw record
///
/// Binary secrets hold base64 text; bytes that are not UTF-8 are encoded so
/// the payload decoder sees them unchanged.
fn record_from_output(
    secret_name: &str,
    output: &GetSecretValueOutput,
) -> std::result::Result<RawSecretRecord, StoreError> {
    let payload = if let Some(text) = output.secret_string() {
        SecretPayload::Text(text.to_string())
    } else if let Some(blob) = output.secret_binary() {
        let bytes = blob.as_ref();
        match std::str::from_utf8(bytes) {
            Ok(text) => SecretPayload::Binary(text.to_string()),
            Err(_) => {
                SecretPayload::Binary(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    } else {
        return Err(StoreError::from_code(
            secret_name,
            "InvalidRequestException",
            "secret value has neither a string nor a binary payload",
        ));
    };

    let created_date = output
        .created_date()
        .and_then(|date| DateTime::<Utc>::from_timestamp(date.secs(), date.subsec_nanos()))
        .unwrap_or_else(Utc::now);

    Ok(RawSecretRecord {
        arn: output.arn().unwrap_or_default().to_string(),
        name: output.name().unwrap_or(secret_name).to_string(),
        version_id: output.version_id().unwrap_or_default().to_string(),
        version_stages: output.version_stages().to_vec(),
        created_date,
        payload,
        response_metadata: ResponseMetadata {
            request_id: output.request_id().map(str::to_string),
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use crate::snapshot::SecretSnapshot;
    use aws_sdk_secretsmanager::primitives::{Blob, DateTime as SmithyDateTime};

    #[test]
    fn test_string_secret_record() {
        let output = GetSecretValueOutput::builder()
            .arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:app-AbCdEf")
            .name("app")
            .version_id("v1")
            .version_stages("AWSCURRENT")
            .created_date(SmithyDateTime::from_secs(1_700_000_000))
            .secret_string(r#"{"username": "admin"}"#)
            .build();

        let record = record_from_output("app", &output).unwrap();
        assert_eq!(record.version_id, "v1");
        assert_eq!(record.version_stages, vec!["AWSCURRENT"]);
        assert_eq!(record.created_date.timestamp(), 1_700_000_000);
        assert_eq!(record.payload, SecretPayload::Text(r#"{"username": "admin"}"#.into()));

        let snapshot = SecretSnapshot::from_record(record).unwrap();
        assert_eq!(snapshot.values.try_get("username"), Some(&serde_json::json!("admin")));
    }

    #[test]
    fn test_binary_secret_record() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(r#"{"token": "abc"}"#);
        let output = GetSecretValueOutput::builder()
            .name("app")
            .secret_binary(Blob::new(encoded.clone().into_bytes()))
            .build();

        let record = record_from_output("app", &output).unwrap();
        assert_eq!(record.payload, SecretPayload::Binary(encoded));

        let snapshot = SecretSnapshot::from_record(record).unwrap();
        assert_eq!(snapshot.values.try_get("token"), Some(&serde_json::json!("abc")));
    }

    #[test]
    fn test_empty_secret_is_invalid_request() {
        let output = GetSecretValueOutput::builder().name("app").build();

        let err = record_from_output("app", &output).unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::InvalidRequest);
    }

    #[test]
    fn test_error_codes_are_classified() {
        let err = store_error_from_code(
            "app",
            Some("DecryptionFailureException"),
            "can't decrypt".to_string(),
        );
        assert_eq!(err.kind, StoreErrorKind::DecryptionFailure);
        assert_eq!(err.code, "DecryptionFailureException");

        let err = store_error_from_code("app", None, "dispatch failure".to_string());
        assert_eq!(err.kind, StoreErrorKind::Other);
    }
}
