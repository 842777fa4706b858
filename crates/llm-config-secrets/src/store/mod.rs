//! Secret Store Clients
//!
//! The narrow interface through which the manager reaches a secrets backend.
//! Credential resolution, retries and the wire protocol belong to the client
//! implementation; the manager only connects, fetches whole records and
//! closes.
//!
//! # Bundled clients
//!
//! - **In-memory**: prepared records and failures, with call counters
//! - **Environment stub**: reads a secret's JSON string from `AWS_SECRET_<NAME>`
//! - **AWS Secrets Manager** (`aws` feature): the real service through the AWS SDK
//!
//! Other backends implement [`SecretStoreConnector`] and
//! [`SecretStoreClient`] over their cloud SDK of choice.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_config_secrets::store::InMemorySecretStore;
//! use llm_config_secrets::{SecretManager, SecretManagerConfig};
//!
//! let store = InMemorySecretStore::new()
//!     .with_json("app", &serde_json::json!({"username": "admin"}));
//! let manager = SecretManager::new(SecretManagerConfig::new("app"), store);
//! assert_eq!(manager.str("username").await?, "admin");
//! ```

#[cfg(feature = "aws")]
pub mod aws;
pub mod env;
pub mod memory;
pub mod traits;

#[cfg(feature = "aws")]
pub use aws::{AwsSecretsManagerClient, AwsSecretsManagerConnector};
pub use env::EnvSecretStore;
pub use memory::InMemorySecretStore;
pub use traits::{
    RawSecretRecord, ResponseMetadata, SecretPayload, SecretStoreClient, SecretStoreConnector,
    StaticConnector,
};

#[cfg(test)]
pub use traits::MockSecretStoreClient;
