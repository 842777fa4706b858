//! In-memory secret store
//!
//! Serves prepared records (or prepared failures) from a map. It is both a
//! connector and a client, and counts connects, fetches and closes so callers
//! can observe how the manager drives it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::traits::{RawSecretRecord, SecretStoreClient, SecretStoreConnector};
use crate::config::ClientOptions;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
enum Entry {
    Record(RawSecretRecord),
    Failure { code: String, message: String },
}

#[derive(Debug, Default)]
struct Inner {
    entries: RwLock<HashMap<String, Entry>>,
    connects: AtomicUsize,
    fetches: AtomicUsize,
    closes: AtomicUsize,
    last_options: RwLock<Option<ClientOptions>>,
}

/// Secret store backed by a shared in-memory map
///
/// Clones share the same map and counters.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    inner: Arc<Inner>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record (builder pattern)
    pub fn with_record(self, record: RawSecretRecord) -> Self {
        self.insert(record);
        self
    }

    /// Add a JSON secret string under `name` (builder pattern)
    pub fn with_json(self, name: &str, payload: &serde_json::Value) -> Self {
        self.insert(RawSecretRecord::text(name, payload.to_string()));
        self
    }

    /// Make fetches of `name` fail with a raw store error code (builder pattern)
    pub fn with_failure(self, name: &str, code: &str, message: &str) -> Self {
        self.write_entry(
            name.to_string(),
            Entry::Failure {
                code: code.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    /// Add or replace a record
    pub fn insert(&self, record: RawSecretRecord) {
        self.write_entry(record.name.clone(), Entry::Record(record));
    }

    fn write_entry(&self, name: String, entry: Entry) {
        match self.inner.entries.write() {
            Ok(mut entries) => {
                entries.insert(name, entry);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(name, entry);
            }
        }
    }

    /// Number of `connect` calls served
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls served
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent `connect`
    pub fn last_connect_options(&self) -> Option<ClientOptions> {
        match self.inner.last_options.read() {
            Ok(options) => options.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of `close` calls received
    pub fn close_count(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStoreClient for InMemorySecretStore {
    async fn fetch(&self, secret_name: &str) -> std::result::Result<RawSecretRecord, StoreError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);

        let entries = self.inner.entries.read().map_err(|e| {
            StoreError::from_code(secret_name, "InternalServiceErrorException", e.to_string())
        })?;

        match entries.get(secret_name) {
            Some(Entry::Record(record)) => Ok(record.clone()),
            Some(Entry::Failure { code, message }) => {
                Err(StoreError::from_code(secret_name, code.as_str(), message.as_str()))
            }
            None => Err(StoreError::from_code(
                secret_name,
                "ResourceNotFoundException",
                "Secrets Manager can't find the specified secret.",
            )),
        }
    }

    fn close(&self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SecretStoreConnector for InMemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn SecretStoreClient>> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        match self.inner.last_options.write() {
            Ok(mut last) => *last = Some(options.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(options.clone()),
        }
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_prepared_record() {
        let store = InMemorySecretStore::new().with_json("app", &json!({"username": "admin"}));

        let record = store.fetch("app").await.unwrap();
        assert_eq!(record.name, "app");
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_secret_is_resource_not_found() {
        let store = InMemorySecretStore::new();
        let err = store.fetch("nope").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::ResourceNotFound);
        assert_eq!(err.secret_name, "nope");
    }

    #[tokio::test]
    async fn test_prepared_failure() {
        let store = InMemorySecretStore::new().with_failure(
            "locked",
            "DecryptionFailureException",
            "kms key disabled",
        );
        let err = store.fetch("locked").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::DecryptionFailure);
        assert_eq!(err.message, "kms key disabled");
    }

    #[tokio::test]
    async fn test_clones_share_counters() {
        let store = InMemorySecretStore::new();
        let client = store.connect(&ClientOptions::default()).await.unwrap();
        client.close();
        client.close();

        assert_eq!(store.connect_count(), 1);
        assert_eq!(store.close_count(), 2);
    }
}
