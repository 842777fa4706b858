//! Secret Manager
//!
//! Owns the connection to a secret store, the insertion-ordered cache of
//! snapshots, and the typed accessors built on top of them.
//!
//! # Lookup order
//!
//! 1. The default secret is loaded on first access if nothing is cached yet
//! 2. Snapshots, most recently loaded first
//! 3. Environment variables, key verbatim then upper-cased
//!
//! A key absent from every source fails with [`SecretError::NotFound`]; use
//! [`crate::LookupResultExt`] to supply a typed default.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_config_secrets::{LookupResultExt, SecretManager, SecretManagerConfig};
//! use llm_config_secrets::store::InMemorySecretStore;
//!
//! let store = InMemorySecretStore::new()
//!     .with_json("my-app/prod", &serde_json::json!({"database_port": "5432"}));
//! let manager = SecretManager::new(SecretManagerConfig::new("my-app/prod"), store);
//!
//! let port = manager.int("database_port").await?;
//! let workers = manager.int("workers").await.or_value(4)?;
//! let db = manager.dict("database").await?;
//! manager.close().await;
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SecretManagerConfig;
use crate::environment::Environment;
use crate::error::{Result, SecretError, ValidationError};
use crate::fields::{self, Field, TypedValue};
use crate::namespace::{DictOptions, NamespaceBuilder, NestedDict};
use crate::resolver::{self, Resolved};
use crate::snapshot::SecretSnapshot;
use crate::store::{SecretStoreClient, SecretStoreConnector, StaticConnector};

/// Cached secret snapshots with typed, environment-aware lookups
pub struct SecretManager {
    config: SecretManagerConfig,
    connector: Arc<dyn SecretStoreConnector>,
    client: Mutex<Option<Arc<dyn SecretStoreClient>>>,
    secrets: Mutex<IndexMap<String, Arc<SecretSnapshot>>>,
    default_load_attempted: AtomicBool,
    environment: Environment,
}

impl std::fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManager")
            .field("connector", &self.connector.name())
            .field("config", &self.config)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl SecretManager {
    /// Create a manager that connects through `connector` on first use
    pub fn new<C: SecretStoreConnector + 'static>(config: SecretManagerConfig, connector: C) -> Self {
        Self::with_connector(config, Arc::new(connector))
    }

    /// Create a manager from a shared connector
    pub fn with_connector(
        config: SecretManagerConfig,
        connector: Arc<dyn SecretStoreConnector>,
    ) -> Self {
        Self {
            config,
            connector,
            client: Mutex::new(None),
            secrets: Mutex::new(IndexMap::new()),
            default_load_attempted: AtomicBool::new(false),
            environment: Environment::default(),
        }
    }

    /// Create a manager around an already-connected client
    pub fn with_client(config: SecretManagerConfig, client: Arc<dyn SecretStoreClient>) -> Self {
        Self::new(config, StaticConnector::new(client))
    }

    /// Replace the environment consulted for fallbacks (builder pattern)
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn config(&self) -> &SecretManagerConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Connect now instead of on the first load
    pub async fn connect(&self) -> Result<()> {
        self.client().await.map(|_| ())
    }

    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }

    async fn client(&self) -> Result<Arc<dyn SecretStoreClient>> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        let options = self.config.client.clone().with_defaults_from(&self.environment);
        info!(
            connector = self.connector.name(),
            region = ?options.region,
            "Connecting to secret store"
        );
        let client = self.connector.connect(&options).await?;
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Fetch and cache a secret
    ///
    /// `None` loads the default secret (configured name, else `SECRET_NAME`).
    /// An already cached name is returned without fetching. Returns `None`
    /// when a best-effort manager swallowed a store error.
    pub async fn load(&self, secret_name: Option<&str>) -> Result<Option<Arc<SecretSnapshot>>> {
        let name = match secret_name {
            Some(name) => name.to_string(),
            None => match self.config.default_secret_name(&self.environment) {
                Some(name) => name,
                None if self.config.required => {
                    return Err(SecretError::configuration(
                        "no secret name configured; set secret_name or the SECRET_NAME environment variable",
                    ))
                }
                None => {
                    debug!("No default secret configured, using the environment only");
                    return Ok(None);
                }
            },
        };

        let mut secrets = self.secrets.lock().await;
        if let Some(existing) = secrets.get(&name) {
            return Ok(Some(Arc::clone(existing)));
        }

        match self.fetch_snapshot(&name).await {
            Ok(snapshot) => {
                info!(
                    secret = %name,
                    version = %snapshot.version_id,
                    keys = snapshot.values.len(),
                    "Loaded secret"
                );
                let snapshot = Arc::new(snapshot);
                secrets.insert(name, Arc::clone(&snapshot));
                Ok(Some(snapshot))
            }
            Err(SecretError::Store(err)) if !self.config.required => {
                debug!(secret = %name, kind = %err.kind, "Ignoring store error for best-effort load");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_snapshot(&self, name: &str) -> Result<SecretSnapshot> {
        let client = self.client().await?;
        let record = client.fetch(name).await.map_err(|err| {
            warn!(
                secret = %name,
                kind = %err.kind,
                message = %err.message,
                "{}",
                err.kind.description()
            );
            SecretError::from(err)
        })?;
        SecretSnapshot::from_record(record)
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if self.default_load_attempted.load(Ordering::Acquire) {
            return Ok(());
        }
        if !self.secrets.lock().await.is_empty() {
            return Ok(());
        }
        self.load(None).await?;
        self.default_load_attempted.store(true, Ordering::Release);
        Ok(())
    }

    /// Snapshots in load order
    pub async fn snapshots(&self) -> Vec<Arc<SecretSnapshot>> {
        self.secrets.lock().await.values().cloned().collect()
    }

    /// A cached snapshot by name; never fetches
    pub async fn snapshot(&self, secret_name: &str) -> Option<Arc<SecretSnapshot>> {
        self.secrets.lock().await.get(secret_name).cloned()
    }

    /// Resolve a key to its raw value and source
    pub async fn resolve(&self, name: &str) -> Result<Option<Resolved>> {
        self.ensure_loaded().await?;

        let secrets = self.secrets.lock().await;
        let resolved = resolver::resolve(
            name,
            secrets.values().map(|snapshot| &**snapshot),
            &self.environment,
        );
        match &resolved {
            Some(hit) => debug!(key = name, source = %hit.source, "Resolved key"),
            None => debug!(key = name, "Key not found in any source"),
        }
        Ok(resolved)
    }

    /// Raw value of a key; `default` is returned unchanged when the key is absent
    pub async fn value(&self, name: &str, default: Option<Value>) -> Result<Value> {
        self.resolve(name)
            .await?
            .map(|resolved| resolved.value)
            .or(default)
            .ok_or_else(|| SecretError::not_found(name))
    }

    async fn typed<T, F>(&self, name: &str, parse: F) -> Result<T>
    where
        F: FnOnce(&Value) -> std::result::Result<T, ValidationError>,
    {
        let raw = self.value(name, None).await?;
        Ok(parse(&raw)?)
    }

    /// Coerce a key through any [`Field`]
    pub async fn get(&self, name: &str, field: &Field) -> Result<TypedValue> {
        self.typed(name, |raw| field.deserialize(raw)).await
    }

    pub async fn str(&self, name: &str) -> Result<String> {
        self.typed(name, fields::to_str).await
    }

    pub async fn int(&self, name: &str) -> Result<i64> {
        self.typed(name, fields::to_int).await
    }

    pub async fn float(&self, name: &str) -> Result<f64> {
        self.typed(name, fields::to_float).await
    }

    pub async fn decimal(&self, name: &str) -> Result<Decimal> {
        self.typed(name, fields::to_decimal).await
    }

    /// `true`/`1` or `false`/`0`, case-insensitive
    pub async fn bool(&self, name: &str) -> Result<bool> {
        self.typed(name, fields::to_bool).await
    }

    /// Split on `delimiter`, coercing each element through `subcast`
    pub async fn list(&self, name: &str, delimiter: &str, subcast: &Field) -> Result<Vec<TypedValue>> {
        self.typed(name, |raw| fields::to_list(raw, delimiter, subcast)).await
    }

    /// Comma-separated strings
    pub async fn str_list(&self, name: &str) -> Result<Vec<String>> {
        let items = self.list(name, fields::DEFAULT_DELIMITER, &Field::Str).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                TypedValue::Str(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    /// `key:value` pairs split on `delimiter`, values coerced through `subcast`
    pub async fn choices(
        &self,
        name: &str,
        delimiter: &str,
        subcast: &Field,
    ) -> Result<Vec<(String, TypedValue)>> {
        self.typed(name, |raw| fields::to_choices(raw, delimiter, subcast)).await
    }

    pub async fn datetime(&self, name: &str) -> Result<NaiveDateTime> {
        self.datetime_fmt(name, fields::DEFAULT_DATETIME_FORMAT).await
    }

    pub async fn datetime_fmt(&self, name: &str, format: &str) -> Result<NaiveDateTime> {
        self.typed(name, |raw| fields::to_datetime(raw, format)).await
    }

    pub async fn date(&self, name: &str) -> Result<NaiveDate> {
        self.date_fmt(name, fields::DEFAULT_DATE_FORMAT).await
    }

    pub async fn date_fmt(&self, name: &str, format: &str) -> Result<NaiveDate> {
        self.typed(name, |raw| fields::to_date(raw, format)).await
    }

    pub async fn time(&self, name: &str) -> Result<NaiveTime> {
        self.time_fmt(name, fields::DEFAULT_TIME_FORMAT).await
    }

    pub async fn time_fmt(&self, name: &str, format: &str) -> Result<NaiveTime> {
        self.typed(name, |raw| fields::to_time(raw, format)).await
    }

    /// `H:MM:SS`
    pub async fn timedelta(&self, name: &str) -> Result<Duration> {
        self.typed(name, fields::to_timedelta).await
    }

    pub async fn timedelta_seconds(&self, name: &str) -> Result<Duration> {
        self.typed(name, fields::to_timedelta_seconds).await
    }

    pub async fn uuid(&self, name: &str) -> Result<Uuid> {
        self.uuid_version(name, 4).await
    }

    /// UUID for a given version; parsing accepts any valid UUID
    pub async fn uuid_version(&self, name: &str, version: usize) -> Result<Uuid> {
        let field = Field::Uuid {
            version: Some(version),
        };
        match self.get(name, &field).await? {
            TypedValue::Uuid(uuid) => Ok(uuid),
            other => Err(ValidationError::new(other.to_string(), "uuid", "not a UUID").into()),
        }
    }

    /// Numeric severity; accepts level names such as `DEBUG` or integers
    pub async fn log_level(&self, name: &str) -> Result<i64> {
        self.typed(name, fields::to_log_level).await
    }

    pub async fn path(&self, name: &str) -> Result<PathBuf> {
        self.typed(name, fields::to_path).await
    }

    /// Nested dictionary of every `prefix__...` key, as strings
    pub async fn dict(&self, prefix: &str) -> Result<NestedDict> {
        self.dict_with(prefix, &DictOptions::default()).await
    }

    /// Nested dictionary of every `prefix__...` key
    ///
    /// Snapshots are merged most recent first, then the environment. The
    /// first source to set a leaf keeps it.
    pub async fn dict_with(&self, prefix: &str, options: &DictOptions) -> Result<NestedDict> {
        self.ensure_loaded().await?;

        let mut builder = NamespaceBuilder::new(prefix, options);
        let mut leaves = 0;
        {
            let secrets = self.secrets.lock().await;
            for snapshot in secrets.values().rev() {
                leaves += builder.merge(&snapshot.values)?;
            }
        }

        let env_values: Vec<(String, Value)> = self
            .environment
            .vars()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        leaves += builder.merge(env_values.iter().map(|(key, value)| (key, value)))?;

        debug!(prefix = prefix, leaves = leaves, "Built namespaced dictionary");
        Ok(builder.finish())
    }

    /// Close the client and drop every cached snapshot
    ///
    /// The manager stays usable; the next access reconnects and reloads.
    pub async fn close(&self) {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            info!(connector = self.connector.name(), "Closing secret store client");
            client.close();
        }
        self.secrets.lock().await.clear();
        self.default_load_attempted.store(false, Ordering::Release);
    }
}

impl Drop for SecretManager {
    fn drop(&mut self) {
        if let Some(client) = self.client.get_mut().take() {
            client.close();
        }
    }
}
