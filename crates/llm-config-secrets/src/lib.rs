//! LLM Config Secrets
//!
//! Cached secret-store snapshots with typed accessors, environment variable
//! fallback and namespaced dictionaries.
//!
//! ## Features
//!
//! - **Lazy Loading**: The default secret is fetched on first access and cached
//! - **Layered Secrets**: Load several secrets; the most recent one shadows the rest
//! - **Environment Fallback**: Keys missing from every secret come from the environment
//! - **Typed Accessors**: Integers, decimals, booleans, lists, dates, durations, UUIDs and more
//! - **Namespaced Dictionaries**: `DATABASE__default__HOST` keys rebuilt into nested maps
//! - **Pluggable Stores**: Any backend behind the async `SecretStoreClient` trait
//!
//! ## Architecture
//!
//! 1. **Store** (`store/`): Client and connector traits plus bundled in-memory
//!    and environment-backed clients.
//!
//! 2. **Snapshot** (`snapshot`): Decodes binary or string payloads into one
//!    ordered key/value mapping.
//!
//! 3. **Resolver** (`resolver`): Precedence chain over snapshots and the
//!    environment.
//!
//! 4. **Fields** (`fields`): Coercion of raw values into typed results.
//!
//! 5. **Namespace** (`namespace`): First-writer-wins nested dictionary builder.
//!
//! 6. **Manager** (`manager`): Composes the above behind typed getters.
//!
//! ## Example
//!
//! ```rust,no_run
//! use llm_config_secrets::store::InMemorySecretStore;
//! use llm_config_secrets::{LookupResultExt, SecretManager, SecretManagerConfig};
//!
//! # async fn run() -> llm_config_secrets::Result<()> {
//! let store = InMemorySecretStore::new().with_json(
//!     "my-app/prod",
//!     &serde_json::json!({
//!         "database__host": "db.internal",
//!         "database__port": "5432",
//!         "debug": "false"
//!     }),
//! );
//! let manager = SecretManager::new(SecretManagerConfig::new("my-app/prod"), store);
//!
//! let debug = manager.bool("debug").await?;
//! let workers = manager.int("workers").await.or_value(4)?;
//! let database = manager.dict("database").await?;
//! # let _ = (debug, workers, database);
//! manager.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod fields;
pub mod manager;
pub mod namespace;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use config::{ClientOptions, SecretManagerConfig, SECRET_NAME_ENV};
pub use environment::Environment;
pub use error::{
    LookupResultExt, Result, SecretError, StoreError, StoreErrorKind, ValidationError,
};
pub use fields::{Field, TypedValue};
pub use manager::SecretManager;
pub use namespace::{DictKey, DictOptions, NestedDict, NestedValue, NAMESPACE_SEPARATOR};
pub use resolver::{Resolved, ValueSource};
pub use snapshot::{SecretSnapshot, SecretValues};
pub use store::{SecretStoreClient, SecretStoreConnector};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
