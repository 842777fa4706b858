//! Secret manager configuration
//!
//! Values can be loaded from environment variables, a TOML file, or set
//! directly through the `with_*` builders.
//!
//! ```toml
//! secret_name = "my-app/prod"
//! required = true
//!
//! [client]
//! region = "us-east-1"
//!
//! [client.extra]
//! max_attempts = "5"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::environment::Environment;
use crate::error::Result;

/// Environment variable consulted when no secret name is configured
pub const SECRET_NAME_ENV: &str = "SECRET_NAME";

/// Connection options forwarded to the secret store connector
///
/// `extra` holds arbitrary passthrough options; the manager never interprets
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Cloud region (e.g., "us-east-1")
    pub region: Option<String>,
    /// Endpoint override, for local emulators
    pub endpoint_url: Option<String>,
    /// Named credentials profile
    pub profile: Option<String>,
    /// Passthrough options
    pub extra: BTreeMap<String, String>,
}

impl ClientOptions {
    /// Load options from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_defaults()
    }

    /// Fill unset fields from the process environment
    pub fn with_env_defaults(self) -> Self {
        self.with_defaults_from(&Environment::Process)
    }

    /// Fill unset fields from `env`
    pub fn with_defaults_from(mut self, env: &Environment) -> Self {
        if self.region.is_none() {
            self.region = env.var("AWS_REGION").or_else(|| env.var("AWS_DEFAULT_REGION"));
        }
        if self.endpoint_url.is_none() {
            self.endpoint_url = env.var("AWS_ENDPOINT_URL");
        }
        if self.profile.is_none() {
            self.profile = env.var("AWS_PROFILE");
        }
        self
    }

    /// Set region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set endpoint override
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Add a passthrough option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Configuration for [`crate::SecretManager`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretManagerConfig {
    /// Secret loaded on first access; falls back to `SECRET_NAME`
    pub secret_name: Option<String>,
    /// When false, store errors during a load are logged and swallowed
    pub required: bool,
    /// Options forwarded to the connector
    pub client: ClientOptions,
}

impl Default for SecretManagerConfig {
    fn default() -> Self {
        Self {
            secret_name: None,
            required: true,
            client: ClientOptions::default(),
        }
    }
}

impl SecretManagerConfig {
    /// Configuration for one default secret
    pub fn new(secret_name: impl Into<String>) -> Self {
        Self {
            secret_name: Some(secret_name.into()),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            secret_name: std::env::var(SECRET_NAME_ENV).ok(),
            client: ClientOptions::from_env(),
            ..Default::default()
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Set the default secret name
    pub fn with_secret_name(mut self, name: impl Into<String>) -> Self {
        self.secret_name = Some(name.into());
        self
    }

    /// Swallow store errors during loads
    pub fn best_effort(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set connector options
    pub fn with_client_options(mut self, client: ClientOptions) -> Self {
        self.client = client;
        self
    }

    /// The secret loaded on first access: explicit name, else `SECRET_NAME`
    pub fn default_secret_name(&self, env: &Environment) -> Option<String> {
        self.secret_name
            .clone()
            .or_else(|| env.var(SECRET_NAME_ENV))
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SecretManagerConfig::default();
        assert!(config.required);
        assert!(config.secret_name.is_none());
        assert!(!config.clone().best_effort().required);
    }

    #[test]
    fn test_default_secret_name_fallback() {
        let env = Environment::fixed([(SECRET_NAME_ENV, "from-env")]);

        let explicit = SecretManagerConfig::new("explicit");
        assert_eq!(explicit.default_secret_name(&env).as_deref(), Some("explicit"));

        let implicit = SecretManagerConfig::default();
        assert_eq!(implicit.default_secret_name(&env).as_deref(), Some("from-env"));

        let none = SecretManagerConfig::default();
        assert_eq!(none.default_secret_name(&Environment::empty()), None);
    }

    #[test]
    fn test_client_options_from_env() {
        std::env::set_var("AWS_REGION", "us-west-2");

        let options = ClientOptions::from_env();
        assert_eq!(options.region, Some("us-west-2".to_string()));

        let explicit = ClientOptions::default()
            .with_region("eu-central-1")
            .with_env_defaults();
        assert_eq!(explicit.region, Some("eu-central-1".to_string()));

        std::env::remove_var("AWS_REGION");
    }

    #[test]
    fn test_defaults_from_fixed_environment() {
        let env = Environment::fixed([
            ("AWS_DEFAULT_REGION", "ap-southeast-2"),
            ("AWS_ENDPOINT_URL", "http://localhost:4566"),
        ]);

        let options = ClientOptions::default().with_defaults_from(&env);
        assert_eq!(options.region.as_deref(), Some("ap-southeast-2"));
        assert_eq!(options.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(options.profile, None);

        let pinned = ClientOptions::default()
            .with_region("eu-west-1")
            .with_defaults_from(&env);
        assert_eq!(pinned.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_from_toml_str() {
        let config = SecretManagerConfig::from_toml_str(
            r#"
            secret_name = "my-app/prod"
            required = false

            [client]
            region = "us-east-1"

            [client.extra]
            max_attempts = "5"
            "#,
        )
        .unwrap();

        assert_eq!(config.secret_name.as_deref(), Some("my-app/prod"));
        assert!(!config.required);
        assert_eq!(config.client.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.client.extra.get("max_attempts").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "secret_name = \"file-secret\"").unwrap();

        let config = SecretManagerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.secret_name.as_deref(), Some("file-secret"));
        assert!(config.required);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SecretManagerConfig::from_toml_str("required = \"maybe\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
