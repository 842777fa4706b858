//! Error types for secret resolution
//!
//! Three families of failure reach callers:
//!
//! - [`SecretError::NotFound`]: a key is absent from every snapshot and from
//!   the environment, and no default was given.
//! - [`ValidationError`]: a raw value exists but cannot be coerced to the
//!   requested kind.
//! - [`StoreError`]: the secret store client failed; its raw error code is
//!   classified into a [`StoreErrorKind`].

use thiserror::Error;

/// Classified secret store failure
///
/// Store clients report a raw error code string. [`StoreErrorKind::from_code`]
/// maps it onto this fixed set; anything unknown lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The store can't decrypt the protected secret text with the configured key
    DecryptionFailure,
    /// An error occurred on the server side
    InternalServiceError,
    /// A parameter value was invalid
    InvalidParameter,
    /// A parameter value is not valid for the current state of the resource
    InvalidRequest,
    /// The requested secret does not exist
    ResourceNotFound,
    /// Any code outside the table above
    Other,
}

impl StoreErrorKind {
    /// Map a raw store error code onto its kind
    pub fn from_code(code: &str) -> Self {
        match code {
            "DecryptionFailureException" | "DecryptionFailure" => Self::DecryptionFailure,
            "InternalServiceErrorException" | "InternalServiceError" => {
                Self::InternalServiceError
            }
            "InvalidParameterException" | "InvalidParameter" => Self::InvalidParameter,
            "InvalidRequestException" | "InvalidRequest" => Self::InvalidRequest,
            "ResourceNotFoundException" | "ResourceNotFound" => Self::ResourceNotFound,
            _ => Self::Other,
        }
    }

    /// Canonical code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::DecryptionFailure => "DecryptionFailureException",
            Self::InternalServiceError => "InternalServiceErrorException",
            Self::InvalidParameter => "InvalidParameterException",
            Self::InvalidRequest => "InvalidRequestException",
            Self::ResourceNotFound => "ResourceNotFoundException",
            Self::Other => "Other",
        }
    }

    /// Human-readable explanation, used in log events
    pub fn description(&self) -> &'static str {
        match self {
            Self::DecryptionFailure => {
                "the secret store can't decrypt the protected secret text using the provided key"
            }
            Self::InternalServiceError => "an error occurred on the server side",
            Self::InvalidParameter => "an invalid value was provided for a parameter",
            Self::InvalidRequest => {
                "a parameter value is not valid for the current state of the resource"
            }
            Self::ResourceNotFound => "the requested secret can't be found",
            Self::Other => "unclassified secret store error",
        }
    }
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure reported by a secret store client
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Secret store error ({kind}) for '{secret_name}': {message}")]
pub struct StoreError {
    /// Classified kind
    pub kind: StoreErrorKind,
    /// The raw code as reported by the client
    pub code: String,
    /// Client-provided message
    pub message: String,
    /// The secret being fetched
    pub secret_name: String,
}

impl StoreError {
    /// Build a store error from a raw client error code
    pub fn from_code(
        secret_name: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        Self {
            kind: StoreErrorKind::from_code(&code),
            code,
            message: message.into(),
            secret_name: secret_name.into(),
        }
    }
}

/// A raw value that could not be coerced to the requested kind
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {kind} value '{value}': {reason}")]
pub struct ValidationError {
    /// The offending raw value, rendered as text
    pub value: String,
    /// Name of the target kind (`int`, `datetime`, ...)
    pub kind: &'static str,
    /// Why coercion failed
    pub reason: String,
}

impl ValidationError {
    pub fn new(value: impl Into<String>, kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Main error type for secret manager operations
#[derive(Error, Debug)]
pub enum SecretError {
    /// The key is absent from every source and no default was given
    #[error("Key \"{key}\" is not found.")]
    NotFound { key: String },

    /// A value was found but failed coercion
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The secret store client failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A fetched payload could not be decoded into a key/value mapping
    #[error("Payload error for secret '{secret_name}': {reason}")]
    Payload { secret_name: String, reason: String },

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SecretError {
    /// Create a not-found error
    pub fn not_found(key: impl Into<String>) -> Self {
        SecretError::NotFound { key: key.into() }
    }

    /// Create a payload error
    pub fn payload(secret_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SecretError::Payload {
            secret_name: secret_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        SecretError::Configuration(msg.into())
    }

    /// Check if this is a missing-key error
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretError::NotFound { .. })
    }

    /// The classified store kind, if this came from the store client
    pub fn store_kind(&self) -> Option<StoreErrorKind> {
        match self {
            SecretError::Store(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SecretError {
    fn from(err: toml::de::Error) -> Self {
        SecretError::Configuration(format!("TOML error: {}", err))
    }
}

impl From<std::io::Error> for SecretError {
    fn from(err: std::io::Error) -> Self {
        SecretError::Configuration(format!("I/O error: {}", err))
    }
}

/// Result type alias for secret manager operations
pub type Result<T> = std::result::Result<T, SecretError>;

/// Default handling for typed lookups
///
/// A typed accessor that comes back `NotFound` can be given a ready-made
/// default. The default is returned as-is; it is never coerced.
///
/// ```rust,ignore
/// let port = manager.int("database_port").await.or_value(5432)?;
/// ```
pub trait LookupResultExt<T> {
    /// Replace a `NotFound` error with `default`
    fn or_value(self, default: T) -> Result<T>;

    /// Replace a `NotFound` error with `None`
    fn optional(self) -> Result<Option<T>>;
}

impl<T> LookupResultExt<T> for Result<T> {
    fn or_value(self, default: T) -> Result<T> {
        match self {
            Err(SecretError::NotFound { .. }) => Ok(default),
            other => other,
        }
    }

    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SecretError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
