//! Secret snapshots
//!
//! A snapshot is the decoded, immutable result of one fetch. Binary payloads
//! are base64-decoded and then parsed as JSON; string payloads are parsed as
//! JSON directly. Either way the top level must be a JSON object, whose order
//! is preserved.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, SecretError};
use crate::store::{RawSecretRecord, ResponseMetadata, SecretPayload};

/// Decoded key/value payload of a secret
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretValues {
    entries: IndexMap<String, Value>,
}

impl SecretValues {
    pub fn new(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Look up a key, failing with `NotFound` when it is absent
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.entries
            .get(key)
            .ok_or_else(|| SecretError::not_found(key))
    }

    pub fn try_get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a SecretValues {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One fetched and decoded secret
#[derive(Debug, Clone, PartialEq)]
pub struct SecretSnapshot {
    pub arn: String,
    pub name: String,
    pub version_id: String,
    pub version_stages: Vec<String>,
    pub created_date: DateTime<Utc>,
    pub response_metadata: ResponseMetadata,
    pub values: SecretValues,
}

impl SecretSnapshot {
    /// Decode a raw record into a snapshot
    pub fn from_record(record: RawSecretRecord) -> Result<Self> {
        let values = decode_payload(&record.name, &record.payload)?;
        Ok(Self {
            arn: record.arn,
            name: record.name,
            version_id: record.version_id,
            version_stages: record.version_stages,
            created_date: record.created_date,
            response_metadata: record.response_metadata,
            values,
        })
    }
}

/// Normalize either payload shape into one key/value mapping
pub fn decode_payload(secret_name: &str, payload: &SecretPayload) -> Result<SecretValues> {
    let entries: IndexMap<String, Value> = match payload {
        SecretPayload::Binary(encoded) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| SecretError::payload(secret_name, format!("invalid base64: {}", e)))?;
            serde_json::from_slice(&bytes)
                .map_err(|e| SecretError::payload(secret_name, format!("invalid JSON: {}", e)))?
        }
        SecretPayload::Text(text) => serde_json::from_str(text)
            .map_err(|e| SecretError::payload(secret_name, format!("invalid JSON: {}", e)))?,
    };
    Ok(SecretValues::new(entries))
}
