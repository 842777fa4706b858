//! Namespaced dictionaries
//!
//! Flat keys that encode a hierarchy with a double underscore are rebuilt
//! into a nested mapping:
//!
//! ```text
//! DATABASE__default__HOST=localhost
//! DATABASE__default__OPTIONS__sslmode=disable
//! ```
//!
//! becomes, for prefix `database`:
//!
//! ```text
//! { default: { HOST: localhost, OPTIONS: { sslmode: disable } } }
//! ```
//!
//! Sources are merged highest priority first and the first writer of a leaf
//! wins: a later source never overwrites a key that is already set.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::fields::{Field, TypedValue};

/// Separator between hierarchy levels
pub const NAMESPACE_SEPARATOR: &str = "__";

/// Dictionary key: the hashable subset of [`TypedValue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Str(String),
    Int(i64),
    Bool(bool),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(Duration),
    Uuid(Uuid),
    Path(PathBuf),
}

impl TryFrom<TypedValue> for DictKey {
    type Error = ValidationError;

    fn try_from(value: TypedValue) -> Result<Self, Self::Error> {
        Ok(match value {
            TypedValue::Str(s) => DictKey::Str(s),
            TypedValue::Int(i) | TypedValue::LogLevel(i) => DictKey::Int(i),
            TypedValue::Bool(b) => DictKey::Bool(b),
            TypedValue::Decimal(d) => DictKey::Decimal(d),
            TypedValue::DateTime(dt) => DictKey::DateTime(dt),
            TypedValue::Date(d) => DictKey::Date(d),
            TypedValue::Time(t) => DictKey::Time(t),
            TypedValue::Duration(d) => DictKey::Duration(d),
            TypedValue::Uuid(u) => DictKey::Uuid(u),
            TypedValue::Path(p) => DictKey::Path(p),
            other @ (TypedValue::Float(_) | TypedValue::List(_) | TypedValue::Choices(_)) => {
                return Err(ValidationError::new(
                    other.to_string(),
                    "dict key",
                    "value kind cannot be used as a dictionary key",
                ))
            }
        })
    }
}

impl From<&str> for DictKey {
    fn from(s: &str) -> Self {
        DictKey::Str(s.to_string())
    }
}

impl From<i64> for DictKey {
    fn from(i: i64) -> Self {
        DictKey::Int(i)
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let typed = match self.clone() {
            DictKey::Str(s) => TypedValue::Str(s),
            DictKey::Int(i) => TypedValue::Int(i),
            DictKey::Bool(b) => TypedValue::Bool(b),
            DictKey::Decimal(d) => TypedValue::Decimal(d),
            DictKey::DateTime(dt) => TypedValue::DateTime(dt),
            DictKey::Date(d) => TypedValue::Date(d),
            DictKey::Time(t) => TypedValue::Time(t),
            DictKey::Duration(d) => TypedValue::Duration(d),
            DictKey::Uuid(u) => TypedValue::Uuid(u),
            DictKey::Path(p) => TypedValue::Path(p),
        };
        write!(f, "{}", typed)
    }
}

/// A node in a nested dictionary
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Leaf(TypedValue),
    Dict(NestedDict),
}

impl NestedValue {
    pub fn as_leaf(&self) -> Option<&TypedValue> {
        match self {
            NestedValue::Leaf(v) => Some(v),
            NestedValue::Dict(_) => None,
        }
    }

    pub fn as_dict(&self) -> Option<&NestedDict> {
        match self {
            NestedValue::Dict(d) => Some(d),
            NestedValue::Leaf(_) => None,
        }
    }
}

/// Ordered mapping whose values are leaves or further mappings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedDict {
    entries: IndexMap<DictKey, NestedValue>,
}

impl NestedDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &DictKey) -> Option<&NestedValue> {
        self.entries.get(key)
    }

    /// Look up a string key
    pub fn get_str(&self, key: &str) -> Option<&NestedValue> {
        self.entries.get(&DictKey::from(key))
    }

    /// Follow a path of string keys
    pub fn get_path(&self, path: &[&str]) -> Option<&NestedValue> {
        let (last, parents) = path.split_last()?;
        let mut node = self;
        for segment in parents {
            node = node.get_str(segment)?.as_dict()?;
        }
        node.get_str(last)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DictKey, &NestedValue)> {
        self.entries.iter()
    }

    /// Render as JSON; keys use their canonical text form
    ///
    /// Strings, integers, floats and booleans stay native; every other leaf
    /// is rendered as its canonical string.
    pub fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    NestedValue::Dict(dict) => dict.to_json(),
                    NestedValue::Leaf(TypedValue::Str(s)) => Value::String(s.clone()),
                    NestedValue::Leaf(TypedValue::Int(i)) => Value::from(*i),
                    NestedValue::Leaf(TypedValue::Float(f)) => Value::from(*f),
                    NestedValue::Leaf(TypedValue::Bool(b)) => Value::Bool(*b),
                    NestedValue::Leaf(other) => Value::String(other.to_string()),
                };
                (key.to_string(), rendered)
            })
            .collect::<serde_json::Map<String, Value>>();
        Value::Object(map)
    }
}

/// Key and value coercions used while building a dictionary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictOptions {
    /// Applied to every path segment
    pub keys: Field,
    /// Applied to every leaf value
    pub values: Field,
}

impl DictOptions {
    pub fn new(keys: Field, values: Field) -> Self {
        Self { keys, values }
    }

    pub fn with_keys(mut self, keys: Field) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_values(mut self, values: Field) -> Self {
        self.values = values;
        self
    }
}

/// Builds one [`NestedDict`] from several prioritized flat sources
#[derive(Debug)]
pub struct NamespaceBuilder<'a> {
    filter: String,
    filter_upper: String,
    options: &'a DictOptions,
    result: NestedDict,
}

impl<'a> NamespaceBuilder<'a> {
    pub fn new(prefix: &str, options: &'a DictOptions) -> Self {
        let filter = format!("{}{}", prefix, NAMESPACE_SEPARATOR);
        Self {
            filter_upper: filter.to_uppercase(),
            filter,
            options,
            result: NestedDict::new(),
        }
    }

    /// Merge one source; returns how many leaves it contributed
    ///
    /// Call in priority order, highest first.
    pub fn merge<'v, K, I>(&mut self, source: I) -> Result<usize, ValidationError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, &'v Value)>,
    {
        let mut written = 0;
        for (key, value) in source {
            if self.merge_entry(key.as_ref(), value)? {
                written += 1;
            }
        }
        Ok(written)
    }

    fn merge_entry(&mut self, key: &str, value: &Value) -> Result<bool, ValidationError> {
        let Some(remainder) = key
            .strip_prefix(self.filter.as_str())
            .or_else(|| key.strip_prefix(self.filter_upper.as_str()))
        else {
            return Ok(false);
        };

        let segments: Vec<&str> = remainder.split(NAMESPACE_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty()) {
            tracing::debug!(key = key, "Skipping namespaced key with an empty segment");
            return Ok(false);
        }
        let Some((leaf, parents)) = segments.split_last() else {
            return Ok(false);
        };

        let options = self.options;
        let mut node = &mut self.result;
        for segment in parents {
            let dict_key = coerce_key(&options.keys, segment)?;
            let child = node
                .entries
                .entry(dict_key)
                .or_insert_with(|| NestedValue::Dict(NestedDict::new()));
            match child {
                NestedValue::Dict(dict) => node = dict,
                NestedValue::Leaf(_) => {
                    tracing::debug!(
                        key = key,
                        segment = *segment,
                        "Skipping namespaced key that descends through an existing value"
                    );
                    return Ok(false);
                }
            }
        }

        let leaf_key = coerce_key(&options.keys, leaf)?;
        if node.entries.contains_key(&leaf_key) {
            return Ok(false);
        }
        let typed = options.values.deserialize(value)?;
        node.entries.insert(leaf_key, NestedValue::Leaf(typed));
        Ok(true)
    }

    pub fn finish(self) -> NestedDict {
        self.result
    }
}

fn coerce_key(field: &Field, segment: &str) -> Result<DictKey, ValidationError> {
    DictKey::try_from(field.deserialize_str(segment)?)
}
