//! Key resolution
//!
//! Precedence, highest first:
//!
//! 1. Secret snapshots, most recently loaded first
//! 2. The environment, key verbatim
//! 3. The environment, key upper-cased
//!
//! Defaults are applied by the caller after resolution fails.

use serde_json::Value;
use std::fmt;

use crate::environment::Environment;
use crate::snapshot::SecretSnapshot;

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// A snapshot, by logical secret name
    Secret(String),
    /// An environment variable, by variable name
    Environment(String),
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Secret(name) => write!(f, "secret:{}", name),
            ValueSource::Environment(var) => write!(f, "env:{}", var),
        }
    }
}

/// A raw value with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub source: ValueSource,
}

/// Resolve `key` against snapshots (given in load order) and the environment
pub fn resolve<'a, I>(key: &str, snapshots: I, env: &Environment) -> Option<Resolved>
where
    I: IntoIterator<Item = &'a SecretSnapshot>,
    I::IntoIter: DoubleEndedIterator,
{
    for snapshot in snapshots.into_iter().rev() {
        if let Some(value) = snapshot.values.try_get(key) {
            return Some(Resolved {
                value: value.clone(),
                source: ValueSource::Secret(snapshot.name.clone()),
            });
        }
    }

    env.lookup(key).map(|(var, value)| Resolved {
        value: Value::String(value),
        source: ValueSource::Environment(var),
    })
}
