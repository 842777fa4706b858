//! Environment variable source
//!
//! The manager falls back to environment variables when no snapshot defines a
//! key. `Process` reads the live process environment at query time; `Fixed`
//! holds an explicit set of variables (useful for embedding and tests).

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub enum Environment {
    #[default]
    Process,
    Fixed(IndexMap<String, String>),
}

impl Environment {
    /// A fixed set of variables
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// No variables at all
    pub fn empty() -> Self {
        Environment::Fixed(IndexMap::new())
    }

    /// Read one variable; non-UTF-8 values count as absent
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            Environment::Process => std::env::var(name).ok(),
            Environment::Fixed(vars) => vars.get(name).cloned(),
        }
    }

    /// Look up `key` verbatim, then upper-cased
    ///
    /// Returns the matched variable name with its value.
    pub fn lookup(&self, key: &str) -> Option<(String, String)> {
        if let Some(value) = self.var(key) {
            return Some((key.to_string(), value));
        }
        let upper = key.to_uppercase();
        if upper != key {
            if let Some(value) = self.var(&upper) {
                return Some((upper, value));
            }
        }
        None
    }

    /// Every variable with a UTF-8 name and value
    pub fn vars(&self) -> Vec<(String, String)> {
        match self {
            Environment::Process => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            Environment::Fixed(vars) => vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_then_upper() {
        let env = Environment::fixed([("token", "lower"), ("API_KEY", "upper")]);

        assert_eq!(env.lookup("token"), Some(("token".to_string(), "lower".to_string())));
        assert_eq!(env.lookup("api_key"), Some(("API_KEY".to_string(), "upper".to_string())));
        assert_eq!(env.lookup("missing"), None);
    }

    #[test]
    fn test_process_environment() {
        std::env::set_var("ENVIRONMENT_SOURCE_TEST__VALUE", "42");

        let env = Environment::Process;
        assert_eq!(env.var("ENVIRONMENT_SOURCE_TEST__VALUE").as_deref(), Some("42"));
        assert_eq!(
            env.lookup("environment_source_test__value").map(|(_, v)| v).as_deref(),
            Some("42")
        );
        assert!(env
            .vars()
            .iter()
            .any(|(k, _)| k == "ENVIRONMENT_SOURCE_TEST__VALUE"));

        std::env::remove_var("ENVIRONMENT_SOURCE_TEST__VALUE");
    }
}
