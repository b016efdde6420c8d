// Environment variable loading

use std::collections::HashMap;

/// Collects prefixed variables into a lowercase key map.
///
/// With prefix `WAYFARER`, `WAYFARER_CSP_REPORT_ONLY=1` becomes
/// `csp_report_only = "1"`. Variables without the prefix are dropped.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(std::env::vars())
    }

    /// Load from an explicit set of variables
    pub fn load_from<I, K, V>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let marker = format!("{}_", self.prefix);
        vars.into_iter()
            .filter_map(|(key, value)| {
                key.as_ref()
                    .strip_prefix(&marker)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value.as_ref().to_string()))
            })
            .collect()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new("WAYFARER")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_stripped() {
        let loader = EnvLoader::default();
        let vars = loader.load_from([
            ("WAYFARER_CSP_REPORT_ONLY", "1"),
            ("WAYFARER_PORT", "8080"),
            ("PATH", "/usr/bin"),
        ]);

        assert_eq!(vars.get("csp_report_only"), Some(&"1".to_string()));
        assert_eq!(vars.get("port"), Some(&"8080".to_string()));
        assert!(!vars.contains_key("path"));
    }

    #[test]
    fn test_bare_prefix_ignored() {
        let loader = EnvLoader::new("APP");
        let vars = loader.load_from([("APP_", "x"), ("APPLE", "y")]);
        assert!(vars.is_empty());
    }
}
