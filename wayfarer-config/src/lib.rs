//! Configuration for the Wayfarer site backend.
//!
//! Sources are merged in increasing priority: configuration file, `.env`,
//! then the process environment. The result is resolved once into an
//! immutable [`SiteConfig`].
//!
//! ```no_run
//! use wayfarer_config::SiteConfigBuilder;
//!
//! let config = SiteConfigBuilder::new()
//!     .add_file("wayfarer.toml")
//!     .load_dotenv(None)
//!     .load_env()
//!     .build()
//!     .expect("invalid configuration");
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod site;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use site::{Environment, SiteConfig, parse_bool};
pub use validation::{ConfigValidator, Validate};

use std::collections::HashMap;
use std::path::PathBuf;

/// Builder that layers configuration sources into a [`SiteConfig`].
#[derive(Default)]
pub struct SiteConfigBuilder {
    files: Vec<PathBuf>,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    load_env: bool,
    overrides: HashMap<String, String>,
}

impl SiteConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration file; the format follows its extension
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Load a `.env` file before reading the environment. A missing default
    /// `.env` is not an error; a missing explicit path is.
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Set a key directly (highest priority), e.g. from a CLI flag
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(key.to_lowercase(), value.into());
        self
    }

    pub fn build(self) -> Result<SiteConfig> {
        let mut merged = HashMap::new();

        for path in &self.files {
            let loader = ConfigLoader::auto(path)?;
            merged.extend(loader.load_file(path)?);
        }

        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok();
                }
            }
        }

        if self.load_env {
            let vars: Vec<(String, String)> = std::env::vars().collect();
            let node_env = vars
                .iter()
                .find(|(k, _)| k == "NODE_ENV")
                .map(|(_, v)| v.clone());
            let env = EnvLoader::default().load_from(vars);
            if let Some(node_env) = node_env {
                if !env.contains_key("env") {
                    merged.insert("env".to_string(), node_env);
                }
            }
            merged.extend(env);
        }

        merged.extend(self.overrides);
        SiteConfig::from_map(&merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_file_then_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "env = \"production\"\nport = 4000\ncsp_report_only = true").unwrap();

        let config = SiteConfigBuilder::new()
            .add_file(file.path())
            .set("PORT", "5000")
            .build()
            .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert!(config.csp_report_only);
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_builder_missing_file() {
        let result = SiteConfigBuilder::new()
            .add_file("/nonexistent/wayfarer.toml")
            .build();
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_builder_without_sources_uses_defaults() {
        let config = SiteConfigBuilder::new().build().unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.security_headers);
    }
}
