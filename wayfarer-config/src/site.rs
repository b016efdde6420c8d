// Resolved site configuration

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Deployment environment.
///
/// Resolved once at startup and passed to every component that branches on
/// it; nothing reads the process environment after [`SiteConfig`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            "test" => Some(Environment::Test),
            _ => None,
        }
    }

    /// Development-like environments persist reports locally and get the
    /// relaxed policy.
    pub fn is_development(&self) -> bool {
        !self.is_production()
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the site backend needs to know about its deployment.
#[derive(Debug, Clone, Serialize)]
pub struct SiteConfig {
    pub environment: Environment,
    /// Attach CSP and hardening headers to page responses
    pub security_headers: bool,
    /// Emit `Content-Security-Policy-Report-Only` instead of enforcing
    pub csp_report_only: bool,
    /// Directory for the JSONL report logs (development only)
    pub report_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub locales: Vec<String>,
    pub default_locale: String,
    /// Public origin of the site, added to `connect-src` when set
    pub site_origin: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            security_headers: true,
            csp_report_only: false,
            report_dir: PathBuf::from("logs"),
            host: "0.0.0.0".to_string(),
            port: 3000,
            locales: vec!["en".to_string(), "es".to_string()],
            default_locale: "en".to_string(),
            site_origin: None,
        }
    }
}

impl SiteConfig {
    /// Build from `WAYFARER_*` variables. `NODE_ENV` is honored when
    /// `WAYFARER_ENV` is absent.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut node_env = None;
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .inspect(|(k, v)| {
                if k == "NODE_ENV" {
                    node_env = Some(v.clone());
                }
            })
            .collect();

        let mut map = crate::EnvLoader::default().load_from(vars);
        if let Some(node_env) = node_env {
            map.entry("env".to_string()).or_insert(node_env);
        }
        Self::from_map(&map)
    }

    /// Build from a flattened lowercase key map. Missing keys keep defaults.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = map.get("env") {
            config.environment = Environment::parse(value).ok_or_else(|| {
                ConfigError::invalid("env", value, "expected development, production or test")
            })?;
        }
        if let Some(value) = map.get("security_headers") {
            config.security_headers = parse_bool("security_headers", value)?;
        }
        if let Some(value) = map.get("csp_report_only") {
            config.csp_report_only = parse_bool("csp_report_only", value)?;
        }
        if let Some(value) = map.get("report_dir") {
            config.report_dir = PathBuf::from(value);
        }
        if let Some(value) = map.get("host") {
            config.host = value.trim().to_string();
        }
        if let Some(value) = map.get("port") {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("port", value, "expected a port number"))?;
        }
        if let Some(value) = map.get("locales") {
            config.locales = value
                .split(',')
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect();
        }
        if let Some(value) = map.get("default_locale") {
            config.default_locale = value.trim().to_lowercase();
        }
        if let Some(value) = map.get("site_origin") {
            let origin = value.trim().trim_end_matches('/');
            config.site_origin = (!origin.is_empty()).then(|| origin.to_string());
        }

        config.validate()?;
        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.host, "host")?;
        ConfigValidator::is_port(self.port, "port")?;
        if self.locales.is_empty() {
            return Err(ConfigError::ValidationError(
                "locales cannot be empty".to_string(),
            ));
        }
        ConfigValidator::one_of(&self.default_locale, &self.locales, "default_locale")?;
        if let Some(origin) = &self.site_origin {
            ConfigValidator::is_origin(origin, "site_origin")?;
        }
        Ok(())
    }
}

/// Parse a boolean flag: `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.security_headers);
        assert!(!config.csp_report_only);
        assert_eq!(config.report_dir, PathBuf::from("logs"));
        assert_eq!(config.locales, vec!["en", "es"]);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_vars() {
        let config = SiteConfig::from_vars([
            ("WAYFARER_ENV", "production"),
            ("WAYFARER_SECURITY_HEADERS", "off"),
            ("WAYFARER_CSP_REPORT_ONLY", "TRUE"),
            ("WAYFARER_PORT", "8080"),
            ("WAYFARER_SITE_ORIGIN", "https://wayfarer.example/"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert!(!config.security_headers);
        assert!(config.csp_report_only);
        assert_eq!(config.port, 8080);
        assert_eq!(config.site_origin.as_deref(), Some("https://wayfarer.example"));
    }

    #[test]
    fn test_node_env_fallback() {
        let config = SiteConfig::from_vars([("NODE_ENV", "production")]).unwrap();
        assert_eq!(config.environment, Environment::Production);

        let config =
            SiteConfig::from_vars([("NODE_ENV", "production"), ("WAYFARER_ENV", "test")]).unwrap();
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_invalid_values() {
        assert!(SiteConfig::from_vars([("WAYFARER_ENV", "staging")]).is_err());
        assert!(SiteConfig::from_vars([("WAYFARER_SECURITY_HEADERS", "maybe")]).is_err());
        assert!(SiteConfig::from_vars([("WAYFARER_PORT", "http")]).is_err());
        assert!(SiteConfig::from_vars([("WAYFARER_PORT", "0")]).is_err());
    }

    #[test]
    fn test_default_locale_must_be_supported() {
        let result = SiteConfig::from_vars([("WAYFARER_LOCALES", "en,es"), ("WAYFARER_DEFAULT_LOCALE", "fr")]);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let config = SiteConfig::from_vars([("WAYFARER_LOCALES", " ES , en "), ("WAYFARER_DEFAULT_LOCALE", "es")])
            .unwrap();
        assert_eq!(config.locales, vec!["es", "en"]);
        assert_eq!(config.default_locale, "es");
    }

    #[test]
    fn test_environment_classes() {
        assert!(Environment::Development.is_development());
        assert!(Environment::Test.is_development());
        assert!(Environment::Production.is_production());
        assert!(!Environment::Production.is_development());
        assert_eq!(Environment::parse("PROD"), Some(Environment::Production));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("k", "yes").unwrap());
        assert!(!parse_bool("k", "0").unwrap());
        assert!(parse_bool("k", "2").is_err());
    }
}
