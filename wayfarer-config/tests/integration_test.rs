use std::fs;
use tempfile::TempDir;
use wayfarer_config::{ConfigError, Environment, SiteConfigBuilder};

#[test]
fn test_toml_file_then_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wayfarer.toml");
    fs::write(
        &path,
        r#"
env = "production"
port = 8080
locales = ["en", "es", "fr"]
default_locale = "es"
csp_report_only = true
"#,
    )
    .unwrap();

    let config = SiteConfigBuilder::new()
        .add_file(&path)
        .set("port", "9090")
        .build()
        .unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.port, 9090);
    assert_eq!(config.locales, vec!["en", "es", "fr"]);
    assert_eq!(config.default_locale, "es");
    assert!(config.csp_report_only);
}

#[test]
fn test_later_file_wins() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("base.json");
    let second = dir.path().join("local.toml");
    fs::write(&first, r#"{"host": "0.0.0.0", "port": 4000}"#).unwrap();
    fs::write(&second, "port = 4001\n").unwrap();

    let config = SiteConfigBuilder::new()
        .add_file(&first)
        .add_file(&second)
        .build()
        .unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:4001");
}

#[test]
fn test_default_locale_must_be_listed() {
    let result = SiteConfigBuilder::new()
        .set("locales", "en,es")
        .set("default_locale", "de")
        .build();

    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = SiteConfigBuilder::new()
        .add_file(dir.path().join("absent.toml"))
        .build();

    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let result = SiteConfigBuilder::new().add_file("wayfarer.yaml").build();
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}
