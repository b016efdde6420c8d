// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Configuration file loader.
///
/// Files are flattened into the same lowercase key map the environment
/// loader produces, so both sources merge key-for-key. Scalars are
/// stringified and arrays are joined with commas.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Detect the format from the file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension on {}", path.display())))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        match self.format {
            FileFormat::Json => {
                let value: Value = serde_json::from_str(content)
                    .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?;
                flatten(value)
            }
            FileFormat::Toml => {
                let value: Value = toml::from_str(content)
                    .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
                flatten(value)
            }
            FileFormat::Env => Ok(parse_env(content)),
        }
    }
}

fn flatten(value: Value) -> Result<HashMap<String, String>> {
    let Value::Object(map) = value else {
        return Err(ConfigError::ParseError(
            "Top level of a configuration file must be a table".to_string(),
        ));
    };

    let mut flat = HashMap::new();
    for (key, value) in map {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => {
                return Err(ConfigError::ParseError(format!(
                    "Nested table '{}' is not supported",
                    key
                )));
            }
        };
        flat.insert(key.to_lowercase(), rendered);
    }

    Ok(flat)
}

fn parse_env(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let key = key.strip_prefix("WAYFARER_").unwrap_or(key);
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(key.to_lowercase(), value.to_string());
        }
    }

    map
}
