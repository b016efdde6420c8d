// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating resolved configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn one_of<T: PartialEq + std::fmt::Debug>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of {:?}, got {:?}",
                field, allowed, value
            )));
        }
        Ok(())
    }

    pub fn is_origin(value: &str, field: &str) -> Result<()> {
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.contains('/') && !host.contains(' ') => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{} must be an origin such as https://example.com",
                field
            ))),
        }
    }

    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid port number",
                field
            )));
        }
        Ok(())
    }
}
