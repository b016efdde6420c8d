//! Startup errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] wayfarer_config::ConfigError),

    #[error("Locale setup error: {0}")]
    I18n(#[from] wayfarer_i18n::I18nError),

    #[error("Logging setup error: {0}")]
    Log(#[from] wayfarer_log::LogError),

    #[error("Server error: {0}")]
    Server(#[from] wayfarer_core::Error),

    #[error("Invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),
}
