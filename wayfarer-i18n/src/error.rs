//! Error types for locale handling

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum I18nError {
    /// Tag is not a BCP 47 language[-region] tag
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Router built without any locales
    #[error("At least one supported locale is required")]
    NoLocales,

    /// Default locale missing from the supported set
    #[error("Default locale {0} is not among the supported locales")]
    UnsupportedDefault(String),
}

pub type Result<T> = std::result::Result<T, I18nError>;
