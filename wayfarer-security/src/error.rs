//! Security header errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("nonce must not be empty")]
    EmptyNonce,

    #[error("nonce contains characters outside the base64 alphabet")]
    InvalidNonce,

    #[error("invalid directive name: {0}")]
    InvalidDirective(String),

    #[error("header value for {0} contains a line break")]
    InvalidHeaderValue(String),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
