//! Report ingest errors

use thiserror::Error;

/// Why an inbound report could not be accepted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Body parsed but does not have the expected shape
    #[error("Malformed report: {0}")]
    Malformed(String),

    /// Body is not JSON at all
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Client-side fault, answered with a 400
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Report store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
