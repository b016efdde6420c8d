// Error types for the HTTP layer

use crate::HttpResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::BadRequest(_) | Error::Deserialization(_) => 400,
            Error::PayloadTooLarge(_) => 413,
            Error::Serialization(_) | Error::Internal(_) | Error::Io(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// JSON error response. Server faults get a generic message.
    pub fn to_response(&self) -> HttpResponse {
        let message = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::json_value(self.status_code(), serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::RouteNotFound("/x".into()).status_code(), 404);
        assert_eq!(Error::Deserialization("bad".into()).status_code(), 400);
        assert!(Error::BadRequest("x".into()).is_client_error());
        assert!(Error::Internal("x".into()).is_server_error());
    }

    #[test]
    fn test_to_response() {
        let response = Error::MethodNotAllowed("POST /en".into()).to_response();
        assert_eq!(response.status, 405);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["error"], "Method not allowed: POST /en");

        let response = Error::Internal("disk on fire".into()).to_response();
        assert_eq!(response.status, 500);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
